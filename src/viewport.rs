//! Plot size state shared by both plot variants.
//!
//! The viewport tracks the logical (CSS pixel) size of the drawable surface,
//! the device pixel ratio of the backing store, and the vertical scale factor
//! that ties physical signal units to pixels.

use crate::config::PlotConfig;
use crate::constants::{DEFAULT_DEVICE_PIXEL_RATIO, DEFAULT_HEIGHT_IN_SENS_REF_UNITS};
use crate::error::PlotError;
use std::cell::Cell;
use std::rc::Rc;

/// Host region a plot surface is attached to.
pub trait PlotContainer {
    /// Content box size in logical (CSS) pixels.
    fn content_size(&self) -> (f64, f64);

    fn device_pixel_ratio(&self) -> f64 {
        DEFAULT_DEVICE_PIXEL_RATIO
    }

    /// Place the plot canvas inside the container.
    #[cfg(target_arch = "wasm32")]
    fn mount(&self, _canvas: &web_sys::HtmlCanvasElement, _width_px: f64) {}
}

/// Container with an explicitly set size, for headless and native hosts.
#[derive(Debug)]
pub struct FixedContainer {
    size: Cell<(f64, f64)>,
    device_pixel_ratio: Cell<f64>,
}

impl FixedContainer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Cell::new((width, height)),
            device_pixel_ratio: Cell::new(DEFAULT_DEVICE_PIXEL_RATIO),
        }
    }

    pub fn set_size(&self, width: f64, height: f64) {
        self.size.set((width, height));
    }

    pub fn set_device_pixel_ratio(&self, ratio: f64) {
        self.device_pixel_ratio.set(ratio);
    }
}

impl PlotContainer for FixedContainer {
    fn content_size(&self) -> (f64, f64) {
        self.size.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.get()
    }
}

pub struct Viewport {
    container: Option<Rc<dyn PlotContainer>>,
    /// Pinned logical width; horizontal container reflow does not change it.
    width: Option<f64>,
    logical_width: f64,
    logical_height: f64,
    device_pixel_ratio: f64,
    /// Logical pixels per sensitivity reference unit. Kept as an absolute
    /// value so the physical scale survives height changes.
    px_per_sens_ref_unit: f64,
    /// Height in reference units requested before the surface had a height.
    pending_height_units: Option<f64>,
}

impl Viewport {
    pub fn new(config: &PlotConfig) -> Self {
        let mut viewport = Self {
            container: None,
            width: None,
            logical_width: 0.0,
            logical_height: 0.0,
            device_pixel_ratio: DEFAULT_DEVICE_PIXEL_RATIO,
            px_per_sens_ref_unit: 0.0,
            pending_height_units: None,
        };
        viewport.apply_config(config);
        viewport
    }

    /// Take the scale settings of a new config; the size state is kept.
    ///
    /// An invalid scale in the config is logged and skipped, falling through
    /// to the next setting and finally to the default height.
    pub fn apply_config(&mut self, config: &PlotConfig) {
        if let Some(px) = config.px_per_sens_ref_unit {
            match self.set_px_per_sens_ref_unit(px) {
                Ok(()) => return,
                Err(e) => log::error!("[plot] ignoring configured scale: {e}"),
            }
        }
        if let Some(units) = config.height_in_sens_ref_units {
            match self.set_height_in_sens_ref_units(units) {
                Ok(()) => return,
                Err(e) => log::error!("[plot] ignoring configured scale: {e}"),
            }
        }
        if self.px_per_sens_ref_unit <= 0.0 && self.pending_height_units.is_none() {
            self.pending_height_units = Some(DEFAULT_HEIGHT_IN_SENS_REF_UNITS);
            self.resolve_pending();
        }
    }

    /// Bind to a container, pinning the width to the container's current
    /// width unless one was already set. Returns whether the physical size
    /// changed.
    pub fn attach(&mut self, container: Rc<dyn PlotContainer>) -> bool {
        if self.width.is_none() {
            let (w, _) = container.content_size();
            self.width = Some(w.max(0.0));
        }
        self.container = Some(container);
        self.refresh()
    }

    pub fn container(&self) -> Option<&Rc<dyn PlotContainer>> {
        self.container.as_ref()
    }

    /// Pin the width to `width`, or to the container's current width.
    pub fn reset_width(&mut self, width: Option<f64>) -> bool {
        let container_width = self
            .container
            .as_ref()
            .map(|c| c.content_size().0)
            .unwrap_or(0.0);
        self.width = Some(width.unwrap_or(container_width).max(0.0));
        self.refresh()
    }

    /// Re-read the container height and pixel ratio. Returns whether the
    /// physical size changed.
    pub fn refresh(&mut self) -> bool {
        let before = self.physical_size();
        if let Some(container) = &self.container {
            let (_, h) = container.content_size();
            let dpr = container.device_pixel_ratio();
            self.logical_height = h.max(0.0);
            self.device_pixel_ratio = if dpr.is_finite() && dpr > 0.0 {
                dpr
            } else {
                DEFAULT_DEVICE_PIXEL_RATIO
            };
        }
        self.logical_width = self.width.unwrap_or(0.0);
        self.resolve_pending();
        before != self.physical_size()
    }

    fn resolve_pending(&mut self) {
        if self.logical_height <= 0.0 {
            return;
        }
        if let Some(units) = self.pending_height_units.take() {
            self.px_per_sens_ref_unit = self.logical_height / units;
        }
    }

    /// Pinned width in logical pixels.
    pub fn width(&self) -> f64 {
        self.logical_width
    }

    pub fn logical_size(&self) -> (f64, f64) {
        (self.logical_width, self.logical_height)
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Backing store size in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.logical_width * self.device_pixel_ratio).round() as u32,
            (self.logical_height * self.device_pixel_ratio).round() as u32,
        )
    }

    pub fn px_per_sens_ref_unit(&self) -> f64 {
        self.px_per_sens_ref_unit
    }

    pub fn set_px_per_sens_ref_unit(&mut self, value: f64) -> Result<(), PlotError> {
        PlotError::ensure_positive("pixels per sensitivity reference unit", value)?;
        self.px_per_sens_ref_unit = value;
        self.pending_height_units = None;
        Ok(())
    }

    /// Plot height measured in sensitivity reference units.
    pub fn height_in_sens_ref_units(&self) -> f64 {
        if let Some(units) = self.pending_height_units {
            return units;
        }
        self.logical_height / self.px_per_sens_ref_unit
    }

    pub fn set_height_in_sens_ref_units(&mut self, value: f64) -> Result<(), PlotError> {
        PlotError::ensure_positive("plot height in sensitivity reference units", value)?;
        self.pending_height_units = Some(value);
        self.resolve_pending();
        Ok(())
    }

    /// Whether traces can be scaled: a surface with height and a positive
    /// pixels-per-unit factor.
    pub fn is_drawable(&self) -> bool {
        let (w, h) = self.physical_size();
        w > 0 && h > 0 && self.px_per_sens_ref_unit > 0.0
    }
}
