//! Non-accelerated fallback plot.
//!
//! Same contract as the GPU plot, drawn with paths and strokes on a 2-D
//! surface. Each trace goes through the same amplitude transform as in the
//! vertex shader, then gets mapped from clip space to surface pixels.

mod pixmap;
#[cfg(target_arch = "wasm32")]
mod web;

pub use pixmap::PixmapCanvas;
#[cfg(target_arch = "wasm32")]
pub use web::WebCanvas;

use crate::color::Color;
use crate::config::{ChannelConfig, PlotConfig};
use crate::constants::MIN_DRAWABLE_POINTS;
use crate::error::PlotError;
use crate::plot::{BiosignalPlot, PlotState, TraceList};
use crate::scale::{clip_to_pixel, TraceTransform};
use crate::trace::{Trace, TraceId};
use crate::viewport::{PlotContainer, Viewport};
use glam::Vec2;
use std::rc::Rc;

/// Path/stroke drawing surface.
pub trait Canvas2d: Sized {
    fn create(config: &PlotConfig) -> Result<Self, PlotError>;

    /// Set the backing store size in device pixels.
    fn resize(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    fn clear(&mut self, background: Color);

    /// Stroke connected line segments through `points` (surface pixels) with
    /// a multiply blend.
    fn stroke_polyline(&mut self, points: &[Vec2], color: Color, line_width: f32);

    #[cfg(target_arch = "wasm32")]
    fn element(&self) -> Option<&web_sys::HtmlCanvasElement> {
        None
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub type DefaultCanvas = PixmapCanvas;
#[cfg(target_arch = "wasm32")]
pub type DefaultCanvas = WebCanvas;

pub struct CanvasPlot<S: Canvas2d = DefaultCanvas> {
    config: PlotConfig,
    state: PlotState<S>,
    viewport: Viewport,
    traces: TraceList<()>,
    // Reused between frames.
    points: Vec<Vec2>,
}

impl<S: Canvas2d> CanvasPlot<S> {
    pub fn new(config: PlotConfig) -> Self {
        let mut plot = Self {
            viewport: Viewport::new(&config),
            config: config.clone(),
            state: PlotState::Uninitialized(PlotError::NotReady),
            traces: TraceList::new(),
            points: Vec::new(),
        };
        plot.create_context(config);
        plot
    }

    pub fn surface(&self) -> Option<&S> {
        self.state.resources()
    }

    fn create_context(&mut self, config: PlotConfig) {
        // Always tear down first, so a failed rebuild leaves nothing behind.
        self.state.tear_down();
        self.viewport.apply_config(&config);
        self.config = config;
        match S::create(&self.config) {
            Ok(mut surface) => {
                let (w, h) = self.viewport.physical_size();
                surface.resize(w, h);
                surface.clear(self.config.clear_color());
                #[cfg(target_arch = "wasm32")]
                if let (Some(container), Some(canvas)) = (self.viewport.container(), surface.element()) {
                    container.mount(canvas, self.viewport.width());
                }
                log::debug!("[canvas-plot] new 2-D context created ({w}x{h})");
                self.state = PlotState::Ready(surface);
            }
            Err(e) => {
                log::error!("[canvas-plot] could not create 2-D context: {e}");
                self.state = PlotState::Uninitialized(e);
            }
        }
    }

    fn update_viewport(&mut self) {
        self.viewport.refresh();
        let (w, h) = self.viewport.physical_size();
        if let Some(surface) = self.state.resources_mut() {
            surface.resize(w, h);
        }
    }

    fn update_lines(&mut self) {
        let Some(surface) = self.state.resources_mut() else {
            log::error!("[canvas-plot] could not update traces, the canvas was not initialized");
            return;
        };
        if !self.config.preserve_drawing_buffer {
            surface.clear(self.config.clear_color());
        }
        if !self.viewport.is_drawable() {
            log::debug!("[canvas-plot] nothing to draw, the viewport has no scale yet");
            return;
        }
        let (w, h) = surface.size();
        let (w, h) = (w as f32, h as f32);
        let height_units = self.viewport.height_in_sens_ref_units();
        let line_width = self.config.line_width * self.viewport.device_pixel_ratio() as f32;
        for entry in self.traces.iter() {
            let trace = &entry.trace;
            if !trace.render() || trace.len() < MIN_DRAWABLE_POINTS {
                continue;
            }
            let transform = TraceTransform::for_trace(trace, height_units);
            self.points.clear();
            self.points.extend(
                trace
                    .xy()
                    .chunks_exact(2)
                    .map(|p| clip_to_pixel(transform.apply(p[0], p[1]), w, h)),
            );
            surface.stroke_polyline(&self.points, trace.color(), line_width);
        }
    }
}

impl<S: Canvas2d> BiosignalPlot for CanvasPlot<S> {
    fn add_channel(&mut self, channel: ChannelConfig) -> Result<TraceId, PlotError> {
        if !self.state.is_ready() {
            log::error!("[canvas-plot] could not add a channel, the canvas was not initialized");
            return Err(PlotError::NotReady);
        }
        let trace = Trace::new(&channel).inspect_err(|e| log::error!("[canvas-plot] {e}"))?;
        Ok(self.traces.push(trace, ()))
    }

    fn add_to(&mut self, container: Rc<dyn PlotContainer>) {
        self.viewport.attach(container);
        #[cfg(target_arch = "wasm32")]
        if let (Some(container), Some(canvas)) = (
            self.viewport.container(),
            self.state.resources().and_then(|s| s.element()),
        ) {
            container.mount(canvas, self.viewport.width());
        }
        self.update_viewport();
    }

    fn clear_all(&mut self) {
        self.traces.clear();
        self.clear_canvas();
    }

    fn clear_canvas(&mut self) {
        let background = self.config.clear_color();
        match self.state.resources_mut() {
            Some(surface) => surface.clear(background),
            None => log::error!("[canvas-plot] could not clear the plot, the canvas was not initialized"),
        }
    }

    fn recreate(&mut self, config: PlotConfig) {
        self.create_context(config);
    }

    fn reset_viewport(&mut self) {
        self.update_viewport();
    }

    fn reset_width(&mut self, width: Option<f64>) {
        self.viewport.reset_width(width);
        #[cfg(target_arch = "wasm32")]
        if let Some(canvas) = self.state.resources().and_then(|s| s.element()) {
            crate::web::dom::set_canvas_width(canvas, self.viewport.width());
        }
        self.update_viewport();
    }

    fn update(&mut self) {
        if !self.state.is_ready() {
            log::error!("[canvas-plot] could not update plot, the canvas was not initialized");
            return;
        }
        let started = instant::Instant::now();
        self.update_viewport();
        self.update_lines();
        log::trace!(
            "[canvas-plot] drew {} traces in {:?}",
            self.traces.len(),
            started.elapsed()
        );
    }

    fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    fn is_accelerated(&self) -> bool {
        false
    }

    fn init_error(&self) -> Option<&PlotError> {
        self.state.error()
    }

    fn config(&self) -> &PlotConfig {
        &self.config
    }

    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn trace(&self, id: TraceId) -> Option<&Trace> {
        self.traces.get(id).map(|e| &e.trace)
    }

    fn trace_mut(&mut self, id: TraceId) -> Option<&mut Trace> {
        self.traces.get_mut(id).map(|e| &mut e.trace)
    }

    fn trace_ids(&self) -> Vec<TraceId> {
        self.traces.ids()
    }

    fn trace_id_at(&self, index: usize) -> Option<TraceId> {
        self.traces.id_at(index)
    }

    fn trace_count(&self) -> usize {
        self.traces.len()
    }
}
