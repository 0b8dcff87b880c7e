use crate::config::{ChannelConfig, PlotConfig};
use crate::error::PlotError;
use crate::trace::{Trace, TraceId};
use crate::viewport::{PlotContainer, Viewport};
use std::rc::Rc;

/// Common contract of the GPU and 2-D plot variants.
///
/// Drawing operations never panic: on an uninitialized backend they log an
/// error and return. Check `is_ready` rather than relying on errors.
pub trait BiosignalPlot {
    /// Register a new channel; traces are drawn in insertion order.
    fn add_channel(&mut self, channel: ChannelConfig) -> Result<TraceId, PlotError>;

    /// Bind the surface to a host container and size it to the container.
    fn add_to(&mut self, container: Rc<dyn PlotContainer>);

    /// Drop every trace and blank the surface.
    fn clear_all(&mut self);

    /// Blank the surface, keeping the traces.
    fn clear_canvas(&mut self);

    /// Tear down the surface and pipeline and rebuild them from `config`,
    /// including the backend buffers of all attached traces.
    fn recreate(&mut self, config: PlotConfig);

    /// Re-read the container size after a resize or pixel ratio change.
    fn reset_viewport(&mut self);

    /// Pin the surface width to `width` (logical px) or the container width.
    fn reset_width(&mut self, width: Option<f64>);

    /// Draw all visible traces.
    fn update(&mut self);

    fn is_ready(&self) -> bool;

    /// Whether this is the GPU-accelerated variant.
    fn is_accelerated(&self) -> bool;

    /// Reason the backend is inert, if it is.
    fn init_error(&self) -> Option<&PlotError>;

    fn config(&self) -> &PlotConfig;

    fn viewport(&self) -> &Viewport;

    fn viewport_mut(&mut self) -> &mut Viewport;

    fn trace(&self, id: TraceId) -> Option<&Trace>;

    fn trace_mut(&mut self, id: TraceId) -> Option<&mut Trace>;

    fn trace_ids(&self) -> Vec<TraceId>;

    /// Handle of the trace at insertion position `index`.
    fn trace_id_at(&self, index: usize) -> Option<TraceId>;

    fn trace_count(&self) -> usize;

    /// Logical width the surface is pinned to.
    fn width(&self) -> f64 {
        self.viewport().width()
    }

    /// Backing store size in device pixels.
    fn surface_size(&self) -> (u32, u32) {
        self.viewport().physical_size()
    }

    fn px_per_sens_ref_unit(&self) -> f64 {
        self.viewport().px_per_sens_ref_unit()
    }

    fn set_px_per_sens_ref_unit(&mut self, value: f64) -> Result<(), PlotError> {
        self.viewport_mut()
            .set_px_per_sens_ref_unit(value)
            .inspect_err(|e| log::error!("[plot] {e}"))
    }

    fn height_in_sens_ref_units(&self) -> f64 {
        self.viewport().height_in_sens_ref_units()
    }

    fn set_height_in_sens_ref_units(&mut self, value: f64) -> Result<(), PlotError> {
        self.viewport_mut()
            .set_height_in_sens_ref_units(value)
            .inspect_err(|e| log::error!("[plot] {e}"))
    }
}

/// Backend lifecycle: either fully built or inert, never in between.
pub(crate) enum PlotState<R> {
    Uninitialized(PlotError),
    Ready(R),
}

impl<R> PlotState<R> {
    pub(crate) fn resources(&self) -> Option<&R> {
        match self {
            PlotState::Ready(r) => Some(r),
            PlotState::Uninitialized(_) => None,
        }
    }

    pub(crate) fn resources_mut(&mut self) -> Option<&mut R> {
        match self {
            PlotState::Ready(r) => Some(r),
            PlotState::Uninitialized(_) => None,
        }
    }

    pub(crate) fn error(&self) -> Option<&PlotError> {
        match self {
            PlotState::Ready(_) => None,
            PlotState::Uninitialized(e) => Some(e),
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(self, PlotState::Ready(_))
    }

    /// Drop the current resources, leaving the state inert.
    pub(crate) fn tear_down(&mut self) {
        *self = PlotState::Uninitialized(PlotError::NotReady);
    }
}

pub(crate) struct TraceEntry<B> {
    pub(crate) trace: Trace,
    pub(crate) backend: B,
}

/// Ordered trace collection with generation-checked handles.
pub(crate) struct TraceList<B> {
    generation: u32,
    entries: Vec<TraceEntry<B>>,
}

impl<B> TraceList<B> {
    pub(crate) fn new() -> Self {
        Self {
            generation: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, trace: Trace, backend: B) -> TraceId {
        let id = TraceId {
            generation: self.generation,
            index: self.entries.len() as u32,
        };
        self.entries.push(TraceEntry { trace, backend });
        id
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn get(&self, id: TraceId) -> Option<&TraceEntry<B>> {
        if id.generation != self.generation {
            return None;
        }
        self.entries.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: TraceId) -> Option<&mut TraceEntry<B>> {
        if id.generation != self.generation {
            return None;
        }
        self.entries.get_mut(id.index())
    }

    pub(crate) fn id_at(&self, index: usize) -> Option<TraceId> {
        (index < self.entries.len()).then(|| TraceId {
            generation: self.generation,
            index: index as u32,
        })
    }

    pub(crate) fn ids(&self) -> Vec<TraceId> {
        (0..self.entries.len() as u32)
            .map(|index| TraceId {
                generation: self.generation,
                index,
            })
            .collect()
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, TraceEntry<B>> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, TraceEntry<B>> {
        self.entries.iter_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
