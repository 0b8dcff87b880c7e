//! Real-time multi-channel biosignal waveform plotting.
//!
//! Two interchangeable plot variants implement [`BiosignalPlot`]: a
//! GPU-accelerated [`GpuPlot`] that draws every channel as a line strip, and
//! a [`CanvasPlot`] fallback that strokes paths on a 2-D surface. Use
//! [`create_plot`] to get the best one available.

pub mod canvas;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod plot;
pub mod scale;
pub mod trace;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use canvas::{Canvas2d, CanvasPlot, PixmapCanvas};
pub use color::Color;
pub use config::{ChannelConfig, PlotConfig, PowerPreference};
pub use error::PlotError;
pub use gpu::{GpuPlot, TRACE_WGSL};
pub use plot::BiosignalPlot;
pub use trace::{Polarity, SampleData, Trace, TraceId};
pub use viewport::{FixedContainer, PlotContainer, Viewport};

/// Build a GPU plot, or the 2-D fallback when the GPU one cannot be
/// initialized.
pub async fn create_plot(config: PlotConfig) -> Box<dyn BiosignalPlot> {
    let gpu = GpuPlot::new(config.clone()).await;
    if gpu.is_ready() {
        log::info!("[plot] using the GPU-accelerated plot");
        return Box::new(gpu);
    }
    if let Some(e) = gpu.init_error() {
        log::warn!("[plot] falling back to the 2-D plot: {e}");
    }
    Box::new(CanvasPlot::<canvas::DefaultCanvas>::new(config))
}
