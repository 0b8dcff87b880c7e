//! GPU-accelerated plot.
//!
//! One compiled line-strip pipeline is shared by all traces. Each trace owns
//! a vertex buffer and a uniform buffer, and every `update` issues one draw
//! call per visible trace inside a single render pass.

mod buffers;
mod context;
mod pipeline;
mod target;

pub use pipeline::TRACE_WGSL;

use crate::config::{ChannelConfig, PlotConfig};
use crate::constants::MIN_DRAWABLE_POINTS;
use crate::error::PlotError;
use crate::plot::{BiosignalPlot, PlotState, TraceList};
use crate::scale::TraceTransform;
use crate::trace::{Trace, TraceId};
use crate::viewport::{PlotContainer, Viewport};
use buffers::TraceBuffers;
use context::GpuContext;
use pipeline::{create_trace_pipeline, TracePipeline, TraceUniforms};
use std::rc::Rc;
use target::RenderTarget;

struct GpuResources {
    target: RenderTarget,
    pipeline: TracePipeline,
    /// The next pass must clear even when the drawing buffer is preserved.
    needs_clear: bool,
}

impl GpuResources {
    fn create(ctx: &GpuContext, config: &PlotConfig, (w, h): (u32, u32)) -> anyhow::Result<Self> {
        let target = RenderTarget::create(ctx, config, w, h)?;
        let pipeline = create_trace_pipeline(&ctx.device, target.format, target.sample_count);
        if let Some(err) = ctx.take_device_error() {
            anyhow::bail!("pipeline creation failed: {err}");
        }
        Ok(Self {
            target,
            pipeline,
            needs_clear: true,
        })
    }
}

pub struct GpuPlot {
    config: PlotConfig,
    context: Option<GpuContext>,
    context_error: Option<String>,
    state: PlotState<GpuResources>,
    viewport: Viewport,
    traces: TraceList<Option<TraceBuffers>>,
}

impl GpuPlot {
    /// Acquire a GPU device and build the plot surface.
    ///
    /// Never fails outright: without a usable adapter the plot is created
    /// inert, and `is_ready` reports false.
    pub async fn new(config: PlotConfig) -> Self {
        let (context, context_error) = match GpuContext::request(config.power_performance).await {
            Ok(ctx) => (Some(ctx), None),
            Err(e) => {
                log::warn!("[gpu-plot] GPU context unavailable: {e:#}");
                (None, Some(format!("{e:#}")))
            }
        };
        let mut plot = Self {
            viewport: Viewport::new(&config),
            config: config.clone(),
            context,
            context_error,
            state: PlotState::Uninitialized(PlotError::NotReady),
            traces: TraceList::new(),
        };
        plot.create_context(config);
        plot
    }

    fn create_context(&mut self, config: PlotConfig) {
        // Destroy the previous surface and every buffer that depends on it
        // before building anything new.
        self.state.tear_down();
        for entry in self.traces.iter_mut() {
            entry.backend = None;
        }
        self.viewport.apply_config(&config);
        self.config = config;

        let Some(ctx) = &self.context else {
            let reason = self
                .context_error
                .clone()
                .unwrap_or_else(|| "no GPU context".into());
            log::error!("[gpu-plot] could not create the plot surface: {reason}");
            self.state = PlotState::Uninitialized(PlotError::Init(reason));
            return;
        };
        if ctx.power != self.config.power_performance {
            log::info!(
                "[gpu-plot] power preference {:?} applies to new plots only, keeping the current adapter",
                self.config.power_performance
            );
        }
        match GpuResources::create(ctx, &self.config, self.viewport.physical_size()) {
            Ok(resources) => {
                for entry in self.traces.iter_mut() {
                    entry.backend = Some(TraceBuffers::create(
                        &ctx.device,
                        &resources.pipeline.bind_group_layout,
                        &entry.trace,
                    ));
                }
                log::debug!(
                    "[gpu-plot] new surface created ({}x{}, {}x MSAA, {} traces)",
                    resources.target.size().0,
                    resources.target.size().1,
                    resources.target.sample_count,
                    self.traces.len()
                );
                self.state = PlotState::Ready(resources);
            }
            Err(e) => {
                log::error!("[gpu-plot] could not create the plot surface: {e:#}");
                self.state = PlotState::Uninitialized(PlotError::Init(format!("{e:#}")));
            }
        }
    }

    /// Request a fresh adapter and device, then rebuild the surface and
    /// every trace's buffers on it.
    ///
    /// `recreate` reuses the current device, which is enough after a
    /// validation error but not after the device itself was lost. This also
    /// picks up a changed power preference.
    pub async fn reacquire_device(&mut self) {
        self.state.tear_down();
        for entry in self.traces.iter_mut() {
            entry.backend = None;
        }
        self.context = None;
        match GpuContext::request(self.config.power_performance).await {
            Ok(ctx) => {
                self.context = Some(ctx);
                self.context_error = None;
            }
            Err(e) => {
                log::warn!("[gpu-plot] GPU context unavailable: {e:#}");
                self.context_error = Some(format!("{e:#}"));
            }
        }
        #[cfg(target_arch = "wasm32")]
        if let (Some(container), Some(ctx)) = (self.viewport.container(), &self.context) {
            container.mount(&ctx.canvas, self.viewport.width());
        }
        self.create_context(self.config.clone());
    }

    /// Read the last drawn frame back as RGBA rows of the backing store
    /// size. Only available for offscreen (native) targets.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_pixels(&self) -> Result<Vec<u8>, PlotError> {
        let (Some(ctx), Some(resources)) = (&self.context, self.state.resources()) else {
            return Err(PlotError::NotReady);
        };
        resources
            .target
            .read_pixels(ctx)
            .map_err(|e| PlotError::Readback(format!("{e:#}")))
    }

    /// Move to the inert state if the device reported an error.
    fn check_device(&mut self) -> bool {
        let Some(err) = self.context.as_ref().and_then(|ctx| ctx.take_device_error()) else {
            return true;
        };
        log::error!(
            "[gpu-plot] plot disabled after a device error, recreate or reacquire the device to retry"
        );
        self.state = PlotState::Uninitialized(PlotError::Init(err));
        for entry in self.traces.iter_mut() {
            entry.backend = None;
        }
        false
    }

    fn update_viewport(&mut self) {
        self.viewport.refresh();
        let (w, h) = self.viewport.physical_size();
        #[cfg(target_arch = "wasm32")]
        if let Some(ctx) = &self.context {
            crate::web::dom::set_canvas_backing_size(&ctx.canvas, w, h);
        }
        if let (Some(ctx), Some(resources)) = (&self.context, self.state.resources_mut()) {
            resources.target.resize(ctx, w, h);
        }
    }

    fn update_lines(&mut self) {
        let (Some(ctx), Some(resources)) = (&self.context, self.state.resources_mut()) else {
            log::error!("[gpu-plot] could not update traces, the plot surface was not initialized");
            return;
        };
        let drawable = self.viewport.is_drawable();
        if drawable {
            let height_units = self.viewport.height_in_sens_ref_units();
            for entry in self.traces.iter() {
                let trace = &entry.trace;
                if !trace.render() || trace.len() < MIN_DRAWABLE_POINTS {
                    continue;
                }
                if let Some(buffers) = &entry.backend {
                    let transform = TraceTransform::for_trace(trace, height_units);
                    buffers.upload(&ctx.queue, trace, &TraceUniforms::new(&transform, trace.color()));
                }
            }
        } else {
            log::debug!("[gpu-plot] nothing to draw, the viewport has no scale yet");
        }

        let frame = match resources.target.acquire(ctx) {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[gpu-plot] surface lost, reconfiguring");
                resources.target.reconfigure(ctx);
                return;
            }
            Err(e) => {
                log::error!("[gpu-plot] could not acquire a frame: {e}");
                return;
            }
        };
        let load = if resources.needs_clear || !self.config.preserve_drawing_buffer {
            wgpu::LoadOp::Clear(self.config.clear_color().to_wgpu())
        } else {
            wgpu::LoadOp::Load
        };
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trace_encoder"),
            });
        {
            let (view, resolve_target) = resources.target.attachment(&frame);
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trace_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if drawable {
                rpass.set_pipeline(&resources.pipeline.pipeline);
                for entry in self.traces.iter() {
                    let trace = &entry.trace;
                    if !trace.render() || trace.len() < MIN_DRAWABLE_POINTS {
                        continue;
                    }
                    let Some(buffers) = &entry.backend else {
                        continue;
                    };
                    rpass.set_bind_group(0, &buffers.bind_group, &[]);
                    rpass.set_vertex_buffer(0, buffers.vertex.slice(..));
                    rpass.draw(0..trace.len() as u32, 0..1);
                }
            }
        }
        ctx.queue.submit(Some(encoder.finish()));
        frame.present();
        resources.needs_clear = false;
    }
}

impl BiosignalPlot for GpuPlot {
    fn add_channel(&mut self, channel: ChannelConfig) -> Result<TraceId, PlotError> {
        let (Some(ctx), Some(resources)) = (&self.context, self.state.resources()) else {
            log::error!("[gpu-plot] could not add a channel, the plot surface was not initialized");
            return Err(PlotError::NotReady);
        };
        let trace = Trace::new(&channel).inspect_err(|e| log::error!("[gpu-plot] {e}"))?;
        let buffers = TraceBuffers::create(&ctx.device, &resources.pipeline.bind_group_layout, &trace);
        Ok(self.traces.push(trace, Some(buffers)))
    }

    fn add_to(&mut self, container: Rc<dyn PlotContainer>) {
        self.viewport.attach(container);
        #[cfg(target_arch = "wasm32")]
        if let (Some(container), Some(ctx)) = (self.viewport.container(), &self.context) {
            container.mount(&ctx.canvas, self.viewport.width());
        }
        self.update_viewport();
    }

    fn clear_all(&mut self) {
        self.traces.clear();
        self.clear_canvas();
    }

    fn clear_canvas(&mut self) {
        let (Some(ctx), Some(resources)) = (&self.context, self.state.resources_mut()) else {
            log::error!("[gpu-plot] could not clear the plot, the plot surface was not initialized");
            return;
        };
        let frame = match resources.target.acquire(ctx) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("[gpu-plot] could not clear the plot: {e}");
                resources.needs_clear = true;
                return;
            }
        };
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("clear_encoder"),
            });
        {
            let (view, resolve_target) = resources.target.attachment(&frame);
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color().to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        ctx.queue.submit(Some(encoder.finish()));
        frame.present();
        resources.needs_clear = false;
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
        if let Some(ctx) = &self.context {
            crate::web::dom::set_canvas_width(&ctx.canvas, self.viewport.width());
        }
        self.update_viewport();
    }

    fn update(&mut self) {
        if !self.state.is_ready() {
            log::error!("[gpu-plot] could not update plot, the plot surface was not initialized");
            return;
        }
        if !self.check_device() {
            return;
        }
        let started = instant::Instant::now();
        self.update_viewport();
        self.update_lines();
        log::trace!(
            "[gpu-plot] drew {} traces in {:?}",
            self.traces.len(),
            started.elapsed()
        );
    }

    fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    fn is_accelerated(&self) -> bool {
        true
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
