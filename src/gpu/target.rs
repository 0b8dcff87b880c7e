use super::context::GpuContext;
use crate::config::PlotConfig;
use crate::constants::MSAA_SAMPLE_COUNT;

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn create_color_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    sample_count: u32,
    usage: wgpu::TextureUsages,
) -> (wgpu::Texture, wgpu::TextureView) {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
    (tex, view)
}

enum TargetKind {
    /// Off-DOM texture, used when there is no presentation surface.
    Offscreen {
        texture: wgpu::Texture,
    },
    /// Presentation surface held by the context (web canvas).
    Surface { config: wgpu::SurfaceConfiguration },
}

/// Color target the traces are drawn into, plus the multisampled texture
/// that resolves into it when antialiasing is on.
pub(crate) struct RenderTarget {
    kind: TargetKind,
    msaa: Option<(wgpu::Texture, wgpu::TextureView)>,
    pub(crate) format: wgpu::TextureFormat,
    pub(crate) sample_count: u32,
    width: u32,
    height: u32,
}

/// One acquired frame.
pub(crate) struct Frame {
    pub(crate) view: wgpu::TextureView,
    output: Option<wgpu::SurfaceTexture>,
}

impl Frame {
    pub(crate) fn present(self) {
        if let Some(output) = self.output {
            output.present();
        }
    }
}

impl RenderTarget {
    pub(crate) fn create(
        ctx: &GpuContext,
        config: &PlotConfig,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let (kind, format) = match &ctx.surface {
            Some(surface) => {
                let caps = surface.get_capabilities(&ctx.adapter);
                // Plain (non-sRGB) formats keep trace colors identical to the
                // 2-D canvas path.
                let format = caps
                    .formats
                    .iter()
                    .copied()
                    .find(|f| {
                        matches!(
                            f,
                            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                        )
                    })
                    .or_else(|| caps.formats.first().copied())
                    .ok_or_else(|| anyhow::anyhow!("surface is not compatible with the adapter"))?;
                let alpha_mode = if config.transparent
                    && caps
                        .alpha_modes
                        .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
                {
                    wgpu::CompositeAlphaMode::PreMultiplied
                } else {
                    caps.alpha_modes
                        .first()
                        .copied()
                        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
                };
                let present_mode = if config.desynchronized {
                    wgpu::PresentMode::AutoNoVsync
                } else {
                    wgpu::PresentMode::AutoVsync
                };
                let surface_config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format,
                    width: width.max(1),
                    height: height.max(1),
                    present_mode,
                    alpha_mode,
                    view_formats: vec![],
                    desired_maximum_frame_latency: if config.desynchronized { 1 } else { 2 },
                };
                surface.configure(&ctx.device, &surface_config);
                (
                    TargetKind::Surface {
                        config: surface_config,
                    },
                    format,
                )
            }
            None => {
                let (texture, _) = create_color_texture(
                    &ctx.device,
                    "plot_surface",
                    width,
                    height,
                    OFFSCREEN_FORMAT,
                    1,
                    wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                );
                (TargetKind::Offscreen { texture }, OFFSCREEN_FORMAT)
            }
        };

        let sample_count = if config.antialias {
            let flags = ctx.adapter.get_texture_format_features(format).flags;
            if flags.sample_count_supported(MSAA_SAMPLE_COUNT) {
                MSAA_SAMPLE_COUNT
            } else {
                log::warn!("[gpu-plot] {MSAA_SAMPLE_COUNT}x MSAA is not supported for {format:?}, antialiasing disabled");
                1
            }
        } else {
            1
        };

        let mut target = Self {
            kind,
            msaa: None,
            format,
            sample_count,
            width,
            height,
        };
        target.create_msaa(&ctx.device);
        Ok(target)
    }

    fn create_msaa(&mut self, device: &wgpu::Device) {
        self.msaa = (self.sample_count > 1).then(|| {
            create_color_texture(
                device,
                "plot_msaa",
                self.width,
                self.height,
                self.format,
                self.sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        });
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn resize(&mut self, ctx: &GpuContext, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        match &mut self.kind {
            TargetKind::Offscreen { texture } => {
                (*texture, _) = create_color_texture(
                    &ctx.device,
                    "plot_surface",
                    width,
                    height,
                    self.format,
                    1,
                    wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                );
            }
            TargetKind::Surface { config } => {
                config.width = width.max(1);
                config.height = height.max(1);
                if let Some(surface) = &ctx.surface {
                    surface.configure(&ctx.device, config);
                }
            }
        }
        self.create_msaa(&ctx.device);
    }

    /// Reconfigure a lost or outdated presentation surface.
    pub(crate) fn reconfigure(&self, ctx: &GpuContext) {
        if let (TargetKind::Surface { config }, Some(surface)) = (&self.kind, &ctx.surface) {
            surface.configure(&ctx.device, config);
        }
    }

    pub(crate) fn acquire(&self, ctx: &GpuContext) -> Result<Frame, wgpu::SurfaceError> {
        match &self.kind {
            TargetKind::Offscreen { texture } => Ok(Frame {
                view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
                output: None,
            }),
            TargetKind::Surface { .. } => {
                let surface = ctx.surface.as_ref().ok_or(wgpu::SurfaceError::Lost)?;
                let output = surface.get_current_texture()?;
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(Frame {
                    view,
                    output: Some(output),
                })
            }
        }
    }

    /// Copy the offscreen color texture back to the host as tightly packed
    /// RGBA rows. Blocks until the GPU finishes.
    #[cfg(not(target_arch = "wasm32"))]
    pub(crate) fn read_pixels(&self, ctx: &GpuContext) -> anyhow::Result<Vec<u8>> {
        let TargetKind::Offscreen { texture } = &self.kind else {
            anyhow::bail!("only offscreen targets can be read back");
        };
        let (width, height) = (self.width.max(1), self.height.max(1));
        let row_bytes = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row_bytes = row_bytes.div_ceil(align) * align;
        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("plot_readback"),
            size: padded_row_bytes as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        ctx.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            _ = tx.send(result);
        });
        ctx.device.poll(wgpu::Maintain::Wait);
        rx.recv()??;

        let pixels = {
            let mapped = slice.get_mapped_range();
            mapped
                .chunks_exact(padded_row_bytes as usize)
                .flat_map(|row| &row[..row_bytes as usize])
                .copied()
                .collect()
        };
        staging.unmap();
        Ok(pixels)
    }

    /// Attachment view and resolve target for a render pass into `frame`.
    pub(crate) fn attachment<'a>(
        &'a self,
        frame: &'a Frame,
    ) -> (&'a wgpu::TextureView, Option<&'a wgpu::TextureView>) {
        match &self.msaa {
            Some((_, msaa_view)) => (msaa_view, Some(&frame.view)),
            None => (&frame.view, None),
        }
    }
}
