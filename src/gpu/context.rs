use crate::config::PowerPreference;
use std::sync::{Arc, Mutex};
#[cfg(target_arch = "wasm32")]
use web_sys as web;

/// Adapter, device and (on the web) presentation surface of a GPU plot.
///
/// Acquiring these is the only asynchronous step of the plot; everything
/// built on top of them (targets, pipeline, trace buffers) is recreated
/// synchronously.
pub(crate) struct GpuContext {
    pub(crate) adapter: wgpu::Adapter,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    pub(crate) surface: Option<wgpu::Surface<'static>>,
    #[cfg(target_arch = "wasm32")]
    pub(crate) canvas: web::HtmlCanvasElement,
    pub(crate) power: PowerPreference,
    device_error: Arc<Mutex<Option<String>>>,
    // Kept alive for the surface.
    _instance: wgpu::Instance,
}

impl GpuContext {
    pub(crate) async fn request(power: PowerPreference) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::default();

        #[cfg(target_arch = "wasm32")]
        let canvas = crate::web::dom::create_canvas()?;
        #[cfg(target_arch = "wasm32")]
        let surface = Some(instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?);
        #[cfg(not(target_arch = "wasm32"))]
        let surface: Option<wgpu::Surface<'static>> = None;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: power.to_wgpu(),
                compatible_surface: surface.as_ref(),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("biosignal_plot_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        // Validation errors would otherwise panic; record them so the plot can
        // go inert instead.
        let device_error = Arc::new(Mutex::new(None));
        let sink = device_error.clone();
        device.on_uncaptured_error(Box::new(move |err| {
            log::error!("[gpu-plot] device error: {err}");
            if let Ok(mut slot) = sink.lock() {
                slot.get_or_insert_with(|| err.to_string());
            }
        }));

        let info = adapter.get_info();
        log::info!("[gpu-plot] using adapter {} ({:?})", info.name, info.backend);

        Ok(Self {
            adapter,
            device,
            queue,
            surface,
            #[cfg(target_arch = "wasm32")]
            canvas,
            power,
            device_error,
            _instance: instance,
        })
    }

    /// Take the first device error recorded since the last call.
    pub(crate) fn take_device_error(&self) -> Option<String> {
        self.device_error.lock().ok().and_then(|mut slot| slot.take())
    }
}
