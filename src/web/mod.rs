//! JavaScript bindings.
//!
//! `WaveformPlot` wraps whichever plot variant the browser supports and
//! addresses traces by their insertion index, like the JS API always has.

pub mod dom;
mod frame;

use crate::config::{ChannelConfig, PlotConfig};
use crate::error::PlotError;
use crate::plot::BiosignalPlot;
use crate::trace::TraceId;
use crate::viewport::PlotContainer;
use frame::RenderLoop;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("biosignal-plot {} loaded", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// DOM element hosting a plot canvas.
///
/// Sizes are taken from the padding box (`clientWidth`/`clientHeight`), the
/// box an absolutely positioned canvas at `top: 0; left: 0; height: 100%`
/// actually fills.
pub struct HtmlContainer {
    element: web::HtmlElement,
}

impl HtmlContainer {
    pub fn new(element: web::HtmlElement) -> Self {
        Self { element }
    }
}

impl PlotContainer for HtmlContainer {
    fn content_size(&self) -> (f64, f64) {
        (
            self.element.client_width() as f64,
            self.element.client_height() as f64,
        )
    }

    fn device_pixel_ratio(&self) -> f64 {
        dom::device_pixel_ratio()
    }

    fn mount(&self, canvas: &web::HtmlCanvasElement, width_px: f64) {
        dom::mount_canvas(&self.element, canvas, width_px);
    }
}

fn to_js(e: PlotError) -> JsError {
    JsError::new(&e.to_string())
}

fn to_json(value: &JsValue) -> Result<Option<String>, PlotError> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let json = js_sys::JSON::stringify(value)
        .map_err(|e| PlotError::Init(format!("{e:?}")))?;
    Ok(json.as_string())
}

fn parse_plot_config(value: &JsValue) -> Result<PlotConfig, PlotError> {
    match to_json(value)? {
        Some(json) => PlotConfig::from_json(&json),
        None => Ok(PlotConfig::default()),
    }
}

#[wasm_bindgen]
pub struct WaveformPlot {
    plot: Rc<RefCell<Box<dyn BiosignalPlot>>>,
    render_loop: RenderLoop,
}

impl WaveformPlot {
    fn trace_id(&self, index: usize) -> Result<TraceId, JsError> {
        self.plot
            .borrow()
            .trace_id_at(index)
            .ok_or_else(|| JsError::new(&format!("no trace at index {index}")))
    }
}

#[wasm_bindgen]
impl WaveformPlot {
    /// Create a plot, preferring WebGPU and falling back to a 2-D canvas.
    pub async fn create(config: JsValue) -> Result<WaveformPlot, JsError> {
        let config = parse_plot_config(&config).map_err(to_js)?;
        let plot = Rc::new(RefCell::new(crate::create_plot(config).await));
        Ok(WaveformPlot {
            render_loop: RenderLoop::new(plot.clone()),
            plot,
        })
    }

    #[wasm_bindgen(js_name = addTo)]
    pub fn add_to(&self, container: web::HtmlElement) {
        self.plot
            .borrow_mut()
            .add_to(Rc::new(HtmlContainer::new(container)));
    }

    /// Returns the index of the new trace.
    #[wasm_bindgen(js_name = addChannel)]
    pub fn add_channel(&self, config: JsValue) -> Result<usize, JsError> {
        let json = to_json(&config)
            .map_err(to_js)?
            .ok_or_else(|| JsError::new("channel config is required"))?;
        let channel: ChannelConfig = serde_json::from_str(&json)
            .map_err(|e| to_js(PlotError::Config(e)))?;
        let id = self.plot.borrow_mut().add_channel(channel).map_err(to_js)?;
        Ok(id.index())
    }

    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(
        &self,
        index: usize,
        samples: Vec<f32>,
        downsample_factor: Option<usize>,
    ) -> Result<(), JsError> {
        let id = self.trace_id(index)?;
        let mut plot = self.plot.borrow_mut();
        let trace = plot.trace_mut(id).ok_or_else(|| to_js(PlotError::UnknownTrace(id)))?;
        trace.set_data(&samples, downsample_factor).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setConstant)]
    pub fn set_constant(&self, index: usize, value: f32) -> Result<(), JsError> {
        let id = self.trace_id(index)?;
        let mut plot = self.plot.borrow_mut();
        let trace = plot.trace_mut(id).ok_or_else(|| to_js(PlotError::UnknownTrace(id)))?;
        trace.set_data(value, None).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setSensitivity)]
    pub fn set_sensitivity(&self, index: usize, value: f32) -> Result<(), JsError> {
        let id = self.trace_id(index)?;
        let mut plot = self.plot.borrow_mut();
        let trace = plot.trace_mut(id).ok_or_else(|| to_js(PlotError::UnknownTrace(id)))?;
        trace.set_sensitivity(value).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&self, index: usize, visible: bool) -> Result<(), JsError> {
        let id = self.trace_id(index)?;
        let mut plot = self.plot.borrow_mut();
        let trace = plot.trace_mut(id).ok_or_else(|| to_js(PlotError::UnknownTrace(id)))?;
        trace.set_render(visible);
        Ok(())
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&self) {
        self.plot.borrow_mut().clear_all();
    }

    #[wasm_bindgen(js_name = clearCanvas)]
    pub fn clear_canvas(&self) {
        self.plot.borrow_mut().clear_canvas();
    }

    pub fn recreate(&self, config: JsValue) -> Result<(), JsError> {
        let config = parse_plot_config(&config).map_err(to_js)?;
        self.plot.borrow_mut().recreate(config);
        Ok(())
    }

    #[wasm_bindgen(js_name = resetViewport)]
    pub fn reset_viewport(&self) {
        self.plot.borrow_mut().reset_viewport();
    }

    #[wasm_bindgen(js_name = resetWidth)]
    pub fn reset_width(&self, width: Option<f64>) {
        self.plot.borrow_mut().reset_width(width);
    }

    pub fn update(&self) {
        self.plot.borrow_mut().update();
    }

    #[wasm_bindgen(js_name = isAccelerated)]
    pub fn is_accelerated(&self) -> bool {
        self.plot.borrow().is_accelerated()
    }

    #[wasm_bindgen(getter = pxPerSensitivityReferenceUnit)]
    pub fn px_per_sens_ref_unit(&self) -> f64 {
        self.plot.borrow().px_per_sens_ref_unit()
    }

    #[wasm_bindgen(setter = pxPerSensitivityReferenceUnit)]
    pub fn set_px_per_sens_ref_unit(&self, value: f64) {
        _ = self.plot.borrow_mut().set_px_per_sens_ref_unit(value);
    }

    #[wasm_bindgen(getter = heightInSensitivityReferenceUnits)]
    pub fn height_in_sens_ref_units(&self) -> f64 {
        self.plot.borrow().height_in_sens_ref_units()
    }

    #[wasm_bindgen(setter = heightInSensitivityReferenceUnits)]
    pub fn set_height_in_sens_ref_units(&self, value: f64) {
        _ = self.plot.borrow_mut().set_height_in_sens_ref_units(value);
    }

    #[wasm_bindgen(js_name = stopRenderLoop)]
    pub fn stop_render_loop(&self) {
        self.render_loop.stop();
    }
}

/// Redraw `plot` on every animation frame until `stopRenderLoop` is called.
#[wasm_bindgen(js_name = startRenderLoop)]
pub fn start_render_loop(plot: &WaveformPlot) {
    plot.render_loop.start();
}
