use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn device_pixel_ratio() -> f64 {
    web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
}

/// Create a detached canvas element for a plot surface.
pub fn create_canvas() -> anyhow::Result<web::HtmlCanvasElement> {
    let document = window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(canvas)
}

/// Replace the container's children with `canvas`, stretched to the
/// container height and pinned to `width_px` CSS pixels.
pub fn mount_canvas(container: &web::HtmlElement, canvas: &web::HtmlCanvasElement, width_px: f64) {
    let style = container.style();
    _ = style.set_property("position", "relative");
    _ = style.set_property("overflow", "hidden");
    while let Some(child) = container.last_child() {
        _ = container.remove_child(&child);
    }
    _ = container.append_child(canvas);

    let style = canvas.style();
    _ = style.set_property("position", "absolute");
    _ = style.set_property("top", "0");
    _ = style.set_property("left", "0");
    _ = style.set_property("height", "100%");
    _ = style.set_property("pointer-events", "none");
    set_canvas_width(canvas, width_px);
}

pub fn set_canvas_width(canvas: &web::HtmlCanvasElement, width_px: f64) {
    _ = canvas.style().set_property("width", &format!("{width_px}px"));
}

pub fn set_canvas_backing_size(canvas: &web::HtmlCanvasElement, width: u32, height: u32) {
    if canvas.width() != width {
        canvas.set_width(width.max(1));
    }
    if canvas.height() != height {
        canvas.set_height(height.max(1));
    }
}
