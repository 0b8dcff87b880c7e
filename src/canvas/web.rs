use super::Canvas2d;
use crate::color::Color;
use crate::config::PlotConfig;
use crate::error::PlotError;
use crate::web::dom;
use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// 2-D surface on a DOM canvas element.
pub struct WebCanvas {
    canvas: web::HtmlCanvasElement,
    context: web::CanvasRenderingContext2d,
}

fn context_options(config: &PlotConfig) -> JsValue {
    let options = js_sys::Object::new();
    let set = |key: &str, value: bool| {
        _ = js_sys::Reflect::set(&options, &JsValue::from_str(key), &JsValue::from_bool(value));
    };
    set("alpha", config.transparent);
    set("desynchronized", config.desynchronized);
    options.into()
}

impl Canvas2d for WebCanvas {
    fn create(config: &PlotConfig) -> Result<Self, PlotError> {
        let canvas = dom::create_canvas().map_err(|e| PlotError::Init(e.to_string()))?;
        let context = canvas
            .get_context_with_context_options("2d", &context_options(config))
            .map_err(|e| PlotError::Init(format!("{e:?}")))?
            .ok_or_else(|| PlotError::Init("2d context unavailable".into()))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| PlotError::Init(format!("{e:?}")))?;
        context.set_image_smoothing_enabled(config.antialias);
        _ = context.set_global_composite_operation("multiply");
        Ok(Self { canvas, context })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
        // Resizing resets the context state.
        _ = self.context.set_global_composite_operation("multiply");
    }

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn clear(&mut self, background: Color) {
        let (w, h) = self.size();
        self.context.clear_rect(0.0, 0.0, w as f64, h as f64);
        if background.a() > 0.0 {
            _ = self.context.set_global_composite_operation("source-over");
            self.context.set_fill_style_str(&background.to_css());
            self.context.fill_rect(0.0, 0.0, w as f64, h as f64);
            _ = self.context.set_global_composite_operation("multiply");
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], color: Color, line_width: f32) {
        let mut iter = points.iter();
        let Some(first) = iter.next() else {
            return;
        };
        self.context.begin_path();
        self.context.move_to(first.x as f64, first.y as f64);
        for p in iter {
            self.context.line_to(p.x as f64, p.y as f64);
        }
        self.context.set_line_width(line_width as f64);
        self.context.set_stroke_style_str(&color.to_css());
        self.context.stroke();
    }

    fn element(&self) -> Option<&web::HtmlCanvasElement> {
        Some(&self.canvas)
    }
}
