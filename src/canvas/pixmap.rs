use super::Canvas2d;
use crate::color::Color;
use crate::config::PlotConfig;
use crate::error::PlotError;
use glam::Vec2;
use tiny_skia::{BlendMode, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Software 2-D surface backed by a tiny-skia pixmap.
///
/// Lives entirely in memory, so it works on every target and lets the draw
/// pass be inspected pixel by pixel.
pub struct PixmapCanvas {
    pixmap: Option<Pixmap>,
    width: u32,
    height: u32,
    antialias: bool,
}

impl PixmapCanvas {
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Straight (non-premultiplied) RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let pixmap = self
            .pixmap
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("surface has no pixels"))?;
        pixmap.save_png(path)?;
        Ok(())
    }
}

impl Canvas2d for PixmapCanvas {
    fn create(config: &PlotConfig) -> Result<Self, PlotError> {
        Ok(Self {
            pixmap: None,
            width: 0,
            height: 0,
            antialias: config.antialias,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) && self.pixmap.is_some() {
            return;
        }
        self.width = width;
        self.height = height;
        // Pixmap::new refuses zero-sized surfaces.
        self.pixmap = Pixmap::new(width, height);
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, background: Color) {
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill(background.to_skia());
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], color: Color, line_width: f32) {
        let Some(pixmap) = &mut self.pixmap else {
            return;
        };
        let mut pb = PathBuilder::with_capacity(points.len(), points.len());
        let mut iter = points.iter();
        let Some(first) = iter.next() else {
            return;
        };
        pb.move_to(first.x, first.y);
        for p in iter {
            pb.line_to(p.x, p.y);
        }
        let Some(path) = pb.finish() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = self.antialias;
        paint.blend_mode = BlendMode::Multiply;
        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}
