//! Amplitude transform from raw trace values to clip space.
//!
//! Both plot variants draw with the same math: the GPU path hands the
//! transform to the vertex shader as a uniform, the 2-D path applies it on the
//! CPU before stroking.

use crate::constants::CLIP_SPACE_SPAN;
use crate::trace::Trace;
use glam::{Mat2, Vec2};

/// Vertical clip-space units per raw signal unit.
///
/// `2 * 10^scale / (height_in_sens_ref_units * sensitivity)`; the factor of
/// two is the height of clip space.
#[inline]
pub fn amp_scale(scale: i32, sensitivity: f32, height_in_sens_ref_units: f64) -> f32 {
    let magnitude = 10f64.powi(scale);
    (CLIP_SPACE_SPAN as f64 * magnitude / (height_in_sens_ref_units * sensitivity as f64)) as f32
}

/// Map an offset fraction of the plot height (0 = bottom) into clip space.
#[inline]
pub fn offset_to_clip(offset: f32) -> f32 {
    offset * 2.0 - 1.0
}

/// Per-trace affine transform: `p' = scale * p + offset`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TraceTransform {
    pub scale: Mat2,
    pub offset: Vec2,
}

impl TraceTransform {
    pub fn for_trace(trace: &Trace, height_in_sens_ref_units: f64) -> Self {
        let amp = amp_scale(trace.scale(), trace.sensitivity(), height_in_sens_ref_units);
        Self {
            scale: Mat2::from_cols(Vec2::X, Vec2::new(0.0, amp * trace.polarity().factor())),
            offset: Vec2::new(0.0, offset_to_clip(trace.offset())),
        }
    }

    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> Vec2 {
        self.scale * Vec2::new(x, y) + self.offset
    }
}

/// Convert a clip-space point to surface pixels (origin top-left, y down).
#[inline]
pub fn clip_to_pixel(p: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new((p.x + 1.0) * 0.5 * width, (1.0 - p.y) * 0.5 * height)
}
