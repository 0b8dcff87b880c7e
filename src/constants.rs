//! Rendering and scaling constants shared by both plot variants.
//!
//! These keep magic numbers out of the draw paths and give the tests a single
//! place to check relationships between them.

// Reference units the plot height spans when the config specifies neither
// `heightInSensitivityReferenceUnits` nor `pxPerSensitivityReferenceUnit`.
pub const DEFAULT_HEIGHT_IN_SENS_REF_UNITS: f64 = 10.0;

// Clip space spans [-1, 1] on both axes.
pub const CLIP_SPACE_SPAN: f32 = 2.0;

// MSAA sample count requested when `antialias` is on
pub const MSAA_SAMPLE_COUNT: u32 = 4;

// A line strip needs at least two vertices to produce a segment.
pub const MIN_DRAWABLE_POINTS: usize = 2;

// Bytes per interleaved (x, y) vertex.
pub const VERTEX_STRIDE: u64 = 2 * std::mem::size_of::<f32>() as u64;

// Default stroke width of the 2-D fallback, in CSS pixels.
pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

// Device pixel ratio assumed when the host cannot report one.
pub const DEFAULT_DEVICE_PIXEL_RATIO: f64 = 1.0;
