use crate::color::Color;
use crate::constants::DEFAULT_LINE_WIDTH;
use crate::error::PlotError;
use crate::trace::Polarity;
use serde::{Deserialize, Serialize};

/// Backend power-preference hint.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    Default,
    #[default]
    HighPerformance,
    LowPower,
}

impl PowerPreference {
    pub fn to_wgpu(self) -> wgpu::PowerPreference {
        match self {
            PowerPreference::Default => wgpu::PowerPreference::None,
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
        }
    }
}

/// Surface-level plot configuration.
///
/// Everything here is fixed when the surface is created; changing any of it
/// means calling `recreate`. Keys are camelCase so a JavaScript options object
/// deserializes directly, and unknown keys are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlotConfig {
    pub antialias: bool,
    pub background: Color,
    pub desynchronized: bool,
    pub preserve_drawing_buffer: bool,
    pub power_performance: PowerPreference,
    pub transparent: bool,
    #[serde(rename = "heightInSensitivityReferenceUnits")]
    pub height_in_sens_ref_units: Option<f64>,
    #[serde(rename = "pxPerSensitivityReferenceUnit")]
    pub px_per_sens_ref_unit: Option<f64>,
    pub line_width: f32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            antialias: false,
            background: Color::WHITE,
            desynchronized: false,
            preserve_drawing_buffer: false,
            power_performance: PowerPreference::HighPerformance,
            transparent: true,
            height_in_sens_ref_units: None,
            px_per_sens_ref_unit: None,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl PlotConfig {
    /// Background the surface is cleared to; opaque unless the surface is
    /// transparent.
    pub fn clear_color(&self) -> Color {
        if self.transparent {
            self.background
        } else {
            let [r, g, b, _] = self.background.array();
            Color::new(r, g, b, 1.0)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, PlotError> {
        let config: PlotConfig = serde_json::from_str(json)?;
        Ok(config)
    }
}

/// Per-channel parameters passed to `add_channel`.
///
/// All fields are required: a trace's shape is fixed for its lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    pub color: Color,
    pub length: usize,
    pub sensitivity: f32,
    pub sampling_rate: f32,
    pub samples_per_px: f32,
    pub downsample_factor: usize,
    pub polarity: Polarity,
    pub scale: i32,
    pub offset: f32,
}
