use crate::color::Color;
use crate::config::ChannelConfig;
use crate::constants::CLIP_SPACE_SPAN;
use crate::error::PlotError;
use serde::{Deserialize, Serialize};

/// Display polarity multiplier of a channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Polarity {
    #[default]
    Normal,
    Inverted,
}

impl Polarity {
    #[inline]
    pub fn factor(self) -> f32 {
        match self {
            Polarity::Normal => 1.0,
            Polarity::Inverted => -1.0,
        }
    }
}

impl TryFrom<i8> for Polarity {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Polarity::Normal),
            -1 => Ok(Polarity::Inverted),
            other => Err(format!("polarity must be 1 or -1, got {other}")),
        }
    }
}

impl From<Polarity> for i8 {
    fn from(p: Polarity) -> Self {
        match p {
            Polarity::Normal => 1,
            Polarity::Inverted => -1,
        }
    }
}

/// Handle to a trace inside its plot.
///
/// The generation changes whenever the plot drops all of its traces, so a
/// stale handle never resolves to a trace added later.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TraceId {
    pub(crate) generation: u32,
    pub(crate) index: u32,
}

impl TraceId {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Input accepted by [`Trace::set_data`].
#[derive(Copy, Clone, Debug)]
pub enum SampleData<'a> {
    /// Broadcast one value to every point (blank or flat-line a trace).
    Constant(f32),
    /// Raw samples, decimated by the downsample factor.
    Samples(&'a [f32]),
}

impl From<f32> for SampleData<'_> {
    fn from(v: f32) -> Self {
        SampleData::Constant(v)
    }
}

impl<'a> From<&'a [f32]> for SampleData<'a> {
    fn from(v: &'a [f32]) -> Self {
        SampleData::Samples(v)
    }
}

impl<'a> From<&'a Vec<f32>> for SampleData<'a> {
    fn from(v: &'a Vec<f32>) -> Self {
        SampleData::Samples(v.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [f32; N]> for SampleData<'a> {
    fn from(v: &'a [f32; N]) -> Self {
        SampleData::Samples(v.as_slice())
    }
}

/// One channel's drawable signal.
///
/// Holds a fixed-length buffer of interleaved `(x, y)` clip-space pairs and
/// the per-channel display parameters. The buffer length never changes after
/// construction; only the y values are rewritten by `set_data`.
#[derive(Clone, Debug)]
pub struct Trace {
    xy: Vec<f32>,
    color: Color,
    downsample_factor: usize,
    offset: f32,
    polarity: Polarity,
    render: bool,
    samples_per_px: f32,
    sampling_rate: f32,
    scale: i32,
    sensitivity: f32,
}

impl Trace {
    pub fn new(channel: &ChannelConfig) -> Result<Self, PlotError> {
        PlotError::ensure_positive("sensitivity", channel.sensitivity as f64)?;
        if channel.downsample_factor == 0 {
            return Err(PlotError::InvalidDownsampleFactor);
        }
        let mut trace = Self {
            xy: vec![0.0; 2 * channel.length],
            color: channel.color,
            downsample_factor: channel.downsample_factor,
            offset: channel.offset,
            polarity: channel.polarity,
            render: true,
            samples_per_px: channel.samples_per_px,
            sampling_rate: channel.sampling_rate,
            scale: channel.scale,
            sensitivity: channel.sensitivity,
        };
        trace.reset_data();
        Ok(trace)
    }

    /// Number of points in the trace.
    #[inline]
    pub fn len(&self) -> usize {
        self.xy.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xy.is_empty()
    }

    /// Interleaved `(x, y)` pairs, ready for vertex upload.
    #[inline]
    pub fn xy(&self) -> &[f32] {
        &self.xy
    }

    /// Snapshot of the y components.
    pub fn get_data(&self) -> Vec<f32> {
        self.ys().collect()
    }

    pub fn ys(&self) -> impl Iterator<Item = f32> + '_ {
        self.xy.iter().skip(1).step_by(2).copied()
    }

    /// Reset x to even spacing over the full width and y to zero.
    pub fn reset_data(&mut self) {
        let len = self.len();
        // Step 1 is always valid.
        let _ = self.init_data(len, 1);
    }

    /// Space x values `step` points apart across clip space and zero all y.
    ///
    /// `length` sets the spacing (`2 / length` per point) and is clamped to
    /// the buffer; 0 means the buffer length. Points that would fall past the
    /// right edge are pinned to it.
    pub fn init_data(&mut self, length: usize, step: usize) -> Result<(), PlotError> {
        if step == 0 {
            log::warn!("[trace] init_data: x step must be at least 1");
            return Err(PlotError::InvalidStep);
        }
        let n = self.len();
        let length = if length == 0 { n } else { length.min(n) };
        if length == 0 {
            return Ok(());
        }
        let clip_step = CLIP_SPACE_SPAN / length as f32;
        let mut past_edge = false;
        for (i, pair) in self.xy.chunks_exact_mut(2).enumerate() {
            let x = (i * step) as f32 * clip_step - 1.0;
            past_edge |= x > 1.0;
            pair[0] = if past_edge { 1.0 } else { x };
            pair[1] = 0.0;
        }
        Ok(())
    }

    /// Write new y values.
    ///
    /// A constant is broadcast to every point. Samples are decimated by
    /// taking every `downsample_factor`-th value (the trace's own factor when
    /// `None`) until either the trace or the input runs out; the remaining
    /// points are zeroed. No averaging across skipped samples.
    ///
    /// A trailing partial stride still contributes its first sample, so the
    /// decimated count rounds up: 7 samples at factor 2 fill 4 points, not 3.
    pub fn set_data<'a>(
        &mut self,
        data: impl Into<SampleData<'a>>,
        downsample_factor: Option<usize>,
    ) -> Result<(), PlotError> {
        match data.into() {
            SampleData::Constant(v) => {
                for y in self.xy.iter_mut().skip(1).step_by(2) {
                    *y = v;
                }
            }
            SampleData::Samples(samples) => {
                let factor = downsample_factor.unwrap_or(self.downsample_factor);
                if factor == 0 {
                    log::warn!("[trace] set_data: downsample factor must be at least 1");
                    return Err(PlotError::InvalidDownsampleFactor);
                }
                let mut decimated = samples.iter().step_by(factor);
                for y in self.xy.iter_mut().skip(1).step_by(2) {
                    *y = decimated.next().copied().unwrap_or(0.0);
                }
            }
        }
        Ok(())
    }

    pub fn set_sensitivity(&mut self, value: f32) -> Result<(), PlotError> {
        if let Err(e) = PlotError::ensure_positive("sensitivity", value as f64) {
            log::warn!("[trace] {e}");
            return Err(e);
        }
        self.sensitivity = value;
        Ok(())
    }

    #[inline]
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }
    #[inline]
    pub fn scale(&self) -> i32 {
        self.scale
    }
    pub fn set_scale(&mut self, scale: i32) {
        self.scale = scale;
    }
    #[inline]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.polarity = polarity;
    }
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
    /// Whether the trace is drawn. Hidden traces keep their buffers.
    #[inline]
    pub fn render(&self) -> bool {
        self.render
    }
    pub fn set_render(&mut self, render: bool) {
        self.render = render;
    }
    #[inline]
    pub fn sampling_rate(&self) -> f32 {
        self.sampling_rate
    }
    #[inline]
    pub fn samples_per_px(&self) -> f32 {
        self.samples_per_px
    }
    #[inline]
    pub fn downsample_factor(&self) -> usize {
        self.downsample_factor
    }
}
