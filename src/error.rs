use crate::trace::TraceId;

/// Failures reported by plot and trace operations.
///
/// None of these are fatal to the caller: the operation that produced the
/// error leaves prior state untouched, and the plot keeps running (possibly
/// inert) until the next successful `recreate`.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("the plot backend is not initialized")]
    NotReady,
    #[error("{name} must be greater than zero, {value} was given")]
    NonPositive { name: &'static str, value: f64 },
    #[error("downsample factor must be at least 1")]
    InvalidDownsampleFactor,
    #[error("x step must be at least 1")]
    InvalidStep,
    #[error("no trace matches {0:?}")]
    UnknownTrace(TraceId),
    #[error("backend initialization failed: {0}")]
    Init(String),
    #[error("frame readback failed: {0}")]
    Readback(String),
    #[error("invalid plot config: {0}")]
    Config(#[from] serde_json::Error),
}

impl PlotError {
    /// Check a strictly positive, finite parameter.
    pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<(), PlotError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(PlotError::NonPositive { name, value })
        }
    }
}
