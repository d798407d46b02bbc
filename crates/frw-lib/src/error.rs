use thiserror::Error;

/// Validation failures of descriptor computation and the waveform transform.
///
/// All are deterministic and detected before any output is produced; callers
/// that clamp their requests to a [`crate::ranges::DescriptorRanges`] table
/// never see them in interactive use.
#[derive(Debug, Error, PartialEq)]
pub enum WaveformError {
    /// Fewer than two samples: no cycle to speak of.
    #[error("waveform has {0} sample(s), need at least 2")]
    InsufficientData(usize),
    /// The input waveform itself makes a ratio undefined (zero mean or zero
    /// peak-to-peak range).
    #[error("degenerate input waveform: {0}")]
    DegenerateInput(&'static str),
    /// The requested target triple is outside the transform's domain.
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}
