use crate::error::WaveformError;
use crate::signal::FlowWaveform;
use serde::{Deserialize, Serialize};

/// Shape descriptors of one waveform cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Descriptors {
    /// Time-averaged flow rate over one cycle (ml/s).
    pub qta: f64,
    /// Pulsatility index, (max − min) / mean.
    pub pi: f64,
}

/// Time-averaged flow by trapezoidal integration over the periodic extension.
///
/// With uniform spacing `h = T/N` the integral over one period is
/// `h·(s0/2 + s1 + … + s(N−1) + sN/2)`, and periodicity makes `sN = s0`, so the
/// closing trapezoid's two half-weights recombine into one full weight at the
/// shared endpoint. Dividing by `T` leaves `(s0 + … + s(N−1))/N`: the plain
/// arithmetic mean. The sum below keeps the trapezoid form so the identity is
/// executed rather than assumed.
pub fn time_averaged_flow(samples: &[f64]) -> f64 {
    let n = samples.len();
    if n == 0 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        let next = samples[(i + 1) % n];
        acc += 0.5 * (samples[i] + next);
    }
    acc / n as f64
}

/// Compute QTA and PI for one cycle.
///
/// PI deliberately uses the raw stored samples' max/min with no periodic wrap:
/// the wrap sample duplicates sample 0 and can never introduce a new extremum,
/// so only the mean needs the periodicity argument.
pub fn descriptors(waveform: &FlowWaveform) -> Result<Descriptors, WaveformError> {
    let samples = &waveform.samples;
    if samples.len() < 2 {
        return Err(WaveformError::InsufficientData(samples.len()));
    }
    let qta = time_averaged_flow(samples);
    if qta == 0.0 {
        return Err(WaveformError::DegenerateInput("zero time-averaged flow"));
    }
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    Ok(Descriptors {
        qta,
        pi: (max - min) / qta,
    })
}
