use serde::{Deserialize, Serialize};

/// One cycle of a periodic flow-rate waveform, uniformly sampled.
///
/// Sample `i` sits at time `i·T/N` for cycle period `T`; sample `N` is
/// identified with sample 0, so the stored sequence covers the cycle without
/// repeating the shared endpoint. Flow values are in ml/s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowWaveform {
    pub samples: Vec<f64>,
}

impl FlowWaveform {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A transformed cycle: explicit (time, flow) pairs, `times[0] == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedWaveform {
    /// Sample times in seconds, strictly increasing from 0.
    pub times: Vec<f64>,
    /// Flow values in ml/s, same length as `times`.
    pub values: Vec<f64>,
}

impl TimedWaveform {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Duration of the full cycle: the implied sample `N` (≡ sample 0) sits one
    /// step past the last stored time.
    pub fn cycle_duration(&self) -> f64 {
        match (self.times.last(), self.times.get(1)) {
            (Some(last), Some(step)) => last + (step - self.times[0]),
            _ => 0.0,
        }
    }

    /// (time, value) points for plotting.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.times
            .iter()
            .zip(self.values.iter())
            .map(|(t, v)| [*t, *v])
            .collect()
    }
}
