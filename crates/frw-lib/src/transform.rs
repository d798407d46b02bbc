use crate::descriptors::{descriptors, Descriptors};
use crate::error::WaveformError;
use crate::signal::{FlowWaveform, TimedWaveform};
use serde::{Deserialize, Serialize};

/// Nominal heart rate of the input waveform, beats/min.
///
/// The reference acquisition protocol fixes the cycle rate at 60 bpm; the input
/// file carries no HR of its own, so this is a modeling convention rather than
/// a measured quantity.
pub const NOMINAL_INPUT_HR_BPM: f64 = 60.0;

/// Requested descriptor triple for a transformed cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DescriptorTargets {
    /// Heart rate, beats/min.
    pub hr: f64,
    /// Pulsatility index.
    pub pi: f64,
    /// Time-averaged flow rate, ml/s.
    pub qta: f64,
}

/// The closed-form affine/time coefficients a transform resolves to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransformCoefficients {
    /// Amplitude scale.
    pub a: f64,
    /// Amplitude offset.
    pub b: f64,
    /// Time compression factor, HR*/60; the new cycle lasts 60/HR* seconds.
    pub c: f64,
}

impl TransformCoefficients {
    /// Derive (a, b, c) from the input's own descriptors and the targets.
    ///
    /// `a = (QTA*/QTA_in)·(PI*/PI_in)` scales the excursion so the rescaled
    /// range over QTA* equals PI*; `b = QTA*·(1 − PI*/PI_in)` then restores the
    /// mean to QTA* exactly.
    pub fn derive(input: Descriptors, targets: DescriptorTargets) -> Self {
        let qta_ratio = targets.qta / input.qta;
        let pi_ratio = targets.pi / input.pi;
        Self {
            a: qta_ratio * pi_ratio,
            b: targets.qta * (1.0 - pi_ratio),
            c: targets.hr / NOMINAL_INPUT_HR_BPM,
        }
    }
}

fn validate_targets(targets: &DescriptorTargets) -> Result<(), WaveformError> {
    if !(targets.hr.is_finite() && targets.pi.is_finite() && targets.qta.is_finite()) {
        return Err(WaveformError::InvalidTarget(format!(
            "non-finite target triple (hr={}, pi={}, qta={})",
            targets.hr, targets.pi, targets.qta
        )));
    }
    if targets.hr <= 0.0 {
        return Err(WaveformError::InvalidTarget(format!(
            "target HR must be positive, got {}",
            targets.hr
        )));
    }
    if targets.qta == 0.0 {
        return Err(WaveformError::InvalidTarget(
            "target QTA of 0 degenerates the amplitude scale".into(),
        ));
    }
    if targets.pi < 0.0 {
        return Err(WaveformError::InvalidTarget(format!(
            "target PI must be non-negative, got {}",
            targets.pi
        )));
    }
    Ok(())
}

/// Rescale one waveform cycle onto the requested descriptor triple.
///
/// A single affine remap of amplitude plus a linear rescale of time: recomputing
/// QTA/PI on the output values reproduces the targets to floating-point
/// precision, and the output cycle lasts exactly 60/HR* seconds. Pure function;
/// each call derives fresh coefficients from its arguments.
pub fn transform(
    waveform: &FlowWaveform,
    targets: DescriptorTargets,
) -> Result<TimedWaveform, WaveformError> {
    validate_targets(&targets)?;
    let input = descriptors(waveform)?;
    if input.pi == 0.0 {
        return Err(WaveformError::DegenerateInput("zero peak-to-peak range"));
    }

    let coeffs = TransformCoefficients::derive(input, targets);
    let n = waveform.len();
    let values: Vec<f64> = waveform
        .samples
        .iter()
        .map(|s| coeffs.a * s + coeffs.b)
        .collect();
    // Sample i at i/(c·N): N uniform steps across one cycle of 1/c = 60/HR* s.
    let times: Vec<f64> = (0..n).map(|i| i as f64 / (coeffs.c * n as f64)).collect();
    Ok(TimedWaveform { times, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, rel_tol: f64) {
        let tol = expected.abs().max(1.0) * rel_tol;
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "expected {expected}, got {actual} (diff {diff} > tol {tol})"
        );
    }

    fn reference_cycle() -> FlowWaveform {
        FlowWaveform::new(vec![1.0, 2.0, 3.0, 2.0])
    }

    #[test]
    fn round_trip_identity_at_input_descriptors() {
        let waveform = reference_cycle();
        let out = transform(
            &waveform,
            DescriptorTargets {
                hr: 60.0,
                pi: 1.0,
                qta: 2.0,
            },
        )
        .unwrap();
        for (out_v, in_v) in out.values.iter().zip(waveform.samples.iter()) {
            assert_close(*out_v, *in_v, 1e-12);
        }
        for (i, t) in out.times.iter().enumerate() {
            assert_close(*t, i as f64 / 4.0, 1e-12);
        }
    }

    #[test]
    fn concrete_scenario() {
        let out = transform(
            &reference_cycle(),
            DescriptorTargets {
                hr: 60.0,
                pi: 1.0,
                qta: 2.0,
            },
        )
        .unwrap();
        assert_eq!(out.values, vec![1.0, 2.0, 3.0, 2.0]);
        assert_eq!(out.times, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn output_reproduces_arbitrary_targets() {
        let waveform = FlowWaveform::new(vec![2.6, 4.1, 9.8, 12.3, 7.5, 3.2, 2.9, 2.7]);
        let targets = DescriptorTargets {
            hr: 85.0,
            pi: 1.7,
            qta: 6.4,
        };
        let out = transform(&waveform, targets).unwrap();

        let d = descriptors(&FlowWaveform::new(out.values.clone())).unwrap();
        assert_close(d.qta, targets.qta, 1e-9);
        assert_close(d.pi, targets.pi, 1e-9);
        assert_close(out.cycle_duration(), 60.0 / targets.hr, 1e-9);
    }

    #[test]
    fn time_axis_is_monotonic_from_zero() {
        for hr in [23.0, 60.0, 144.5] {
            let out = transform(
                &reference_cycle(),
                DescriptorTargets {
                    hr,
                    pi: 1.0,
                    qta: 2.0,
                },
            )
            .unwrap();
            assert_eq!(out.times[0], 0.0);
            assert!(out.times.windows(2).all(|w| w[1] > w[0]));
        }
    }

    #[test]
    fn zero_target_pi_flattens_to_target_mean() {
        let out = transform(
            &reference_cycle(),
            DescriptorTargets {
                hr: 60.0,
                pi: 0.0,
                qta: 5.0,
            },
        )
        .unwrap();
        for v in &out.values {
            assert_close(*v, 5.0, 1e-12);
        }
    }

    #[test]
    fn rejects_out_of_domain_targets() {
        let waveform = reference_cycle();
        for targets in [
            DescriptorTargets {
                hr: 0.0,
                pi: 1.0,
                qta: 2.0,
            },
            DescriptorTargets {
                hr: -50.0,
                pi: 1.0,
                qta: 2.0,
            },
            DescriptorTargets {
                hr: 60.0,
                pi: -0.5,
                qta: 2.0,
            },
            DescriptorTargets {
                hr: 60.0,
                pi: 1.0,
                qta: 0.0,
            },
            DescriptorTargets {
                hr: f64::NAN,
                pi: 1.0,
                qta: 2.0,
            },
        ] {
            assert!(matches!(
                transform(&waveform, targets),
                Err(WaveformError::InvalidTarget(_))
            ));
        }
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(matches!(
            transform(
                &FlowWaveform::new(vec![3.0, 3.0, 3.0]),
                DescriptorTargets {
                    hr: 60.0,
                    pi: 1.0,
                    qta: 2.0,
                },
            ),
            Err(WaveformError::DegenerateInput("zero peak-to-peak range"))
        ));
        assert!(matches!(
            transform(
                &FlowWaveform::new(vec![1.0]),
                DescriptorTargets {
                    hr: 60.0,
                    pi: 1.0,
                    qta: 2.0,
                },
            ),
            Err(WaveformError::InsufficientData(1))
        ));
    }
}
