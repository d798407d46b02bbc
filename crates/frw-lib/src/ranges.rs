use crate::transform::DescriptorTargets;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Coefficient of the empirical radius→mean-flow fit, ml/s per cm²^exponent.
pub const EMPIRICAL_FLOW_COEFF: f64 = 48.21;
/// Exponent of the empirical radius→mean-flow fit.
pub const EMPIRICAL_FLOW_EXPONENT: f64 = 1.84;
/// Vessel radius the default table is built for (metres).
pub const DEFAULT_VESSEL_RADIUS_M: f64 = 0.003;
/// Fractional band around the baseline QTA for the default table.
pub const DEFAULT_QTA_BAND: f64 = 0.3;

/// Empirical time-averaged flow (ml/s) for a vessel of radius `r` metres:
/// `Q = 48.21 · (π·r²·1e4)^1.84`, the cross-section taken in cm².
pub fn mean_flow_from_radius(radius_m: f64) -> f64 {
    let area_cm2 = std::f64::consts::PI * radius_m * radius_m * 1e4;
    EMPIRICAL_FLOW_COEFF * area_cm2.powf(EMPIRICAL_FLOW_EXPONENT)
}

/// One row of the physiological range table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DescriptorRow {
    pub hr: f64,
    pub pi: f64,
    pub qta: f64,
}

/// Physiological slider bounds: `lower`/`baseline`/`upper` per descriptor.
///
/// Application configuration, not part of the transform itself; the
/// presentation layers clamp their requests to this table so the transform's
/// validation errors stay unreachable in normal interactive use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DescriptorRanges {
    pub lower: DescriptorRow,
    pub baseline: DescriptorRow,
    pub upper: DescriptorRow,
}

impl Default for DescriptorRanges {
    fn default() -> Self {
        Self::from_radius(DEFAULT_VESSEL_RADIUS_M, DEFAULT_QTA_BAND)
    }
}

impl DescriptorRanges {
    /// Build a table around the empirical mean flow of a vessel of the given
    /// radius, with ±`band` fractional QTA bounds and fixed physiological
    /// HR/PI bounds.
    pub fn from_radius(radius_m: f64, band: f64) -> Self {
        let qta = mean_flow_from_radius(radius_m);
        Self {
            lower: DescriptorRow {
                hr: 40.0,
                pi: 1.2,
                qta: qta * (1.0 - band),
            },
            baseline: DescriptorRow {
                hr: 60.0,
                pi: 2.4,
                qta,
            },
            upper: DescriptorRow {
                hr: 100.0,
                pi: 3.6,
                qta: qta * (1.0 + band),
            },
        }
    }

    /// Parse a table from TOML text and check row ordering.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let ranges: Self = toml::from_str(text).context("parsing descriptor ranges")?;
        ranges.validate()?;
        Ok(ranges)
    }

    /// Load a table from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        for (name, lower, baseline, upper) in [
            ("hr", self.lower.hr, self.baseline.hr, self.upper.hr),
            ("pi", self.lower.pi, self.baseline.pi, self.upper.pi),
            ("qta", self.lower.qta, self.baseline.qta, self.upper.qta),
        ] {
            ensure!(
                lower <= baseline && baseline <= upper,
                "{} rows out of order: lower {} / baseline {} / upper {}",
                name,
                lower,
                baseline,
                upper
            );
        }
        ensure!(self.lower.hr > 0.0, "lower hr must be positive");
        Ok(())
    }

    /// The baseline row as a transform target triple.
    pub fn baseline_targets(&self) -> DescriptorTargets {
        DescriptorTargets {
            hr: self.baseline.hr,
            pi: self.baseline.pi,
            qta: self.baseline.qta,
        }
    }

    /// Clamp a requested triple into the table's bounds.
    pub fn clamp(&self, targets: DescriptorTargets) -> DescriptorTargets {
        DescriptorTargets {
            hr: targets.hr.clamp(self.lower.hr, self.upper.hr),
            pi: targets.pi.clamp(self.lower.pi, self.upper.pi),
            qta: targets.qta.clamp(self.lower.qta, self.upper.qta),
        }
    }
}
