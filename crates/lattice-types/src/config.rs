// ─────────────────────────────────────────────────────────────────────
// Lattice Relax — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, LatticeResult};
use crate::state::Extent;

/// Top-level relaxation run description.
///
/// JSON layout:
/// ```json
/// {
///   "dim": 33, "rank": 2, "iterations": 500,
///   "sweep": { "sor": { "omega": 1.8 } },
///   "regions": [ { "low": [8, 4], "high": [8, 28], "value": 1.0 } ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxConfig {
    pub dim: usize,
    pub rank: usize,
    pub iterations: usize,
    /// Central-difference step used for the gradient (default: 1.0)
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default)]
    pub sweep: SweepMode,
    /// Split Jacobi sweeps across rows with rayon (default: false)
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
}

/// One pinned box, inclusive on both corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub low: Vec<usize>,
    pub high: Vec<usize>,
    pub value: f64,
}

/// Update rule applied to free interior cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// Every free cell reads the snapshot taken at the start of the sweep.
    #[default]
    Jacobi,
    /// In-place red-black Gauss-Seidel scaled by `omega` (1.0 = plain Gauss-Seidel).
    Sor { omega: f64 },
}

impl SweepMode {
    pub fn validate(&self) -> LatticeResult<()> {
        match *self {
            SweepMode::Jacobi => Ok(()),
            SweepMode::Sor { omega } => {
                if omega.is_finite() && omega > 0.0 && omega < 2.0 {
                    Ok(())
                } else {
                    Err(LatticeError::ConfigError(format!(
                        "SOR omega must lie in (0, 2), got {omega}"
                    )))
                }
            }
        }
    }
}

fn default_step() -> f64 {
    1.0
}

impl RelaxConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> LatticeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter that can be checked without building a field.
    pub fn validate(&self) -> LatticeResult<()> {
        let extent = self.extent()?;
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(LatticeError::InvalidStep(self.step));
        }
        self.sweep.validate()?;
        for region in &self.regions {
            extent.check_box(&region.low, &region.high)?;
            if !region.value.is_finite() {
                return Err(LatticeError::ConfigError(format!(
                    "Region value must be finite, got {}",
                    region.value
                )));
            }
        }
        Ok(())
    }

    pub fn extent(&self) -> LatticeResult<Extent> {
        Extent::new(self.dim, self.rank)
    }
}
