// ─────────────────────────────────────────────────────────────────────
// Lattice Relax — Capacitor Boundaries
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Parallel-plate capacitor boundary conditions.
//!
//! Two electrodes centred in the grid, normal to axis 0, held at `+voltage`
//! and `-voltage`. On a 2D grid the electrodes are lines spanning axis 1;
//! on a 3D grid they are square plates spanning axes 1 and 2.

use lattice_math::RelaxationEngine;
use lattice_types::error::{LatticeError, LatticeResult};
use lattice_types::state::Extent;
use tracing::debug;

/// Inclusive `(low, high)` corners of one electrode.
pub type PlateBox = (Vec<usize>, Vec<usize>);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacitor {
    /// Distance between the electrodes along axis 0, in cells.
    pub separation: usize,
    /// Electrode extent along every other axis, in cells.
    pub width: usize,
    /// Potential of the positive electrode; the other sits at `-voltage`.
    pub voltage: f64,
}

impl Capacitor {
    pub fn new(separation: usize, width: usize, voltage: f64) -> Self {
        Capacitor {
            separation,
            width,
            voltage,
        }
    }

    /// Positive and negative electrode boxes for `extent`, both validated.
    pub fn plate_boxes(&self, extent: Extent) -> LatticeResult<[PlateBox; 2]> {
        if self.separation == 0 || self.width == 0 {
            return Err(LatticeError::ConfigError(format!(
                "Capacitor needs separation >= 1 and width >= 1 (separation={}, width={})",
                self.separation, self.width
            )));
        }

        let centre = extent.dim / 2;
        let out_of_bounds = || LatticeError::OutOfBounds {
            low: vec![centre; extent.rank],
            high: vec![centre + self.separation.max(self.width); extent.rank],
            dim: extent.dim,
        };
        let top = centre
            .checked_sub(self.separation / 2)
            .ok_or_else(out_of_bounds)?;
        let bottom = top + self.separation;
        let start = centre
            .checked_sub(self.width / 2)
            .ok_or_else(out_of_bounds)?;
        let end = start + self.width - 1;

        let plate = |row: usize| -> PlateBox {
            let mut low = vec![start; extent.rank];
            let mut high = vec![end; extent.rank];
            low[0] = row;
            high[0] = row;
            (low, high)
        };
        let positive = plate(top);
        let negative = plate(bottom);
        extent.check_box(&positive.0, &positive.1)?;
        extent.check_box(&negative.0, &negative.1)?;

        Ok([positive, negative])
    }

    /// Pin both electrodes. Nothing is written unless both fit.
    pub fn apply(&self, engine: &mut RelaxationEngine) -> LatticeResult<()> {
        let [positive, negative] = self.plate_boxes(engine.extent())?;
        engine
            .pin_region(&positive.0, &positive.1, self.voltage)?
            .pin_region(&negative.0, &negative.1, -self.voltage)?;
        debug!(
            separation = self.separation,
            width = self.width,
            voltage = self.voltage,
            rank = engine.rank(),
            "capacitor pinned"
        );
        Ok(())
    }
}

/// Two capacitor lines on a 2D surface.
pub fn set_capacitor_lines(
    engine: &mut RelaxationEngine,
    separation: usize,
    length: usize,
    voltage: f64,
) -> LatticeResult<()> {
    require_rank(engine, 2)?;
    Capacitor::new(separation, length, voltage).apply(engine)
}

/// Two capacitor plates in 3D space.
pub fn set_capacitor_plates(
    engine: &mut RelaxationEngine,
    separation: usize,
    side: usize,
    voltage: f64,
) -> LatticeResult<()> {
    require_rank(engine, 3)?;
    Capacitor::new(separation, side, voltage).apply(engine)
}

fn require_rank(engine: &RelaxationEngine, rank: usize) -> LatticeResult<()> {
    if engine.rank() == rank {
        Ok(())
    } else {
        Err(LatticeError::InvalidDimension {
            dim: engine.dim(),
            rank: engine.rank(),
        })
    }
}
