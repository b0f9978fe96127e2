// ─────────────────────────────────────────────────────────────────────
// Lattice Relax — Field Gradient
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Central-difference field of a relaxed potential.
//!
//! For every free interior cell and every axis:
//!   E_axis = -(V[c - 1_axis] - V[c + 1_axis]) / (2 ds)
//! Pinned cells are skipped. Output order is the sweep order (axis 0 slowest).

use lattice_types::error::{LatticeError, LatticeResult};
use lattice_types::state::Extent;
use ndarray::ArrayViewD;

use crate::stencil::Stencil;

/// Field vector at one interior cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientSample {
    /// Multi-index of the cell.
    pub index: Vec<usize>,
    /// One component per axis.
    pub components: Vec<f64>,
}

impl GradientSample {
    pub fn magnitude(&self) -> f64 {
        self.components.iter().map(|c| c * c).sum::<f64>().sqrt()
    }
}

/// Gradient of an arbitrary square/cubic field with no lifecycle guard.
///
/// `mask` must have the same shape as `field`; `ds` must be finite and > 0.
pub fn central_gradient(
    field: ArrayViewD<'_, f64>,
    mask: ArrayViewD<'_, bool>,
    ds: f64,
) -> LatticeResult<Vec<GradientSample>> {
    if !ds.is_finite() || ds <= 0.0 {
        return Err(LatticeError::InvalidStep(ds));
    }
    let shape = field.shape();
    let dim = shape.first().copied().unwrap_or(0);
    if shape.iter().any(|&n| n != dim) {
        return Err(LatticeError::InvalidDimension {
            dim,
            rank: shape.len(),
        });
    }
    let extent = Extent::new(dim, shape.len())?;
    if mask.shape() != shape {
        return Err(LatticeError::InvalidState(format!(
            "mask shape {:?} does not match field shape {:?}",
            mask.shape(),
            shape
        )));
    }

    let stencil = Stencil::new(extent);
    let inv_two_ds = 1.0 / (2.0 * ds);
    let mut neighbour = vec![0usize; extent.rank];

    let free: Vec<Vec<usize>> = stencil
        .interior
        .iter()
        .map(|&flat| stencil.coords(flat))
        .filter(|coords| !mask[coords.as_slice()])
        .collect();

    let expected = free.len();
    let mut samples = Vec::with_capacity(expected);
    for index in free {
        let mut components = Vec::with_capacity(extent.rank);
        for axis in 0..extent.rank {
            neighbour.copy_from_slice(&index);
            neighbour[axis] = index[axis] - 1;
            let lower = field[neighbour.as_slice()];
            neighbour[axis] = index[axis] + 1;
            let upper = field[neighbour.as_slice()];
            components.push(-(lower - upper) * inv_two_ds);
        }
        samples.push(GradientSample { index, components });
    }

    debug_assert_eq!(samples.len(), expected);
    Ok(samples)
}
