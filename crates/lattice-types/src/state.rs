// ─────────────────────────────────────────────────────────────────────
// Lattice Relax — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{LatticeError, LatticeResult};

/// Smallest extent with a non-empty interior `[1, dim-2]`.
pub const MIN_DIM: usize = 3;

/// Square (rank 2) or cubic (rank 3) grid extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub dim: usize,
    pub rank: usize,
}

impl Extent {
    pub fn new(dim: usize, rank: usize) -> LatticeResult<Self> {
        if dim < MIN_DIM || !(2..=3).contains(&rank) {
            return Err(LatticeError::InvalidDimension { dim, rank });
        }
        Ok(Extent { dim, rank })
    }

    /// `[dim; rank]`, row-major order.
    pub fn shape(&self) -> Vec<usize> {
        vec![self.dim; self.rank]
    }

    pub fn len(&self) -> usize {
        self.dim.pow(self.rank as u32)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of cells with every coordinate in `[1, dim-2]`.
    pub fn interior_len(&self) -> usize {
        (self.dim - 2).pow(self.rank as u32)
    }

    pub fn is_interior(&self, index: &[usize]) -> bool {
        index.len() == self.rank && index.iter().all(|&i| i >= 1 && i + 1 < self.dim)
    }

    /// Validate an inclusive box before anything is written to it.
    pub fn check_box(&self, low: &[usize], high: &[usize]) -> LatticeResult<()> {
        let fits = low.len() == self.rank
            && high.len() == self.rank
            && low
                .iter()
                .zip(high)
                .all(|(&lo, &hi)| lo <= hi && hi < self.dim);
        if fits {
            Ok(())
        } else {
            Err(LatticeError::OutOfBounds {
                low: low.to_vec(),
                high: high.to_vec(),
                dim: self.dim,
            })
        }
    }
}

/// Lifecycle of a relaxation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Constructed, boundaries possibly pinned, never relaxed.
    Configured,
    /// At least one `relax` call applied.
    Relaxed,
}
