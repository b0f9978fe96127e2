// ─────────────────────────────────────────────────────────────────────
// Lattice Relax — Stencil Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Flat-index geometry for the axis-aligned `2 * rank` point stencil.
//!
//! Cells are stored row-major, so axis 0 varies slowest. Every list below is
//! built once per extent and reused by every sweep.

use lattice_types::state::Extent;

#[derive(Debug, Clone)]
pub struct Stencil {
    pub extent: Extent,
    /// Flat offset of a unit step along each axis.
    pub strides: Vec<usize>,
    /// Cells per axis-0 slab (`dim^(rank-1)`).
    pub slab_len: usize,
    /// Interior cells in sweep order.
    pub interior: Vec<usize>,
    /// Interior offsets within one slab, shared by every interior slab.
    pub slab_interior: Vec<usize>,
    /// Interior cells with even coordinate sum.
    pub red: Vec<usize>,
    /// Interior cells with odd coordinate sum.
    pub black: Vec<usize>,
}

impl Stencil {
    pub fn new(extent: Extent) -> Self {
        let dim = extent.dim;
        let rank = extent.rank;

        let mut strides = vec![1usize; rank];
        for axis in (0..rank.saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * dim;
        }
        let slab_len = strides[0];

        let mut interior = Vec::with_capacity(extent.interior_len());
        let mut red = Vec::with_capacity(extent.interior_len() / 2 + 1);
        let mut black = Vec::with_capacity(extent.interior_len() / 2 + 1);
        let mut coords = vec![0usize; rank];
        for flat in 0..extent.len() {
            decompose(flat, &strides, &mut coords);
            if coords.iter().all(|&c| c >= 1 && c + 1 < dim) {
                interior.push(flat);
                if coords.iter().sum::<usize>() % 2 == 0 {
                    red.push(flat);
                } else {
                    black.push(flat);
                }
            }
        }

        // Slab 1 is interior on axis 0; its pattern repeats in every interior slab.
        let slab_interior = interior
            .iter()
            .take_while(|&&flat| flat < 2 * slab_len)
            .map(|&flat| flat - slab_len)
            .collect();

        Stencil {
            extent,
            strides,
            slab_len,
            interior,
            slab_interior,
            red,
            black,
        }
    }

    /// Multi-index of a flat cell.
    pub fn coords(&self, flat: usize) -> Vec<usize> {
        let mut coords = vec![0usize; self.extent.rank];
        decompose(flat, &self.strides, &mut coords);
        coords
    }

    /// Flat index of a multi-index. Caller guarantees `coords` is in range.
    pub fn flat(&self, coords: &[usize]) -> usize {
        coords
            .iter()
            .zip(&self.strides)
            .map(|(&c, &s)| c * s)
            .sum()
    }

    /// Arithmetic mean of the `2 * rank` axis neighbours of an interior cell.
    ///
    /// Summation order is fixed (axis 0 first, lower neighbour before upper)
    /// so serial and parallel sweeps agree bit for bit.
    #[inline(always)]
    pub fn neighbour_mean(&self, cells: &[f64], flat: usize) -> f64 {
        let mut acc = 0.0;
        for &s in &self.strides {
            acc += cells[flat - s] + cells[flat + s];
        }
        acc / (2 * self.strides.len()) as f64
    }
}

fn decompose(mut flat: usize, strides: &[usize], coords: &mut [usize]) {
    for (c, &s) in coords.iter_mut().zip(strides) {
        *c = flat / s;
        flat %= s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides_2d() {
        let st = Stencil::new(Extent::new(5, 2).unwrap());
        assert_eq!(st.strides, vec![5, 1]);
        assert_eq!(st.slab_len, 5);
        assert_eq!(st.interior.len(), 9);
        assert_eq!(st.interior[0], 6);
        assert_eq!(st.interior[8], 18);
        assert_eq!(st.slab_interior, vec![1, 2, 3]);
    }

    #[test]
    fn test_strides_3d() {
        let st = Stencil::new(Extent::new(4, 3).unwrap());
        assert_eq!(st.strides, vec![16, 4, 1]);
        assert_eq!(st.interior.len(), 8);
        assert_eq!(st.slab_interior, vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_red_black_partition() {
        let st = Stencil::new(Extent::new(6, 2).unwrap());
        assert_eq!(st.red.len() + st.black.len(), st.interior.len());
        for &flat in &st.red {
            assert_eq!(st.coords(flat).iter().sum::<usize>() % 2, 0);
        }
        for &flat in &st.black {
            assert_eq!(st.coords(flat).iter().sum::<usize>() % 2, 1);
        }
    }

    #[test]
    fn test_coords_flat_inverse() {
        let st = Stencil::new(Extent::new(5, 3).unwrap());
        for flat in 0..125 {
            assert_eq!(st.flat(&st.coords(flat)), flat);
        }
        assert_eq!(st.coords(31), vec![1, 1, 1]);
    }

    #[test]
    fn test_neighbour_mean_2d() {
        let st = Stencil::new(Extent::new(3, 2).unwrap());
        let cells = [0.0, 1.0, 0.0, 2.0, 100.0, 3.0, 0.0, 4.0, 0.0];
        assert!((st.neighbour_mean(&cells, 4) - 2.5).abs() < 1e-15);
    }
}
