// ─────────────────────────────────────────────────────────────────────
// Lattice Relax — Percolation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Site percolation on a square lattice.
//!
//! Interior sites (`[1, size-2]` on both axes) are occupied independently
//! with probability `p`; the outer ring stays empty. Occupied sites are then
//! grouped into 4-connected clusters with an explicit work-list, so lattice
//! size is not limited by call depth.

use lattice_types::error::{LatticeError, LatticeResult};
use lattice_types::state::MIN_DIM;
use ndarray::Array2;
use rand::Rng;
use tracing::trace;

/// Label of an unclustered or empty site.
pub const NO_CLUSTER: usize = 0;

#[derive(Debug, Clone)]
pub struct PercolationLattice {
    size: usize,
    p: f64,
    occupied: Array2<bool>,
    /// Cluster label per site, `NO_CLUSTER` when empty or not yet labelled.
    labels: Array2<usize>,
    /// Site count per cluster; index `label - 1`.
    cluster_sizes: Vec<usize>,
    /// Next label to hand out. Owned by the lattice, never shared.
    next_label: usize,
}

impl PercolationLattice {
    pub fn new(size: usize, p: f64) -> LatticeResult<Self> {
        if size < MIN_DIM {
            return Err(LatticeError::InvalidDimension { dim: size, rank: 2 });
        }
        if !(0.0..=1.0).contains(&p) {
            return Err(LatticeError::InvalidProbability(p));
        }
        Ok(PercolationLattice {
            size,
            p,
            occupied: Array2::from_elem((size, size), false),
            labels: Array2::zeros((size, size)),
            cluster_sizes: Vec::new(),
            next_label: NO_CLUSTER + 1,
        })
    }

    /// Occupy each interior site with probability `p`. Clears old clusters.
    pub fn occupy<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let n = self.size;
        self.occupied.fill(false);
        self.reset_clusters();

        let mut count = 0;
        for i in 1..n - 1 {
            for j in 1..n - 1 {
                if rng.gen_bool(self.p) {
                    self.occupied[[i, j]] = true;
                    count += 1;
                }
            }
        }
        count
    }

    /// Mark one site by hand. Clears old clusters.
    pub fn set_occupied(&mut self, i: usize, j: usize, occupied: bool) -> LatticeResult<()> {
        if i >= self.size || j >= self.size {
            return Err(LatticeError::OutOfBounds {
                low: vec![i, j],
                high: vec![i, j],
                dim: self.size,
            });
        }
        self.occupied[[i, j]] = occupied;
        self.reset_clusters();
        Ok(())
    }

    /// Label every 4-connected cluster of occupied sites.
    /// Returns the number of clusters found.
    pub fn detect_clusters(&mut self) -> usize {
        let n = self.size;
        self.reset_clusters();
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for i in 0..n {
            for j in 0..n {
                if !self.occupied[[i, j]] || self.labels[[i, j]] != NO_CLUSTER {
                    continue;
                }

                let label = self.next_label;
                self.next_label += 1;
                self.labels[[i, j]] = label;
                stack.push((i, j));
                let mut size = 0;

                while let Some((ci, cj)) = stack.pop() {
                    size += 1;
                    let neighbours = [
                        (ci.wrapping_sub(1), cj),
                        (ci + 1, cj),
                        (ci, cj.wrapping_sub(1)),
                        (ci, cj + 1),
                    ];
                    for (ni, nj) in neighbours {
                        if ni < n
                            && nj < n
                            && self.occupied[[ni, nj]]
                            && self.labels[[ni, nj]] == NO_CLUSTER
                        {
                            self.labels[[ni, nj]] = label;
                            stack.push((ni, nj));
                        }
                    }
                }

                trace!(label, size, "cluster labelled");
                self.cluster_sizes.push(size);
            }
        }

        self.cluster_sizes.len()
    }

    /// True when one cluster touches both the first and the last occupiable row.
    /// Requires `detect_clusters` to have run.
    pub fn spans(&self) -> bool {
        let n = self.size;
        let top = self.labels.row(1);
        let bottom = self.labels.row(n - 2);
        top.iter()
            .filter(|&&l| l != NO_CLUSTER)
            .any(|l| bottom.iter().any(|b| b == l))
    }

    /// Size of the largest cluster, 0 when there is none.
    pub fn largest_cluster(&self) -> usize {
        self.cluster_sizes.iter().copied().max().unwrap_or(0)
    }

    pub fn cluster_sizes(&self) -> &[usize] {
        &self.cluster_sizes
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_sizes.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }

    pub fn occupied(&self) -> &Array2<bool> {
        &self.occupied
    }

    pub fn labels(&self) -> &Array2<usize> {
        &self.labels
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn probability(&self) -> f64 {
        self.p
    }

    fn reset_clusters(&mut self) {
        self.labels.fill(NO_CLUSTER);
        self.cluster_sizes.clear();
        self.next_label = NO_CLUSTER + 1;
    }
}
