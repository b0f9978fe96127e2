// ─────────────────────────────────────────────────────────────────────
// Lattice Relax — Relaxation Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Dirichlet-pinned Laplace relaxation on square and cubic grids.
//!
//! Each free interior cell is replaced by the mean of its `2 * rank` axis
//! neighbours. The default Jacobi sweep reads a snapshot taken at the start
//! of the sweep, so the result does not depend on visiting order. The SOR
//! mode updates in place (red pass, then black pass) and is therefore a
//! Gauss-Seidel variant; `omega = 1.0` is plain red-black Gauss-Seidel.
//!
//! Pinned cells are never written by a sweep. Cells on the outer faces are
//! never written either, pinned or not.

use lattice_types::config::{RelaxConfig, SweepMode};
use lattice_types::error::{LatticeError, LatticeResult};
use lattice_types::state::{Extent, FieldState};
use ndarray::{ArrayD, ArrayViewD, IxDyn, Slice};
use rayon::prelude::*;
use tracing::{debug, debug_span};

use crate::gradient::{central_gradient, GradientSample};
use crate::stencil::Stencil;

/// One Jacobi sweep. `snapshot` is overwritten with the pre-sweep values.
pub fn jacobi_step(cells: &mut [f64], pinned: &[bool], stencil: &Stencil, snapshot: &mut Vec<f64>) {
    snapshot.clear();
    snapshot.extend_from_slice(cells);
    let dim = stencil.extent.dim;

    for (slab_idx, slab) in cells.chunks_mut(stencil.slab_len).enumerate() {
        if slab_idx == 0 || slab_idx == dim - 1 {
            continue;
        }
        update_slab(slab, slab_idx, pinned, stencil, snapshot);
    }
}

/// Jacobi sweep with axis-0 slabs distributed over the rayon pool.
/// Produces exactly the values of [`jacobi_step`].
pub fn jacobi_step_parallel(
    cells: &mut [f64],
    pinned: &[bool],
    stencil: &Stencil,
    snapshot: &mut Vec<f64>,
) {
    snapshot.clear();
    snapshot.extend_from_slice(cells);
    let dim = stencil.extent.dim;
    let snapshot: &[f64] = snapshot;

    cells
        .par_chunks_mut(stencil.slab_len)
        .enumerate()
        .for_each(|(slab_idx, slab)| {
            if slab_idx == 0 || slab_idx == dim - 1 {
                return;
            }
            update_slab(slab, slab_idx, pinned, stencil, snapshot);
        });
}

#[inline(always)]
fn update_slab(
    slab: &mut [f64],
    slab_idx: usize,
    pinned: &[bool],
    stencil: &Stencil,
    snapshot: &[f64],
) {
    let base = slab_idx * stencil.slab_len;
    for &offset in &stencil.slab_interior {
        let flat = base + offset;
        if pinned[flat] {
            continue;
        }
        slab[offset] = stencil.neighbour_mean(snapshot, flat);
    }
}

/// One red-black SOR sweep, in place.
///
/// `omega`: relaxation factor (1.0 = Gauss-Seidel, 1.8-1.9 = over-relaxation)
pub fn sor_step(cells: &mut [f64], pinned: &[bool], stencil: &Stencil, omega: f64) {
    for colour in [&stencil.red, &stencil.black] {
        for &flat in colour.iter() {
            if pinned[flat] {
                continue;
            }
            let p_star = stencil.neighbour_mean(cells, flat);
            cells[flat] = (1.0 - omega) * cells[flat] + omega * p_star;
        }
    }
}

/// L-infinity distance between each free interior cell and its neighbour mean.
/// Zero exactly at a fixed point of the sweep.
pub fn relax_residual(cells: &[f64], pinned: &[bool], stencil: &Stencil) -> f64 {
    stencil
        .interior
        .iter()
        .filter(|&&flat| !pinned[flat])
        .map(|&flat| (stencil.neighbour_mean(cells, flat) - cells[flat]).abs())
        .fold(0.0_f64, f64::max)
}

/// Dense scalar field with pinned Dirichlet cells.
///
/// ```text
/// let mut engine = RelaxationEngine::new(33, 2)?;
/// engine
///     .pin_region(&[8, 4], &[8, 28], 1.0)?
///     .pin_region(&[24, 4], &[24, 28], -1.0)?;
/// engine.relax(2000);
/// let e = engine.gradient(1.0)?;
/// ```
#[derive(Debug, Clone)]
pub struct RelaxationEngine {
    field: ArrayD<f64>,
    mask: ArrayD<bool>,
    stencil: Stencil,
    snapshot: Vec<f64>,
    sweep: SweepMode,
    parallel: bool,
    sweeps: usize,
    state: FieldState,
}

impl RelaxationEngine {
    /// Zero field of extent `dim^rank`. Needs `dim >= 3` and rank 2 or 3.
    pub fn new(dim: usize, rank: usize) -> LatticeResult<Self> {
        let extent = Extent::new(dim, rank)?;
        let shape = IxDyn(&extent.shape());
        debug!(dim, rank, cells = extent.len(), "relaxation field created");

        Ok(RelaxationEngine {
            field: ArrayD::zeros(shape.clone()),
            mask: ArrayD::from_elem(shape, false),
            stencil: Stencil::new(extent),
            snapshot: Vec::with_capacity(extent.len()),
            sweep: SweepMode::Jacobi,
            parallel: false,
            sweeps: 0,
            state: FieldState::Configured,
        })
    }

    /// Build and pin every region of a validated config. Does not relax.
    pub fn from_config(config: &RelaxConfig) -> LatticeResult<Self> {
        config.validate()?;
        let mut engine = Self::new(config.dim, config.rank)?
            .with_sweep(config.sweep)?
            .with_parallel(config.parallel);
        for region in &config.regions {
            engine.pin_region(&region.low, &region.high, region.value)?;
        }
        Ok(engine)
    }

    pub fn with_sweep(mut self, sweep: SweepMode) -> LatticeResult<Self> {
        sweep.validate()?;
        self.sweep = sweep;
        Ok(self)
    }

    /// Parallel sweeps only apply to Jacobi; SOR stays sequential.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Assign `value` to the inclusive box `[low, high]` and pin it.
    ///
    /// The box is validated in full before anything is written, so a
    /// failing call leaves the field untouched. Overlapping boxes are
    /// accepted: the later value wins and pinning is a union.
    pub fn pin_region(
        &mut self,
        low: &[usize],
        high: &[usize],
        value: f64,
    ) -> LatticeResult<&mut Self> {
        self.stencil.extent.check_box(low, high)?;

        let bounds = |axis: usize| Slice::new(low[axis] as isize, Some(high[axis] as isize + 1), 1);
        self.field
            .slice_each_axis_mut(|ax| bounds(ax.axis.index()))
            .fill(value);
        self.mask
            .slice_each_axis_mut(|ax| bounds(ax.axis.index()))
            .fill(true);

        debug!(?low, ?high, value, "region pinned");
        Ok(self)
    }

    /// Run exactly `iterations` sweeps. No convergence test.
    pub fn relax(&mut self, iterations: usize) -> &mut Self {
        let span = debug_span!("relax", iterations, sweep = ?self.sweep, parallel = self.parallel);
        let _guard = span.enter();

        let cells = self
            .field
            .as_slice_mut()
            .expect("field is allocated in standard layout");
        let pinned = self
            .mask
            .as_slice()
            .expect("mask is allocated in standard layout");

        for _ in 0..iterations {
            match self.sweep {
                SweepMode::Jacobi if self.parallel => {
                    jacobi_step_parallel(cells, pinned, &self.stencil, &mut self.snapshot)
                }
                SweepMode::Jacobi => jacobi_step(cells, pinned, &self.stencil, &mut self.snapshot),
                SweepMode::Sor { omega } => sor_step(cells, pinned, &self.stencil, omega),
            }
        }

        self.sweeps += iterations;
        self.state = FieldState::Relaxed;
        debug!(total_sweeps = self.sweeps, residual = self.residual(), "relax finished");
        self
    }

    /// Max-norm of the sweep update that would be applied next.
    pub fn residual(&self) -> f64 {
        match (self.field.as_slice(), self.mask.as_slice()) {
            (Some(cells), Some(pinned)) => relax_residual(cells, pinned, &self.stencil),
            _ => f64::NAN,
        }
    }

    /// Central-difference field `E_axis = -(V[c - 1] - V[c + 1]) / (2 ds)`
    /// at every free interior cell, in sweep order.
    ///
    /// Fails with `InvalidState` before the first `relax` call.
    pub fn gradient(&self, ds: f64) -> LatticeResult<Vec<GradientSample>> {
        if self.state != FieldState::Relaxed {
            return Err(LatticeError::InvalidState(
                "gradient requested before any relaxation".to_string(),
            ));
        }
        central_gradient(self.field.view(), self.mask.view(), ds)
    }

    pub fn field(&self) -> ArrayViewD<'_, f64> {
        self.field.view()
    }

    pub fn mask(&self) -> ArrayViewD<'_, bool> {
        self.mask.view()
    }

    /// Value at a multi-index, `None` if out of range.
    pub fn value(&self, index: &[usize]) -> Option<f64> {
        self.field.get(index).copied()
    }

    pub fn is_pinned(&self, index: &[usize]) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }

    pub fn pinned_count(&self) -> usize {
        self.mask.iter().filter(|&&p| p).count()
    }

    pub fn dim(&self) -> usize {
        self.stencil.extent.dim
    }

    pub fn rank(&self) -> usize {
        self.stencil.extent.rank
    }

    pub fn extent(&self) -> Extent {
        self.stencil.extent
    }

    pub fn sweep_mode(&self) -> SweepMode {
        self.sweep
    }

    /// Total sweeps applied over the engine's lifetime.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    pub fn state(&self) -> FieldState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interior_2d(dim: usize) -> impl Iterator<Item = (usize, usize)> {
        (1..dim - 1).flat_map(move |i| (1..dim - 1).map(move |j| (i, j)))
    }

    #[test]
    fn test_new_is_zero_and_unpinned() {
        let engine = RelaxationEngine::new(7, 3).unwrap();
        assert_eq!(engine.field().shape(), &[7, 7, 7]);
        assert!(engine.field().iter().all(|&v| v == 0.0));
        assert_eq!(engine.pinned_count(), 0);
        assert_eq!(engine.state(), FieldState::Configured);
        assert_eq!(engine.sweeps(), 0);
    }

    #[test]
    fn test_new_rejects_dim_2() {
        assert!(matches!(
            RelaxationEngine::new(2, 2),
            Err(LatticeError::InvalidDimension { dim: 2, rank: 2 })
        ));
    }

    #[test]
    fn test_two_point_scenario() {
        let mut engine = RelaxationEngine::new(5, 2).unwrap();
        engine
            .pin_region(&[1, 1], &[1, 1], 1.0)
            .unwrap()
            .pin_region(&[3, 3], &[3, 3], -1.0)
            .unwrap();
        engine.relax(50);

        assert_eq!(engine.value(&[1, 1]), Some(1.0));
        assert_eq!(engine.value(&[3, 3]), Some(-1.0));
        for (i, j) in interior_2d(5) {
            if (i, j) == (1, 1) || (i, j) == (3, 3) {
                continue;
            }
            let v = engine.value(&[i, j]).unwrap();
            assert!(v > -1.0 && v < 1.0, "V[{i},{j}] = {v} escaped (-1, 1)");
        }
        // Antisymmetric plates: the anti-diagonal is the zero-potential line.
        assert!(engine.value(&[2, 2]).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_first_jacobi_sweep_uses_snapshot() {
        // A single pinned 1.0 at (2, 2) on a 5x5 grid. After one Jacobi sweep
        // only the direct neighbours change (to 1/4). An in-place sweep would
        // also have leaked into (3, 3) through (2, 3) or (3, 2).
        let mut engine = RelaxationEngine::new(5, 2).unwrap();
        engine.pin_region(&[2, 2], &[2, 2], 1.0).unwrap();
        engine.relax(1);

        for (i, j) in interior_2d(5) {
            let v = engine.value(&[i, j]).unwrap();
            let expected = match (i, j) {
                (2, 2) => 1.0,
                (1, 2) | (3, 2) | (2, 1) | (2, 3) => 0.25,
                _ => 0.0,
            };
            assert!((v - expected).abs() < 1e-15, "V[{i},{j}] = {v}, expected {expected}");
        }
    }

    #[test]
    fn test_boundary_faces_untouched() {
        let mut engine = RelaxationEngine::new(6, 2).unwrap();
        engine.pin_region(&[2, 2], &[3, 3], 5.0).unwrap();
        engine.relax(200);
        let field = engine.field();
        for k in 0..6 {
            assert_eq!(field[[0, k]], 0.0);
            assert_eq!(field[[5, k]], 0.0);
            assert_eq!(field[[k, 0]], 0.0);
            assert_eq!(field[[k, 5]], 0.0);
        }
    }

    #[test]
    fn test_pin_out_of_bounds_leaves_field_unchanged() {
        let mut engine = RelaxationEngine::new(5, 2).unwrap();
        engine.pin_region(&[1, 1], &[1, 3], 2.0).unwrap();
        let before = engine.field().to_owned();

        let err = engine.pin_region(&[3, 3], &[4, 5], 9.0);
        assert!(matches!(err, Err(LatticeError::OutOfBounds { dim: 5, .. })));
        let err = engine.pin_region(&[6, 6], &[8, 8], 9.0);
        assert!(matches!(err, Err(LatticeError::OutOfBounds { .. })));

        assert_eq!(engine.field(), before.view());
        assert_eq!(engine.pinned_count(), 3);
    }

    #[test]
    fn test_overlap_last_write_wins() {
        let mut engine = RelaxationEngine::new(6, 2).unwrap();
        engine.pin_region(&[1, 1], &[3, 3], 1.0).unwrap();
        engine.pin_region(&[3, 3], &[4, 4], -2.0).unwrap();
        assert_eq!(engine.value(&[3, 3]), Some(-2.0));
        assert_eq!(engine.value(&[2, 2]), Some(1.0));
        assert_eq!(engine.pinned_count(), 9 + 4 - 1);
    }

    #[test]
    fn test_relax_zero_marks_relaxed() {
        let mut engine = RelaxationEngine::new(4, 2).unwrap();
        engine.relax(0);
        assert_eq!(engine.state(), FieldState::Relaxed);
        assert_eq!(engine.sweeps(), 0);
    }

    #[test]
    fn test_relax_chains_and_counts() {
        let mut engine = RelaxationEngine::new(5, 3).unwrap();
        engine.pin_region(&[1, 1, 1], &[1, 3, 3], 1.0).unwrap();
        engine.relax(3).relax(4);
        assert_eq!(engine.sweeps(), 7);
    }

    #[test]
    fn test_parallel_matches_serial_bitwise() {
        let mut serial = RelaxationEngine::new(9, 3).unwrap();
        serial.pin_region(&[2, 1, 1], &[2, 7, 7], 1.0).unwrap();
        serial.pin_region(&[6, 1, 1], &[6, 7, 7], -1.0).unwrap();
        let mut parallel = serial.clone().with_parallel(true);

        serial.relax(25);
        parallel.relax(25);
        assert_eq!(serial.field(), parallel.field());
    }

    #[test]
    fn test_sor_keeps_pins_and_converges() {
        let mut jacobi = RelaxationEngine::new(17, 2).unwrap();
        jacobi.pin_region(&[4, 4], &[4, 12], 1.0).unwrap();
        jacobi.pin_region(&[12, 4], &[12, 12], -1.0).unwrap();
        let mut sor = jacobi
            .clone()
            .with_sweep(SweepMode::Sor { omega: 1.7 })
            .unwrap();

        jacobi.relax(100);
        sor.relax(100);

        assert_eq!(sor.value(&[4, 8]), Some(1.0));
        assert_eq!(sor.value(&[12, 8]), Some(-1.0));
        assert!(
            sor.residual() < jacobi.residual(),
            "SOR residual {} should beat Jacobi {}",
            sor.residual(),
            jacobi.residual()
        );
    }

    #[test]
    fn test_with_sweep_rejects_bad_omega() {
        let engine = RelaxationEngine::new(5, 2).unwrap();
        assert!(matches!(
            engine.with_sweep(SweepMode::Sor { omega: 2.5 }),
            Err(LatticeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_residual_decreases() {
        let mut engine = RelaxationEngine::new(12, 2).unwrap();
        engine.pin_region(&[1, 1], &[1, 10], 1.0).unwrap();
        let res0 = engine.residual();
        engine.relax(200);
        let res1 = engine.residual();
        assert!(res1 < res0, "Residual should decrease: {res0} -> {res1}");
    }

    #[test]
    fn test_gradient_requires_relax() {
        let engine = RelaxationEngine::new(5, 2).unwrap();
        assert!(matches!(
            engine.gradient(1.0),
            Err(LatticeError::InvalidState(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config: RelaxConfig = serde_json::from_str(
            r#"{
                "dim": 9, "rank": 2, "iterations": 10,
                "sweep": { "sor": { "omega": 1.5 } },
                "regions": [
                    { "low": [2, 2], "high": [2, 6], "value": 1.0 },
                    { "low": [6, 2], "high": [6, 6], "value": -1.0 }
                ]
            }"#,
        )
        .unwrap();
        let engine = RelaxationEngine::from_config(&config).unwrap();
        assert_eq!(engine.pinned_count(), 10);
        assert_eq!(engine.sweep_mode(), SweepMode::Sor { omega: 1.5 });
        assert_eq!(engine.value(&[6, 4]), Some(-1.0));
        assert_eq!(engine.state(), FieldState::Configured);
    }
}
