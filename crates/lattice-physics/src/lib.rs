//! Lattice companions for Lattice Relax.
//!
//! Capacitor boundary presets for the relaxation engine and site
//! percolation with cluster detection.

pub mod capacitor;
pub mod percolation;
