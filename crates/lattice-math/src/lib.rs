//! Grid relaxation primitives for Lattice Relax.

pub mod gradient;
pub mod relax;
pub mod stencil;

pub use gradient::{central_gradient, GradientSample};
pub use relax::RelaxationEngine;
