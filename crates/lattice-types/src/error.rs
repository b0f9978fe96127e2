// ─────────────────────────────────────────────────────────────────────
// Lattice Relax — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LatticeError {
    #[error("Invalid grid dimension: dim={dim}, rank={rank} (need dim >= 3 and rank 2 or 3)")]
    InvalidDimension { dim: usize, rank: usize },

    #[error("Region out of bounds: low={low:?}, high={high:?}, dim={dim}")]
    OutOfBounds {
        low: Vec<usize>,
        high: Vec<usize>,
        dim: usize,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid step size: {0}")]
    InvalidStep(f64),

    #[error("Invalid probability: {0} (must lie in [0, 1])")]
    InvalidProbability(f64),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LatticeResult<T> = Result<T, LatticeError>;
