//! Crate-wide error taxonomy (spec §7).
//!
//! Every fallible operation in the pipeline returns `Result<T, SolGenError>`.
//! `SamplerGaveUp` is the one variant that is not fatal to the run: the driver
//! logs it as a warning and still emits whatever assignments were collected
//! with exit code 0, so C4 reports it via `sample::Outcome` rather than `?`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolGenError {
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("malformed aag: {0}")]
    BadFormat(String),

    #[error("unsupported aag: {0}")]
    Unsupported(String),

    #[error("bdd operation failed: {0}")]
    BddOpFailed(String),

    #[error("could not reach the requested sample count: {found}/{requested} found")]
    SamplerGaveUp { found: usize, requested: usize },

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SolGenError>;
