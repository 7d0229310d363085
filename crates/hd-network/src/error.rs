//! Network-construction error type.

use thiserror::Error;

use hd_core::CoreError;

/// Errors produced by `hd-network`.
///
/// Malformed input records are *not* errors: they are skipped and counted.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network configuration error: {0}")]
    Config(String),

    /// A hierarchy (usually a loaded artifact) violates a structural invariant.
    #[error("hierarchy invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
