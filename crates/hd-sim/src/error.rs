use thiserror::Error;

use hd_core::CoreError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("order request {index} is invalid: {reason}")]
    InvalidOrder { index: usize, reason: String },

    /// The run was aborted through its `CancelToken`; no metrics exist.
    #[error("simulation cancelled")]
    Cancelled,

    #[error("clock error: {0}")]
    Clock(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
