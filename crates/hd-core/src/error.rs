//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::Tick;

/// The base error type shared by the `hd-*` crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid parameter combination, detected before any work starts.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("clock cannot move backwards from {now} to {requested}")]
    ClockRewind { now: Tick, requested: Tick },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `hd-core`.
pub type CoreResult<T> = Result<T, CoreError>;
