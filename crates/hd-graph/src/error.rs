//! Routing-graph error type.

use thiserror::Error;

use hd_core::NodeId;

/// Errors produced by `hd-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("graph configuration error: {0}")]
    Config(String),

    #[error("no hub route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    /// The hierarchy handed to the assembler is structurally inconsistent.
    #[error("inconsistent hierarchy: {0}")]
    Hierarchy(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
