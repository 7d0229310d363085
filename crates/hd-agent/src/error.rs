//! Agent and trainer error type.

use thiserror::Error;

use hd_core::NodeId;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("training configuration error: {0}")]
    Config(String),

    /// A Q-value became NaN or infinite.  The table is left at its last
    /// finite state, but the run is aborted so no corrupt model is saved.
    #[error("Q-value diverged at hub {hub} in episode {episode}")]
    Divergence { hub: NodeId, episode: usize },

    #[error("hub {0} is not a hub node of the routing graph")]
    UnknownHub(NodeId),

    #[error("invalid model artifact: {0}")]
    Artifact(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
