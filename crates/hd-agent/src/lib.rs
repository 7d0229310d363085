//! `hd-agent` — one tabular Q-learning agent per hub, and the trainer that
//! fits them.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`state`]    | `Region`, `StateKey`, `Action`, `available_actions`        |
//! | [`table`]    | `QTable`                                                   |
//! | [`agent`]    | `QAgent` (softmax / greedy selection, TD update), `AgentSet` |
//! | [`demand`]   | `DemandModel` trait, `UniformConsumers`, `WeightedConsumers` |
//! | [`config`]   | `TrainingConfig`, `TemperatureSchedule`                    |
//! | [`trainer`]  | `Trainer`, `TrainingOutcome`                               |
//! | [`stats`]    | `TrainingStats` (per-episode returns)                      |
//! | [`artifact`] | `ModelArtifact` (persisted model, JSON)                    |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                             |
//!
//! # Training model
//!
//! Training proceeds in synchronisation rounds.  Within a round every hub
//! trains its own episodes against a frozen snapshot of all other hubs'
//! tables; at the end of the round the fresh tables become the next
//! snapshot.  No hub ever writes another hub's table, so hubs train
//! independently (on Rayon's pool with the `parallel` feature) while each
//! hub's own episodes stay strictly sequential.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                  |
//! |------------|-----------------------------------------|
//! | `parallel` | Trains hubs concurrently with Rayon.    |

pub mod agent;
pub mod artifact;
pub mod config;
pub mod demand;
pub mod error;
pub mod state;
pub mod stats;
pub mod table;
pub mod trainer;

#[cfg(test)]
mod tests;

pub use agent::{AgentSet, QAgent};
pub use artifact::{HubModel, ModelArtifact, QEntry};
pub use config::{TemperatureSchedule, TrainingConfig};
pub use demand::{DemandModel, UniformConsumers, WeightedConsumers};
pub use error::{AgentError, AgentResult};
pub use state::{Action, Region, StateKey, available_actions};
pub use stats::TrainingStats;
pub use table::QTable;
pub use trainer::{Trainer, TrainingOutcome};
