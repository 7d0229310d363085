//! The persisted model: every hub's Q-table as flat JSON entries.
//!
//! JSON object keys must be strings, so tables are stored as lists of
//! `(state, action, value)` entries rather than nested maps.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use hd_core::NodeId;

use crate::{Action, AgentError, AgentResult, AgentSet, QAgent, StateKey, TrainingConfig};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: StateKey,
    pub action: Action,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HubModel {
    pub hub: NodeId,
    pub entries: Vec<QEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Parameters the tables were trained with.
    pub training: TrainingConfig,
    /// One model per hub, ascending by hub.
    pub hubs: Vec<HubModel>,
}

impl ModelArtifact {
    pub fn from_agents(agents: &AgentSet, training: &TrainingConfig) -> Self {
        let hubs = agents
            .iter()
            .map(|agent| HubModel {
                hub: agent.hub,
                entries: agent
                    .table
                    .iter()
                    .map(|(state, action, value)| QEntry { state: *state, action, value })
                    .collect(),
            })
            .collect();
        Self { training: training.clone(), hubs }
    }

    /// Rebuild the agents, rejecting entries that belong to another hub,
    /// non-finite values and duplicate hubs.
    pub fn to_agents(&self) -> AgentResult<AgentSet> {
        let mut set = AgentSet::new();
        for model in &self.hubs {
            if set.get(model.hub).is_some() {
                return Err(AgentError::Artifact(format!("hub {} listed twice", model.hub)));
            }
            let mut agent = QAgent::new(model.hub);
            for e in &model.entries {
                if e.state.hub != model.hub {
                    return Err(AgentError::Artifact(format!(
                        "hub {} holds an entry for state at {}",
                        model.hub, e.state.hub
                    )));
                }
                if !e.value.is_finite() {
                    return Err(AgentError::Artifact(format!(
                        "hub {} holds a non-finite value",
                        model.hub
                    )));
                }
                agent.table.set(e.state, e.action, e.value);
            }
            set.insert(agent);
        }
        Ok(set)
    }

    pub fn save_json(&self, path: &Path) -> AgentResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> AgentResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
