//! Destination models sampled by training episodes.

use hd_core::{AgentRng, NodeId, Role};
use hd_graph::RoutingGraph;

use crate::{AgentError, AgentResult};

/// Source of training destinations (consumer location nodes).
///
/// Shared by all hubs during training, so implementations must be
/// `Send + Sync`; all randomness comes from the caller's RNG.
pub trait DemandModel: Send + Sync {
    /// Draw one destination; `None` if the model has no destinations.
    fn sample(&self, rng: &mut AgentRng) -> Option<NodeId>;
}

/// Every destination equally likely.
#[derive(Clone, Debug)]
pub struct UniformConsumers {
    nodes: Vec<NodeId>,
}

impl UniformConsumers {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    /// All consumer locations of `graph`.
    pub fn from_graph(graph: &RoutingGraph) -> Self {
        Self::new(graph.location_nodes_with_role(Role::Consumer))
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl DemandModel for UniformConsumers {
    fn sample(&self, rng: &mut AgentRng) -> Option<NodeId> {
        rng.choose(&self.nodes).copied()
    }
}

/// Destinations drawn in proportion to a weight, e.g. historical order counts.
#[derive(Clone, Debug)]
pub struct WeightedConsumers {
    nodes: Vec<NodeId>,
    cumulative: Vec<f64>,
}

impl WeightedConsumers {
    /// Weights must be finite and non-negative with a positive sum.
    pub fn new(weighted: Vec<(NodeId, f64)>) -> AgentResult<Self> {
        let mut nodes = Vec::with_capacity(weighted.len());
        let mut cumulative = Vec::with_capacity(weighted.len());
        let mut acc = 0.0;
        for (node, w) in weighted {
            if !w.is_finite() || w < 0.0 {
                return Err(AgentError::Config(format!("demand weight for {node} is {w}")));
            }
            acc += w;
            nodes.push(node);
            cumulative.push(acc);
        }
        if acc <= 0.0 {
            return Err(AgentError::Config("demand weights sum to zero".into()));
        }
        Ok(Self { nodes, cumulative })
    }
}

impl DemandModel for WeightedConsumers {
    fn sample(&self, rng: &mut AgentRng) -> Option<NodeId> {
        let total = *self.cumulative.last()?;
        let r = rng.random::<f64>() * total;
        let i = self.cumulative.partition_point(|&c| c <= r);
        self.nodes.get(i.min(self.nodes.len() - 1)).copied()
    }
}
