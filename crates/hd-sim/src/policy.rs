//! Routing policies.
//!
//! One simulator serves every comparison variant; the policy is a value
//! handed to [`SimBuilder`](crate::SimBuilder):
//!
//! | Policy         | Hub decision                                          |
//! |----------------|-------------------------------------------------------|
//! | `Learned`      | greedy action of the hub's trained Q-agent            |
//! | `ShortestPath` | next hop on the fastest hub path to the destination's hotspot |
//! | `Direct`       | no hubs: producer → consumer in one leg               |
//!
//! Decisions depend only on `(hub, destination)`, never on time or other
//! orders, so ride-sharing on or off sends each order along the same path.

use std::collections::BTreeMap;
use std::sync::Arc;

use hd_agent::{Action, AgentSet};
use hd_core::NodeId;
use hd_graph::{RoutingGraph, shortest_hub_path};

#[derive(Clone, Debug)]
pub enum RoutingPolicy {
    Learned(Arc<AgentSet>),
    ShortestPath,
    Direct,
}

impl RoutingPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            RoutingPolicy::Learned(_) => "learned",
            RoutingPolicy::ShortestPath => "shortest_path",
            RoutingPolicy::Direct => "direct",
        }
    }

    pub fn uses_hubs(&self) -> bool {
        !matches!(self, RoutingPolicy::Direct)
    }

    /// Decision for an order bound for location `dest` waiting at `hub`.
    /// `None` means the hub offers no way forward.
    pub fn decide(
        &self,
        graph: &RoutingGraph,
        hub: NodeId,
        dest: NodeId,
        cache: &mut NextHopCache,
    ) -> Option<Action> {
        match self {
            RoutingPolicy::Learned(agents) => agents.decide(graph, hub, dest),
            RoutingPolicy::ShortestPath => {
                let (dest_hotspot, _) = graph.region_of(dest)?;
                if hub == dest_hotspot {
                    return Some(Action::DeliverDirect);
                }
                cache.next_hop(graph, hub, dest_hotspot).map(Action::MoveTo)
            }
            RoutingPolicy::Direct => Some(Action::DeliverDirect),
        }
    }
}

/// Memoised first hops of fastest hub paths, scoped to one run.
#[derive(Default)]
pub struct NextHopCache {
    hops: BTreeMap<(NodeId, NodeId), Option<NodeId>>,
}

impl NextHopCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_hop(&mut self, graph: &RoutingGraph, from: NodeId, to: NodeId) -> Option<NodeId> {
        *self.hops.entry((from, to)).or_insert_with(|| {
            shortest_hub_path(graph, from, to)
                .ok()
                .and_then(|p| p.next_hop(graph))
        })
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}
