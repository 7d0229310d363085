//! Dijkstra over hub-to-hub edges.
//!
//! Used for the shortest-path routing baseline and for diagnostics.  Location
//! nodes are never relayed through; a path starts and ends at a hub.
//!
//! Costs are travel seconds (`u64`).  Heap entries carry the `NodeId` as a
//! secondary key so ties resolve identically on every run.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hd_core::{EdgeId, NodeId};

use crate::{GraphError, GraphResult, RoutingGraph};

/// A hub-only path.
#[derive(Debug, Clone, PartialEq)]
pub struct HubPath {
    /// Edges in travel order.
    pub edges: Vec<EdgeId>,
    pub total_secs: u64,
    pub total_km: f64,
}

impl HubPath {
    /// `true` if source and destination coincide.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// The first hub to move to, or `None` for a trivial path.
    pub fn next_hop(&self, graph: &RoutingGraph) -> Option<NodeId> {
        self.edges.first().map(|e| graph.edge_to[e.index()])
    }

    /// Every node on the path, source first.
    pub fn nodes(&self, graph: &RoutingGraph, from: NodeId) -> Vec<NodeId> {
        std::iter::once(from)
            .chain(self.edges.iter().map(|e| graph.edge_to[e.index()]))
            .collect()
    }
}

/// Fastest hub-only path from `from` to `to`.
///
/// Fails with [`GraphError::NodeNotFound`] for an out-of-range node and
/// [`GraphError::NoRoute`] when either end is a location or the hubs are
/// disconnected.
pub fn shortest_hub_path(graph: &RoutingGraph, from: NodeId, to: NodeId) -> GraphResult<HubPath> {
    for n in [from, to] {
        if !graph.contains(n) {
            return Err(GraphError::NodeNotFound(n));
        }
    }
    if !graph.is_hub(from) || !graph.is_hub(to) {
        return Err(GraphError::NoRoute { from, to });
    }
    if from == to {
        return Ok(HubPath { edges: vec![], total_secs: 0, total_km: 0.0 });
    }

    let n = graph.node_count();
    let mut dist = vec![u64::MAX; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    dist[from.index()] = 0;

    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, to, cost));
        }
        if cost > dist[node.index()] {
            continue;
        }
        for edge in graph.out_edges(node) {
            let next = graph.edge_to[edge.index()];
            if !graph.is_hub(next) {
                continue;
            }
            let new_cost = cost.saturating_add(graph.travel_secs(edge));
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                prev_edge[next.index()] = edge;
                heap.push(Reverse((new_cost, next)));
            }
        }
    }

    Err(GraphError::NoRoute { from, to })
}

fn reconstruct(graph: &RoutingGraph, prev_edge: &[EdgeId], to: NodeId, total_secs: u64) -> HubPath {
    let mut edges = Vec::new();
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();
    let total_km = edges.iter().map(|&e| graph.length_km(e)).sum();
    HubPath { edges, total_secs, total_km }
}
