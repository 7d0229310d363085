//! State keys and the action space.
//!
//! A state is the hub an order sits at plus a coarse destination region.
//! Outside the destination's superspot the region is that superspot; once
//! the order is inside it (at the superspot itself or one of its hotspots)
//! the region narrows to the destination hotspot.  Tables therefore stay
//! bounded by `hubs × (superspots + sibling hotspots)`.

use serde::{Deserialize, Serialize};

use hd_core::NodeId;
use hd_graph::RoutingGraph;

/// Destination region of an order, as seen from a hub.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "level", content = "node", rename_all = "lowercase")]
pub enum Region {
    Superspot(NodeId),
    Hotspot(NodeId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub hub: NodeId,
    pub dest: Region,
}

impl StateKey {
    /// State of an order bound for location node `dest` while at `hub`.
    ///
    /// `None` if `dest` is not a location with a complete region or `hub`
    /// belongs to no superspot.
    pub fn for_order(graph: &RoutingGraph, hub: NodeId, dest: NodeId) -> Option<StateKey> {
        let (dest_hotspot, dest_superspot) = graph.region_of(dest)?;
        let hub_superspot = graph.superspot_of_hub(hub)?;
        let region = if hub_superspot == dest_superspot {
            Region::Hotspot(dest_hotspot)
        } else {
            Region::Superspot(dest_superspot)
        };
        Some(StateKey { hub, dest: region })
    }
}

/// A routing decision at a hub.
///
/// The derived order puts `DeliverDirect` first, then moves by ascending
/// target; greedy ties resolve to the first action in this order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Drive the last mile from the hub to the destination (terminal).
    DeliverDirect,
    /// Move the order to a neighbouring hub.
    MoveTo(NodeId),
}

/// Actions open to an order for `dest` at `hub`, in [`Action`] order.
///
/// `DeliverDirect` is offered only at the destination's own hotspot; moves
/// go to every hub neighbour of `hub`.
pub fn available_actions(graph: &RoutingGraph, hub: NodeId, dest: NodeId) -> Vec<Action> {
    let mut out = Vec::with_capacity(graph.out_degree(hub) + 1);
    if graph.region_of(dest).is_some_and(|(h, _)| h == hub) {
        out.push(Action::DeliverDirect);
    }
    out.extend(graph.hub_neighbors(hub).map(Action::MoveTo));
    out
}
