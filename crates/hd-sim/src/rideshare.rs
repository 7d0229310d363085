//! Ride-share groups: orders waiting at one hub to share the next leg.
//!
//! An order may join an open group at its hub when
//!
//! - the group takes the same action (same next hub, or both deliver),
//! - the order's destination lies within `ride_share_threshold_km` of every
//!   member's destination,
//! - the group is still open (its window has not closed) and not full.
//!
//! A group departs when its window closes or it reaches `max_group_size`.
//! An order only waits as long as it can afford: a group's window is cut
//! short so that every member can still be delivered by the horizon, and an
//! order that cannot afford to wait leaves alone.

use hd_agent::Action;
use hd_core::{NodeId, OrderId, Tick};
use hd_graph::RoutingGraph;

use crate::GroupId;

#[derive(Clone, Debug, PartialEq)]
pub struct RideShareGroup {
    pub id: GroupId,
    pub hub: NodeId,
    pub action: Action,
    pub opened: Tick,
    pub closes: Tick,
    /// `(order, destination)` in join order.
    pub members: Vec<(OrderId, NodeId)>,
    pub open: bool,
}

impl RideShareGroup {
    pub fn new(id: GroupId, hub: NodeId, action: Action, opened: Tick, window_secs: u64) -> Self {
        Self {
            id,
            hub,
            action,
            opened,
            closes: opened.offset(window_secs),
            members: Vec::new(),
            open: true,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether an order for `dest` taking `action` may join.
    pub fn accepts(
        &self,
        graph: &RoutingGraph,
        action: Action,
        dest: NodeId,
        threshold_km: f64,
        max_size: usize,
    ) -> bool {
        self.open
            && self.action == action
            && self.members.len() < max_size
            && self
                .members
                .iter()
                .all(|&(_, d)| graph.direct_km(d, dest) <= threshold_km)
    }
}

/// Nearest-neighbour tour from `start` through every destination.
///
/// Returns the total length and, per stop in visiting order, the member's
/// index together with the cumulative travel seconds to reach it.  Ties go to
/// the earlier member.
pub fn delivery_tour(
    graph: &RoutingGraph,
    start: NodeId,
    dests: &[NodeId],
) -> (f64, Vec<(usize, u64)>) {
    let mut remaining: Vec<usize> = (0..dests.len()).collect();
    let mut stops = Vec::with_capacity(dests.len());
    let mut at = start;
    let (mut km, mut secs) = (0.0, 0u64);

    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_km = f64::INFINITY;
        for (slot, &i) in remaining.iter().enumerate() {
            let d = graph.direct_km(at, dests[i]);
            if d < best_km {
                best = slot;
                best_km = d;
            }
        }
        let i = remaining.remove(best);
        km += best_km;
        secs = secs.saturating_add(graph.secs_for_km(best_km));
        stops.push((i, secs));
        at = dests[i];
    }
    (km, stops)
}
