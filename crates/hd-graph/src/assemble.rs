//! Derive a [`RoutingGraph`] from a built [`Hierarchy`].
//!
//! Node order is fixed: every location (ascending id), then every hotspot
//! (ascending `HotspotId`), then every superspot.  Edges, all in both
//! directions:
//!
//! | Edge                         | Purpose                                   |
//! |------------------------------|-------------------------------------------|
//! | location ↔ its hotspot       | first and last mile                       |
//! | hotspot ↔ its superspot      | climb and descend the hierarchy           |
//! | hotspot ↔ sibling hotspot    | lateral moves inside one region           |
//! | superspot ↔ superspot        | long-haul moves between regions           |

use tracing::debug;

use hd_core::NodeId;
use hd_network::Hierarchy;

use crate::{GraphConfig, GraphError, GraphResult, RoutingGraph, RoutingGraphBuilder};

impl RoutingGraph {
    /// Build the routing graph for `hierarchy` with edge costs from `config`.
    ///
    /// Edge lengths are great-circle distance times
    /// [`circuity_factor`](GraphConfig::circuity_factor); travel times follow
    /// from [`avg_speed_kmh`](GraphConfig::avg_speed_kmh).
    pub fn from_hierarchy(hierarchy: &Hierarchy, config: &GraphConfig) -> GraphResult<Self> {
        config.validate()?;
        hierarchy
            .validate(1)
            .map_err(|e| GraphError::Hierarchy(e.to_string()))?;

        let n_loc = hierarchy.location_count();
        let n_hot = hierarchy.hotspot_count();
        let hotspot_node = |i: usize| NodeId::from_index(n_loc + i);
        let superspot_node = |i: usize| NodeId::from_index(n_loc + n_hot + i);

        let sibling_pairs: usize = hierarchy
            .superspots
            .iter()
            .map(|s| s.children.len() * s.children.len().saturating_sub(1))
            .sum();
        let ns = hierarchy.superspot_count();
        let edge_estimate = 2 * n_loc + 2 * n_hot + sibling_pairs + ns * ns.saturating_sub(1);
        let mut b = RoutingGraphBuilder::with_capacity(
            config.clone(),
            n_loc + n_hot + ns,
            edge_estimate,
        );

        for (i, loc) in hierarchy.locations.iter().enumerate() {
            let parent = hotspot_node(hierarchy.assignment[i].index());
            b.add_location(loc.id, loc.pos, loc.role, parent);
        }
        for h in &hierarchy.hotspots {
            b.add_hotspot(h.centroid, superspot_node(h.superspot.index()));
        }
        for s in &hierarchy.superspots {
            b.add_superspot(s.centroid);
        }

        for i in 0..n_loc {
            let loc = NodeId::from_index(i);
            b.add_link(loc, hotspot_node(hierarchy.assignment[i].index()));
        }
        for h in &hierarchy.hotspots {
            b.add_link(hotspot_node(h.id.index()), superspot_node(h.superspot.index()));
        }
        for s in &hierarchy.superspots {
            for (a, &ha) in s.children.iter().enumerate() {
                for &hb in &s.children[a + 1..] {
                    b.add_link(hotspot_node(ha.index()), hotspot_node(hb.index()));
                }
            }
        }
        for a in 0..ns {
            for c in a + 1..ns {
                b.add_link(superspot_node(a), superspot_node(c));
            }
        }

        let graph = b.build();
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "routing graph assembled"
        );
        Ok(graph)
    }
}
