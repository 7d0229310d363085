//! Routing graph representation and builder.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** form.  The
//! edges leaving node `n` occupy EdgeIds
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! and are sorted by target node within that range, so
//! [`RoutingGraph::edge_between`] is a binary search over the out-degree.
//!
//! Nodes carry a [`NodeKind`] and a parent pointer: locations point to their
//! hotspot, hotspots to their superspot, superspots to nothing.

use rustc_hash::FxHashMap;

use hd_core::{EdgeId, GeoPoint, HotspotId, LocationId, NodeId, Role, SuperspotId, travel_secs};

use crate::GraphConfig;

// ── NodeKind ──────────────────────────────────────────────────────────────────

/// What a routing-graph node stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Location { id: LocationId, role: Role },
    Hotspot(HotspotId),
    Superspot(SuperspotId),
}

impl NodeKind {
    #[inline]
    pub fn is_hub(self) -> bool {
        !matches!(self, NodeKind::Location { .. })
    }
}

// ── RoutingGraph ──────────────────────────────────────────────────────────────

/// Directed hub-and-leaf graph in CSR format.
///
/// All per-node and per-edge arrays are `pub` for indexed access on hot
/// paths.  Build through [`RoutingGraphBuilder`] or
/// [`RoutingGraph::from_hierarchy`](crate::assemble).
#[derive(Clone, Debug)]
pub struct RoutingGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    pub node_kind: Vec<NodeKind>,
    pub node_pos: Vec<GeoPoint>,
    /// Parent hub, or `NodeId::INVALID` for superspots and orphans.
    pub node_parent: Vec<NodeId>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    pub edge_length_km: Vec<f64>,
    pub edge_travel_secs: Vec<u64>,

    // ── Lookup tables ─────────────────────────────────────────────────────
    location_nodes: FxHashMap<LocationId, NodeId>,
    hotspot_nodes: Vec<NodeId>,
    superspot_nodes: Vec<NodeId>,

    config: GraphConfig,
}

impl RoutingGraph {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_kind.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_kind.is_empty()
    }

    pub fn hotspot_count(&self) -> usize {
        self.hotspot_nodes.len()
    }

    pub fn superspot_count(&self) -> usize {
        self.superspot_nodes.len()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    // ── Node queries ──────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    #[inline]
    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.node_kind[node.index()]
    }

    #[inline]
    pub fn pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    #[inline]
    pub fn is_hub(&self, node: NodeId) -> bool {
        self.kind(node).is_hub()
    }

    #[inline]
    pub fn is_hotspot(&self, node: NodeId) -> bool {
        matches!(self.kind(node), NodeKind::Hotspot(_))
    }

    #[inline]
    pub fn is_superspot(&self, node: NodeId) -> bool {
        matches!(self.kind(node), NodeKind::Superspot(_))
    }

    #[inline]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        let p = self.node_parent[node.index()];
        (p != NodeId::INVALID).then_some(p)
    }

    /// Node standing for an ingested location.
    #[inline]
    pub fn node_of_location(&self, id: LocationId) -> Option<NodeId> {
        self.location_nodes.get(&id).copied()
    }

    #[inline]
    pub fn hotspot_node(&self, id: HotspotId) -> Option<NodeId> {
        self.hotspot_nodes.get(id.index()).copied()
    }

    #[inline]
    pub fn superspot_node(&self, id: SuperspotId) -> Option<NodeId> {
        self.superspot_nodes.get(id.index()).copied()
    }

    pub fn hotspot_nodes(&self) -> &[NodeId] {
        &self.hotspot_nodes
    }

    pub fn superspot_nodes(&self) -> &[NodeId] {
        &self.superspot_nodes
    }

    /// All hub nodes, hotspots first, each group in id order.
    pub fn hub_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.hotspot_nodes.iter().chain(self.superspot_nodes.iter()).copied()
    }

    /// Location nodes with the given role, ascending by `NodeId`.
    pub fn location_nodes_with_role(&self, role: Role) -> Vec<NodeId> {
        self.node_kind
            .iter()
            .enumerate()
            .filter(|(_, k)| matches!(k, NodeKind::Location { role: r, .. } if *r == role))
            .map(|(i, _)| NodeId::from_index(i))
            .collect()
    }

    /// `(hotspot, superspot)` nodes enclosing a location node.
    ///
    /// `None` if `node` is not a location or its parent chain is incomplete.
    pub fn region_of(&self, node: NodeId) -> Option<(NodeId, NodeId)> {
        if !self.contains(node) || self.is_hub(node) {
            return None;
        }
        let hotspot = self.parent(node)?;
        let superspot = self.parent(hotspot)?;
        Some((hotspot, superspot))
    }

    /// The superspot a hub belongs to (itself for a superspot).
    pub fn superspot_of_hub(&self, hub: NodeId) -> Option<NodeId> {
        match self.kind(hub) {
            NodeKind::Superspot(_) => Some(hub),
            NodeKind::Hotspot(_) => self.parent(hub),
            NodeKind::Location { .. } => None,
        }
    }

    // ── Edge traversal ────────────────────────────────────────────────────

    /// Outgoing edges of `node`; a contiguous index range.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId::from_index(i))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Targets of `node`'s outgoing edges, ascending.
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        &self.edge_to[start..end]
    }

    /// Hub targets of `node`'s outgoing edges, ascending.
    pub fn hub_neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.neighbors(node).iter().copied().filter(move |&n| self.is_hub(n))
    }

    /// The directed edge `from → to`, if present.  O(log out_degree).
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.contains(from) {
            return None;
        }
        let start = self.node_out_start[from.index()] as usize;
        self.neighbors(from)
            .binary_search(&to)
            .ok()
            .map(|i| EdgeId::from_index(start + i))
    }

    #[inline]
    pub fn length_km(&self, edge: EdgeId) -> f64 {
        self.edge_length_km[edge.index()]
    }

    #[inline]
    pub fn travel_secs(&self, edge: EdgeId) -> u64 {
        self.edge_travel_secs[edge.index()]
    }

    // ── Off-graph distances ───────────────────────────────────────────────

    /// Road distance between two nodes ignoring the edge set (great-circle
    /// times circuity).  Used for last-mile legs and tour estimates.
    pub fn direct_km(&self, a: NodeId, b: NodeId) -> f64 {
        self.pos(a).distance_km(self.pos(b)) * self.config.circuity_factor
    }

    /// Travel time for `km` road kilometres at the configured speed.
    pub fn secs_for_km(&self, km: f64) -> u64 {
        travel_secs(km, self.config.avg_speed_kmh)
    }
}

// ── RoutingGraphBuilder ───────────────────────────────────────────────────────

/// Build a [`RoutingGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes receive sequential `NodeId`s in insertion order.  Hotspots and
/// superspots also receive sequential `HotspotId`/`SuperspotId`s.  Edges may
/// be added in any order; duplicates of the same `(from, to)` pair keep the
/// first one added.
///
/// # Example
///
/// ```
/// use hd_core::{GeoPoint, LocationId, Role};
/// use hd_graph::{GraphConfig, RoutingGraphBuilder};
///
/// let mut b = RoutingGraphBuilder::new(GraphConfig::default());
/// let s = b.add_superspot(GeoPoint::new(42.00, -83.00));
/// let h = b.add_hotspot(GeoPoint::new(42.01, -83.00), s);
/// let l = b.add_location(LocationId(7), GeoPoint::new(42.011, -83.00), Role::Consumer, h);
/// b.add_link(l, h);
/// b.add_link(h, s);
/// let g = b.build();
/// assert_eq!(g.node_count(), 3);
/// assert_eq!(g.edge_count(), 4);
/// assert_eq!(g.region_of(l), Some((h, s)));
/// ```
pub struct RoutingGraphBuilder {
    config: GraphConfig,
    kinds: Vec<NodeKind>,
    positions: Vec<GeoPoint>,
    parents: Vec<NodeId>,
    raw_edges: Vec<RawEdge>,
    hotspots: Vec<NodeId>,
    superspots: Vec<NodeId>,
}

struct RawEdge {
    from: NodeId,
    to: NodeId,
    length_km: f64,
    travel_secs: u64,
}

impl RoutingGraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            kinds: Vec::new(),
            positions: Vec::new(),
            parents: Vec::new(),
            raw_edges: Vec::new(),
            hotspots: Vec::new(),
            superspots: Vec::new(),
        }
    }

    pub fn with_capacity(config: GraphConfig, nodes: usize, edges: usize) -> Self {
        Self {
            kinds: Vec::with_capacity(nodes),
            positions: Vec::with_capacity(nodes),
            parents: Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            ..Self::new(config)
        }
    }

    fn push_node(&mut self, kind: NodeKind, pos: GeoPoint, parent: NodeId) -> NodeId {
        let id = NodeId::from_index(self.kinds.len());
        self.kinds.push(kind);
        self.positions.push(pos);
        self.parents.push(parent);
        id
    }

    /// Add a location node under hotspot node `parent`.
    pub fn add_location(&mut self, id: LocationId, pos: GeoPoint, role: Role, parent: NodeId) -> NodeId {
        self.push_node(NodeKind::Location { id, role }, pos, parent)
    }

    /// Add a hotspot node under superspot node `parent`.
    pub fn add_hotspot(&mut self, pos: GeoPoint, parent: NodeId) -> NodeId {
        let hid = HotspotId::from_index(self.hotspots.len());
        let node = self.push_node(NodeKind::Hotspot(hid), pos, parent);
        self.hotspots.push(node);
        node
    }

    pub fn add_superspot(&mut self, pos: GeoPoint) -> NodeId {
        let sid = SuperspotId::from_index(self.superspots.len());
        let node = self.push_node(NodeKind::Superspot(sid), pos, NodeId::INVALID);
        self.superspots.push(node);
        node
    }

    /// Re-point a node's parent (for nodes added before their parent).
    pub fn set_parent(&mut self, node: NodeId, parent: NodeId) {
        self.parents[node.index()] = parent;
    }

    /// Add a directed edge with explicit costs.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_km: f64, travel_secs: u64) {
        self.raw_edges.push(RawEdge { from, to, length_km, travel_secs });
    }

    /// Add edges in both directions, costed from node positions.
    pub fn add_link(&mut self, a: NodeId, b: NodeId) {
        let km = self.positions[a.index()].distance_km(self.positions[b.index()])
            * self.config.circuity_factor;
        let secs = travel_secs(km, self.config.avg_speed_kmh);
        self.add_directed_edge(a, b, km, secs);
        self.add_directed_edge(b, a, km, secs);
    }

    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.positions[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.kinds.len()
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Consume the builder and produce a [`RoutingGraph`].  O(E log E).
    pub fn build(self) -> RoutingGraph {
        let node_count = self.kinds.len();

        // Stable sort keeps the first-added duplicate ahead of later ones.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| (e.from.0, e.to.0));
        raw.dedup_by_key(|e| (e.from.0, e.to.0));

        let edge_from: Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to: Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_km: Vec<f64> = raw.iter().map(|e| e.length_km).collect();
        let edge_travel_secs: Vec<u64> = raw.iter().map(|e| e.travel_secs).collect();

        // CSR row pointer: count then prefix-sum.
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        let location_nodes = self
            .kinds
            .iter()
            .enumerate()
            .filter_map(|(i, k)| match k {
                NodeKind::Location { id, .. } => Some((*id, NodeId::from_index(i))),
                _ => None,
            })
            .collect();

        RoutingGraph {
            node_kind: self.kinds,
            node_pos: self.positions,
            node_parent: self.parents,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_km,
            edge_travel_secs,
            location_nodes,
            hotspot_nodes: self.hotspots,
            superspot_nodes: self.superspots,
            config: self.config,
        }
    }
}
