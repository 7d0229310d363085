//! `hd-graph` — the routing graph shared by training and simulation.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`config`]   | `GraphConfig` (average speed, circuity)                   |
//! | [`graph`]    | `RoutingGraph` (CSR), `RoutingGraphBuilder`, `NodeKind`   |
//! | [`assemble`] | `RoutingGraph::from_hierarchy`                            |
//! | [`shortest`] | `shortest_hub_path` (Dijkstra over hub edges)             |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                            |
//!
//! The graph is immutable once built.  Every per-step query (neighbours,
//! edge weight, location → node) is O(1) or O(log deg).
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `GraphConfig`/`NodeKind`. |

pub mod assemble;
pub mod config;
pub mod error;
pub mod graph;
pub mod shortest;


pub use config::GraphConfig;
pub use error::{GraphError, GraphResult};
pub use graph::{NodeKind, RoutingGraph, RoutingGraphBuilder};
pub use shortest::{HubPath, shortest_hub_path};
