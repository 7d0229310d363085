//! `hd-core` — foundational types for the hub-delivery workspace.
//!
//! This crate is a dependency of every other `hd-*` crate.  It intentionally
//! has no `hd-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `LocationId`, `HotspotId`, `SuperspotId`, `NodeId`, `EdgeId`, `OrderId` |
//! | [`geo`]         | `GeoPoint`, haversine distance, centroids, travel time    |
//! | [`location`]    | `Location`, `Role`                                        |
//! | [`time`]        | `Tick`, `SimClock`                                        |
//! | [`rng`]         | `AgentRng` (per-hub), `SimRng` (per-run)                  |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by the network and model artifacts.               |

pub mod error;
pub mod geo;
pub mod ids;
pub mod location;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, travel_secs};
pub use ids::{EdgeId, HotspotId, LocationId, NodeId, OrderId, SuperspotId};
pub use location::{Location, Role};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick};
