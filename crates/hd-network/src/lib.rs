//! `hd-network` — hotspot/superspot hierarchy construction.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`config`]    | `NetworkConfig` (ratio, min children, spacing)             |
//! | [`cluster`]   | Greedy density seed/absorb clustering over an R-tree       |
//! | [`builder`]   | `NetworkBuilder` — locations → `Hierarchy`                  |
//! | [`hierarchy`] | `Hierarchy`, `Hotspot`, `Superspot` (persisted artifact)   |
//! | [`loader`]    | `load_locations_csv` — the external location feed          |
//! | [`error`]     | `NetworkError`, `NetworkResult<T>`                         |
//!
//! # Pipeline
//!
//! ```text
//! locations ──sanitize──▶ canonical order (ascending LocationId)
//!           ──greedy(d_min)──▶ hotspot drafts ──nearest centroid──▶ hotspots
//!           ──greedy(d_top)──▶ superspot drafts ──merge undersized──▶ superspots
//! ```
//!
//! Construction is single-threaded and deterministic: identical input and
//! parameters always produce an identical [`Hierarchy`].

pub mod builder;
pub mod cluster;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod loader;


pub use builder::NetworkBuilder;
pub use config::NetworkConfig;
pub use error::{NetworkError, NetworkResult};
pub use hierarchy::{Hierarchy, Hotspot, Superspot};
pub use loader::{LoadReport, load_locations_csv, load_locations_reader};
