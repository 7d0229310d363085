//! Ingested location entities.
//!
//! Locations come from an external geographic/census extractor and are
//! immutable once ingested.

use crate::{GeoPoint, LocationId};

/// What a location represents in the delivery network.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    /// Origin of orders (restaurant, store, warehouse).
    Producer,
    /// Destination of orders.
    Consumer,
    /// Census-tract anchor point; shapes the hierarchy but never orders.
    Anchor,
}

impl Role {
    /// Human-readable label, matching the CSV feed values.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Producer => "producer",
            Role::Consumer => "consumer",
            Role::Anchor   => "anchor",
        }
    }

    /// Parse a feed label (case-insensitive).  `None` for unknown labels.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "producer" => Some(Role::Producer),
            "consumer" => Some(Role::Consumer),
            "anchor"   => Some(Role::Anchor),
            _          => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geographic point with a role tag.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub id:   LocationId,
    pub pos:  GeoPoint,
    pub role: Role,
}

impl Location {
    #[inline]
    pub fn new(id: LocationId, lat: f64, lon: f64, role: Role) -> Self {
        Self { id, pos: GeoPoint::new(lat, lon), role }
    }

    /// `true` if the id is not the sentinel and the coordinates are usable.
    pub fn is_valid(&self) -> bool {
        self.id != LocationId::INVALID && self.pos.is_valid()
    }
}
