//! The two-level hub hierarchy: output of the Network Builder and the
//! persisted network artifact.
//!
//! All vectors are in canonical order: `locations` by ascending
//! `LocationId`, `hotspots` and `superspots` by their dense ids.  Location
//! lookups are binary searches over `locations`, so no secondary index has
//! to be persisted or rebuilt.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use hd_core::{GeoPoint, HotspotId, Location, LocationId, Role, SuperspotId};

use crate::{NetworkError, NetworkResult};

/// A first-level hub owning a set of locations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub id:        HotspotId,
    /// Mean position of `members`.
    pub centroid:  GeoPoint,
    /// Owned locations, ascending.
    pub members:   Vec<LocationId>,
    /// Owning superspot.
    pub superspot: SuperspotId,
}

/// A second-level hub owning a set of hotspots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Superspot {
    pub id:       SuperspotId,
    /// Mean of the children's centroids.
    pub centroid: GeoPoint,
    /// Owned hotspots, ascending.
    pub children: Vec<HotspotId>,
}

/// The constructed hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    /// Accepted locations, ascending by id.
    pub locations:       Vec<Location>,
    /// Owning hotspot of `locations[i]`.
    pub assignment:      Vec<HotspotId>,
    pub hotspots:        Vec<Hotspot>,
    pub superspots:      Vec<Superspot>,
    /// Input records rejected during construction (invalid or duplicate).
    pub skipped_records: usize,
}

impl Hierarchy {
    /// A hierarchy with no locations (the result of an empty input set).
    pub fn empty(skipped_records: usize) -> Self {
        Self { skipped_records, ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn hotspot_count(&self) -> usize {
        self.hotspots.len()
    }

    pub fn superspot_count(&self) -> usize {
        self.superspots.len()
    }

    /// Achieved hotspots-per-superspot ratio (0 for an empty hierarchy).
    pub fn ratio(&self) -> f64 {
        if self.superspots.is_empty() {
            0.0
        } else {
            self.hotspots.len() as f64 / self.superspots.len() as f64
        }
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// Position of `id` in `locations`.  O(log n).
    pub fn location_index(&self, id: LocationId) -> Option<usize> {
        self.locations.binary_search_by_key(&id, |l| l.id).ok()
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.location_index(id).map(|i| &self.locations[i])
    }

    /// Hotspot owning location `id`.
    pub fn hotspot_of(&self, id: LocationId) -> Option<HotspotId> {
        self.location_index(id).map(|i| self.assignment[i])
    }

    /// Superspot owning hotspot `id`.
    pub fn superspot_of(&self, id: HotspotId) -> Option<SuperspotId> {
        self.hotspots.get(id.index()).map(|h| h.superspot)
    }

    /// Iterator over all locations tagged with `role`.
    pub fn locations_with_role(&self, role: Role) -> impl Iterator<Item = &Location> + '_ {
        self.locations.iter().filter(move |l| l.role == role)
    }

    // ── Invariants ────────────────────────────────────────────────────────

    /// Check every structural invariant of the hierarchy.
    ///
    /// - locations strictly ascending, one assignment per location;
    /// - every location in exactly one hotspot, matching `assignment`;
    /// - every hotspot non-empty and in exactly one superspot;
    /// - every superspot owns at least `min_children` hotspots, unless it is
    ///   the only one.
    pub fn validate(&self, min_children: usize) -> NetworkResult<()> {
        let bad = |msg: String| Err(NetworkError::Invariant(msg));

        if self.assignment.len() != self.locations.len() {
            return bad(format!(
                "{} assignments for {} locations",
                self.assignment.len(),
                self.locations.len()
            ));
        }
        if self.locations.windows(2).any(|w| w[0].id >= w[1].id) {
            return bad("locations are not strictly ascending by id".into());
        }
        if !self.locations.is_empty() && self.superspots.is_empty() {
            return bad("non-empty hierarchy without superspots".into());
        }

        let mut seen_locations = vec![false; self.locations.len()];
        for (i, h) in self.hotspots.iter().enumerate() {
            if h.id.index() != i {
                return bad(format!("hotspot at position {i} has id {}", h.id));
            }
            if h.members.is_empty() {
                return bad(format!("{} has no members", h.id));
            }
            for &m in &h.members {
                let Some(li) = self.location_index(m) else {
                    return bad(format!("{} lists unknown location {m}", h.id));
                };
                if seen_locations[li] {
                    return bad(format!("{m} belongs to more than one hotspot"));
                }
                seen_locations[li] = true;
                if self.assignment[li] != h.id {
                    return bad(format!("{m} is listed by {} but assigned elsewhere", h.id));
                }
            }
        }
        if let Some(li) = seen_locations.iter().position(|s| !s) {
            return bad(format!("{} belongs to no hotspot", self.locations[li].id));
        }

        let mut seen_hotspots = vec![false; self.hotspots.len()];
        for (i, s) in self.superspots.iter().enumerate() {
            if s.id.index() != i {
                return bad(format!("superspot at position {i} has id {}", s.id));
            }
            if s.children.len() < min_children && self.superspots.len() > 1 {
                return bad(format!(
                    "{} has {} children, fewer than {min_children}",
                    s.id,
                    s.children.len()
                ));
            }
            for &c in &s.children {
                let Some(h) = self.hotspots.get(c.index()) else {
                    return bad(format!("{} lists unknown hotspot {c}", s.id));
                };
                if seen_hotspots[c.index()] {
                    return bad(format!("{c} belongs to more than one superspot"));
                }
                seen_hotspots[c.index()] = true;
                if h.superspot != s.id {
                    return bad(format!("{c} is listed by {} but points elsewhere", s.id));
                }
            }
        }
        if let Some(hi) = seen_hotspots.iter().position(|s| !s) {
            return bad(format!("HotspotId({hi}) belongs to no superspot"));
        }
        Ok(())
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Write the hierarchy as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> NetworkResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a hierarchy written by [`save_json`](Self::save_json).
    ///
    /// The structure is re-validated (with `min_children = 1`, since the
    /// construction parameters are not part of the artifact).
    pub fn load_json(path: &Path) -> NetworkResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let hierarchy: Hierarchy = serde_json::from_reader(reader)?;
        hierarchy.validate(1)?;
        Ok(hierarchy)
    }
}
