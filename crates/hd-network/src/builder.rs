//! `NetworkBuilder` — clusters raw locations into hotspots and superspots.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use hd_core::{GeoPoint, HotspotId, Location, SuperspotId};

use crate::cluster::{greedy_cluster, nearest_centroid};
use crate::{Hierarchy, Hotspot, NetworkConfig, NetworkResult, Superspot};

/// Builds a [`Hierarchy`] from a set of locations.
///
/// # Example
///
/// ```
/// use hd_core::{Location, LocationId, Role};
/// use hd_network::{NetworkBuilder, NetworkConfig};
///
/// let config = NetworkConfig { superspot_ratio: 1.0, ..NetworkConfig::default() };
/// let builder = NetworkBuilder::new(config).unwrap();
/// let net = builder.build(&[
///     Location::new(LocationId(0), 39.96, -83.00, Role::Producer),
///     Location::new(LocationId(1), 39.961, -83.001, Role::Consumer),
/// ]).unwrap();
/// assert_eq!(net.hotspot_count(), 1);
/// assert_eq!(net.superspot_count(), 1);
/// ```
pub struct NetworkBuilder {
    config: NetworkConfig,
}

/// Upper bound on assign/recompute rounds when forming hotspots.
const MAX_ASSIGN_ROUNDS: usize = 100;

/// A superspot under construction.
struct Draft {
    children: Vec<usize>,
    centroid: GeoPoint,
}

impl NetworkBuilder {
    /// Validate `config` and return a builder.  Invalid parameters are fatal
    /// here, before any clustering starts.
    pub fn new(config: NetworkConfig) -> NetworkResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Construct the hierarchy.
    ///
    /// Invalid or duplicate-id records are skipped and counted; an empty (or
    /// fully rejected) input yields an empty hierarchy rather than an error.
    pub fn build(&self, locations: &[Location]) -> NetworkResult<Hierarchy> {
        let (locations, skipped) = sanitize(locations);
        if skipped > 0 {
            warn!(skipped, "rejected malformed or duplicate location records");
        }
        if locations.is_empty() {
            info!(skipped, "no usable locations; returning an empty network");
            return Ok(Hierarchy::empty(skipped));
        }

        let points: Vec<GeoPoint> = locations.iter().map(|l| l.pos).collect();
        let (assignment, hotspot_members) = self.form_hotspots(&points);
        let hotspot_centroids: Vec<GeoPoint> = hotspot_members
            .iter()
            .map(|m| mean_of(m.iter().map(|&i| points[i])))
            .collect();

        let drafts = self.form_superspots(&hotspot_centroids);

        // ── Assemble ──────────────────────────────────────────────────────
        let mut hotspot_owner = vec![SuperspotId::INVALID; hotspot_members.len()];
        let superspots: Vec<Superspot> = drafts
            .into_iter()
            .enumerate()
            .map(|(s, d)| {
                let id = SuperspotId::from_index(s);
                for &h in &d.children {
                    hotspot_owner[h] = id;
                }
                Superspot {
                    id,
                    centroid: d.centroid,
                    children: d.children.iter().map(|&h| HotspotId::from_index(h)).collect(),
                }
            })
            .collect();

        let hotspots: Vec<Hotspot> = hotspot_members
            .iter()
            .enumerate()
            .map(|(h, members)| Hotspot {
                id:        HotspotId::from_index(h),
                centroid:  hotspot_centroids[h],
                members:   members.iter().map(|&i| locations[i].id).collect(),
                superspot: hotspot_owner[h],
            })
            .collect();

        let hierarchy = Hierarchy {
            locations,
            assignment: assignment.into_iter().map(|h| HotspotId::from_index(h)).collect(),
            hotspots,
            superspots,
            skipped_records: skipped,
        };

        self.check_ratio(&hierarchy);
        info!(
            locations = hierarchy.location_count(),
            hotspots = hierarchy.hotspot_count(),
            superspots = hierarchy.superspot_count(),
            skipped,
            "network built"
        );
        Ok(hierarchy)
    }

    /// Greedy hotspot formation followed by nearest-centroid assignment.
    ///
    /// Assignment and centroid recomputation alternate until no location
    /// changes hotspot, so every location ends up in the hotspot whose final
    /// centroid is nearest.  Returns the owning hotspot index per point and
    /// the member indices per hotspot (ascending).  Hotspots emptied along the
    /// way are dropped and the remaining ones renumbered in formation order.
    fn form_hotspots(&self, points: &[GeoPoint]) -> (Vec<usize>, Vec<Vec<usize>>) {
        let mut members: Vec<Vec<usize>> = greedy_cluster(points, self.config.spacing_threshold_km)
            .into_iter()
            .map(|c| c.members)
            .collect();

        let mut settled = false;
        for round in 1..=MAX_ASSIGN_ROUNDS {
            let centroids: Vec<GeoPoint> =
                members.iter().map(|m| mean_of(m.iter().map(|&i| points[i]))).collect();
            let mut next: Vec<Vec<usize>> = vec![Vec::new(); centroids.len()];
            for (i, &p) in points.iter().enumerate() {
                // `centroids` is non-empty whenever `points` is.
                let h = nearest_centroid(p, &centroids).unwrap_or(0);
                next[h].push(i);
            }

            let dropped = next.iter().filter(|m| m.is_empty()).count();
            if dropped > 0 {
                debug!(round, dropped, "hotspots emptied by nearest-centroid reassignment");
            }
            next.retain(|m| !m.is_empty());

            if next == members {
                debug!(round, hotspots = next.len(), "hotspot assignment settled");
                settled = true;
                break;
            }
            members = next;
        }
        if !settled {
            warn!(rounds = MAX_ASSIGN_ROUNDS, "hotspot assignment did not settle");
        }

        let mut assignment = vec![0usize; points.len()];
        for (h, m) in members.iter().enumerate() {
            for &i in m {
                assignment[i] = h;
            }
        }
        (assignment, members)
    }

    /// Greedy superspot formation over hotspot centroids, then merge every
    /// superspot with fewer than `min_children` hotspots into its nearest
    /// neighbour until none is undersized or one remains.
    fn form_superspots(&self, hotspot_centroids: &[GeoPoint]) -> Vec<Draft> {
        let radius = self.config.superspot_spacing();
        let mut drafts: Vec<Option<Draft>> = greedy_cluster(hotspot_centroids, radius)
            .into_iter()
            .map(|c| Draft {
                centroid: mean_of(c.members.iter().map(|&h| hotspot_centroids[h])),
                children: c.members,
            })
            .map(Some)
            .collect();
        debug!(radius_km = radius, drafts = drafts.len(), "superspot drafts formed");

        let min_children = self.config.min_children;
        loop {
            let alive: BTreeSet<usize> = drafts
                .iter()
                .enumerate()
                .filter_map(|(i, d)| d.as_ref().map(|_| i))
                .collect();
            if alive.len() <= 1 {
                break;
            }
            let Some(&small) = alive.iter().find(|&&i| {
                drafts[i].as_ref().is_some_and(|d| d.children.len() < min_children)
            }) else {
                break;
            };
            let Some(from) = drafts[small].take() else { break };

            // Nearest other superspot by centroid; strict `<` keeps the lower id.
            let mut target: Option<(usize, f64)> = None;
            for &j in alive.iter().filter(|&&j| j != small) {
                if let Some(d) = drafts[j].as_ref() {
                    let dist = from.centroid.distance_km(d.centroid);
                    if target.is_none_or(|(_, best)| dist < best) {
                        target = Some((j, dist));
                    }
                }
            }
            let Some((into, dist)) = target else { break };
            debug!(from = small, into, dist_km = dist, "merging undersized superspot");

            if let Some(d) = drafts[into].as_mut() {
                d.children.extend(from.children);
                d.children.sort_unstable();
                d.centroid = mean_of(d.children.iter().map(|&h| hotspot_centroids[h]));
            }
        }

        drafts.into_iter().flatten().collect()
    }

    fn check_ratio(&self, hierarchy: &Hierarchy) {
        let target = self.config.superspot_ratio;
        let actual = hierarchy.ratio();
        let deviation = (actual - target).abs() / target;
        if deviation > self.config.ratio_tolerance {
            warn!(
                target,
                actual,
                hotspots = hierarchy.hotspot_count(),
                superspots = hierarchy.superspot_count(),
                "achieved hotspot-per-superspot ratio deviates from target"
            );
        }
    }
}

/// Canonical ordering (ascending id) with invalid and duplicate-id records
/// removed.  Returns the accepted locations and the number rejected.
fn sanitize(input: &[Location]) -> (Vec<Location>, usize) {
    let mut valid: Vec<Location> = input.iter().filter(|l| l.is_valid()).copied().collect();
    let mut skipped = input.len() - valid.len();

    // Stable sort: the first occurrence of a duplicated id wins.
    valid.sort_by_key(|l| l.id);
    let before = valid.len();
    valid.dedup_by_key(|l| l.id);
    skipped += before - valid.len();

    (valid, skipped)
}

fn mean_of<I: IntoIterator<Item = GeoPoint>>(points: I) -> GeoPoint {
    GeoPoint::centroid(points).unwrap_or(GeoPoint::new(0.0, 0.0))
}
