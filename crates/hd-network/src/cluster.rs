//! Greedy density seed/absorb clustering.
//!
//! # Algorithm
//!
//! ```text
//! density[i] = |{ j unassigned : dist(i, j) ≤ radius }|   (includes i)
//! while some point is unassigned:
//!     seed    = argmax density over unassigned points (ties → lowest index)
//!     members = unassigned points within radius of seed (seed included)
//!     mark members assigned; decrement density of each member's neighbours
//! ```
//!
//! Neighbour lists are computed once through an R-tree (bounding-box query,
//! then an exact haversine test), so each round only touches the absorbed
//! points' neighbourhoods plus one linear argmax scan.
//!
//! Callers pass points in canonical order; the index of a point is its
//! tie-breaking rank.

use rstar::{AABB, RTree, RTreeObject};

use hd_core::GeoPoint;

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the position of the point in the caller's slice.
#[derive(Clone)]
struct PointEntry {
    point: [f64; 2], // [lat, lon]
    idx:   usize,
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ── Cluster ───────────────────────────────────────────────────────────────────

/// One cluster produced by [`greedy_cluster`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    /// Index of the seed point.
    pub seed:    usize,
    /// Indices of all absorbed points, ascending, seed included.
    pub members: Vec<usize>,
}

/// For every point, the ascending indices of all points within `radius_km`
/// (the point itself included).
pub fn neighbor_lists(points: &[GeoPoint], radius_km: f64) -> Vec<Vec<usize>> {
    let entries: Vec<PointEntry> = points
        .iter()
        .enumerate()
        .map(|(idx, p)| PointEntry { point: [p.lat, p.lon], idx })
        .collect();
    let tree = RTree::bulk_load(entries);

    points
        .iter()
        .map(|&p| {
            let (half_lat, half_lon) = p.bbox_deg(radius_km);
            let envelope = AABB::from_corners(
                [p.lat - half_lat, p.lon - half_lon],
                [p.lat + half_lat, p.lon + half_lon],
            );
            let mut near: Vec<usize> = tree
                .locate_in_envelope(&envelope)
                .filter(|e| p.distance_km(points[e.idx]) <= radius_km)
                .map(|e| e.idx)
                .collect();
            near.sort_unstable();
            near
        })
        .collect()
}

/// Partition `points` into clusters by greedy density seeding.
///
/// Every point ends up in exactly one cluster.  A cluster may be a
/// singleton.  Clusters are returned in formation order.
pub fn greedy_cluster(points: &[GeoPoint], radius_km: f64) -> Vec<Cluster> {
    let n = points.len();
    let neighbors = neighbor_lists(points, radius_km);
    let mut density: Vec<usize> = neighbors.iter().map(Vec::len).collect();
    let mut assigned = vec![false; n];
    let mut remaining = n;
    let mut clusters = Vec::new();

    while remaining > 0 {
        // Strict `>` keeps the lowest index on ties.
        let mut seed = usize::MAX;
        for i in 0..n {
            if !assigned[i] && (seed == usize::MAX || density[i] > density[seed]) {
                seed = i;
            }
        }

        let members: Vec<usize> = neighbors[seed]
            .iter()
            .copied()
            .filter(|&j| !assigned[j])
            .collect();

        for &m in &members {
            assigned[m] = true;
            for &k in &neighbors[m] {
                density[k] = density[k].saturating_sub(1);
            }
        }
        remaining -= members.len();
        clusters.push(Cluster { seed, members });
    }

    clusters
}

/// Index of the centroid nearest to `p`; ties go to the lower index.
///
/// Returns `None` only when `centroids` is empty.
pub fn nearest_centroid(p: GeoPoint, centroids: &[GeoPoint]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &c) in centroids.iter().enumerate() {
        let d = p.distance_km(c);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}
