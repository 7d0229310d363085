//! Geographic coordinate type and distance/time utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Clustering compares many
//! distances against a fixed threshold, so the extra precision keeps
//! threshold decisions stable across platforms.

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6_371.008_8;

/// Kilometres spanned by one degree of latitude.
const KM_PER_DEG_LAT: f64 = 111.32;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` if both coordinates are finite and inside the WGS-84 ranges.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Haversine great-circle distance in metres.
    #[inline]
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        self.distance_km(other) * 1_000.0
    }

    /// Approximate bounding-box check, much cheaper than `distance_km` for
    /// quick rejection before an exact radius test.
    #[inline]
    pub fn within_bbox(self, center: GeoPoint, half_lat: f64, half_lon: f64) -> bool {
        (self.lat - center.lat).abs() <= half_lat
            && (self.lon - center.lon).abs() <= half_lon
    }

    /// Half-extents `(lat_deg, lon_deg)` of a box around `self` that contains
    /// every point within `radius_km`.
    ///
    /// The longitude extent grows with latitude; near the poles it saturates
    /// at the full 180°.
    pub fn bbox_deg(self, radius_km: f64) -> (f64, f64) {
        let half_lat = radius_km / KM_PER_DEG_LAT;
        let cos_lat = self.lat.to_radians().cos().abs();
        let half_lon = if cos_lat < 1e-9 {
            180.0
        } else {
            (radius_km / (KM_PER_DEG_LAT * cos_lat)).min(180.0)
        };
        // Pad by 1 % so rounding never excludes a point sitting on the radius.
        (half_lat * 1.01, half_lon * 1.01)
    }

    /// Arithmetic mean of a set of points.  `None` for an empty iterator.
    ///
    /// City-scale clusters never straddle the antimeridian, so a plain mean
    /// of degrees is adequate.
    pub fn centroid<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<GeoPoint> {
        let mut n = 0usize;
        let (mut lat, mut lon) = (0.0, 0.0);
        for p in points {
            lat += p.lat;
            lon += p.lon;
            n += 1;
        }
        (n > 0).then(|| GeoPoint::new(lat / n as f64, lon / n as f64))
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Travel time in whole seconds for `distance_km` at `speed_kmh`.
///
/// Rounds up so a vehicle never arrives before the exact travel time.
/// Non-positive speeds yield `u64::MAX` (unreachable).
pub fn travel_secs(distance_km: f64, speed_kmh: f64) -> u64 {
    if speed_kmh <= 0.0 || !speed_kmh.is_finite() {
        return u64::MAX;
    }
    (distance_km.max(0.0) / speed_kmh * 3_600.0).ceil() as u64
}
