//! Synthetic city used when no location feed is configured.
//!
//! Districts sit on a ring around a centre point; each district holds a
//! tight cluster of producer and consumer sites.

use serde::{Deserialize, Serialize};

use hd_core::{Location, LocationId, Role, SimRng};

/// Kilometres per degree of latitude.
const KM_PER_DEG: f64 = 111.195;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub districts: usize,
    pub sites_per_district: usize,
    /// Distance from the centre to each district.
    pub ring_radius_km: f64,
    /// Maximum offset of a site from its district centre.
    pub district_radius_km: f64,
    /// Fraction of sites that are producers.
    pub producer_share: f64,
    pub seed: u64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            center_lat: 39.961,
            center_lon: -82.999,
            districts: 12,
            sites_per_district: 10,
            ring_radius_km: 12.0,
            district_radius_km: 0.6,
            producer_share: 0.3,
            seed: 7,
        }
    }
}

pub fn synthetic_city(cfg: &CityConfig) -> Vec<Location> {
    let mut rng = SimRng::new(cfg.seed);
    let km_per_deg_lon = KM_PER_DEG * cfg.center_lat.to_radians().cos();
    let mut out = Vec::with_capacity(cfg.districts * cfg.sites_per_district);

    for d in 0..cfg.districts {
        let angle = std::f64::consts::TAU * d as f64 / cfg.districts.max(1) as f64;
        let lat = cfg.center_lat + cfg.ring_radius_km * angle.sin() / KM_PER_DEG;
        let lon = cfg.center_lon + cfg.ring_radius_km * angle.cos() / km_per_deg_lon;

        for _ in 0..cfg.sites_per_district {
            let dy: f64 = rng.gen_range(-1.0_f64..=1.0) * cfg.district_radius_km;
            let dx: f64 = rng.gen_range(-1.0_f64..=1.0) * cfg.district_radius_km;
            let role = if rng.random::<f64>() < cfg.producer_share {
                Role::Producer
            } else {
                Role::Consumer
            };
            let id = LocationId(out.len() as u32);
            out.push(Location::new(id, lat + dy / KM_PER_DEG, lon + dx / km_per_deg_lon, role));
        }
    }
    out
}
