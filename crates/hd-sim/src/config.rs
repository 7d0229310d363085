//! Simulation parameters.

use serde::{Deserialize, Serialize};

use crate::{SimError, SimResult};

/// How order creation times are spread over the arrival window.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalProcess {
    /// Independent uniform draws over the window.
    #[default]
    Uniform,
    /// Exponential inter-arrival gaps with mean `window / total_deliveries`,
    /// clamped to the window.
    Poisson,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Orders to generate.  Default: 100.
    pub total_deliveries: usize,
    /// Horizon in seconds; later events are never processed.  Default: one day.
    pub simulation_time_secs: u64,
    pub ride_sharing: bool,
    /// Maximum distance between any two destinations of one group.
    /// Default: 1.0 km.
    pub ride_share_threshold_km: f64,
    /// How long a group waits for more members after it opens.  Default: 300 s.
    pub ride_share_window_secs: u64,
    /// A group departs as soon as it has this many members.  Default: 4.
    pub max_group_size: usize,
    /// Hub decisions allowed per order before it fails.  Default: 16.
    pub max_hops: u32,
    pub arrival: ArrivalProcess,
    /// Orders are created within the first `fraction × horizon` seconds, so
    /// they have time left to finish.  Default: 0.5.
    pub arrival_window_fraction: f64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_deliveries: 100,
            simulation_time_secs: 86_400,
            ride_sharing: true,
            ride_share_threshold_km: 1.0,
            ride_share_window_secs: 300,
            max_group_size: 4,
            max_hops: 16,
            arrival: ArrivalProcess::Uniform,
            arrival_window_fraction: 0.5,
            seed: 42,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult<()> {
        let bad = |msg: String| Err(SimError::Config(msg));

        if self.simulation_time_secs == 0 {
            return bad("simulation_time_secs must be positive".into());
        }
        if !self.ride_share_threshold_km.is_finite() || self.ride_share_threshold_km < 0.0 {
            return bad(format!(
                "ride_share_threshold_km must be a non-negative number, got {}",
                self.ride_share_threshold_km
            ));
        }
        if self.max_group_size == 0 {
            return bad("max_group_size must be at least 1".into());
        }
        if self.max_hops == 0 {
            return bad("max_hops must be at least 1".into());
        }
        if !(self.arrival_window_fraction > 0.0 && self.arrival_window_fraction <= 1.0) {
            return bad(format!(
                "arrival_window_fraction must be in (0, 1], got {}",
                self.arrival_window_fraction
            ));
        }
        Ok(())
    }

    /// Last second at which an order may be created.
    pub fn arrival_window_secs(&self) -> u64 {
        (self.simulation_time_secs as f64 * self.arrival_window_fraction).floor() as u64
    }
}
