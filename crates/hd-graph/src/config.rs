//! Edge-cost parameters.

use crate::{GraphError, GraphResult};

/// Converts geometry into travel costs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GraphConfig {
    /// Average vehicle speed used for every edge.  Default: 30 km/h.
    pub avg_speed_kmh: f64,

    /// Multiplier from great-circle to road distance.  Default: 1.0
    /// (pure great-circle).  Typical urban road networks sit near 1.3.
    pub circuity_factor: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { avg_speed_kmh: 30.0, circuity_factor: 1.0 }
    }
}

impl GraphConfig {
    pub fn validate(&self) -> GraphResult<()> {
        if !self.avg_speed_kmh.is_finite() || self.avg_speed_kmh <= 0.0 {
            return Err(GraphError::Config(format!(
                "avg_speed_kmh must be a positive number, got {}",
                self.avg_speed_kmh
            )));
        }
        if !self.circuity_factor.is_finite() || self.circuity_factor < 1.0 {
            return Err(GraphError::Config(format!(
                "circuity_factor must be at least 1.0, got {}",
                self.circuity_factor
            )));
        }
        Ok(())
    }
}
