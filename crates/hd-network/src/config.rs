//! Network-construction parameters.

use serde::{Deserialize, Serialize};

use crate::{NetworkError, NetworkResult};

/// Parameters for [`NetworkBuilder`](crate::NetworkBuilder).
///
/// Typically deserialized from the `network` section of a pipeline config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Target number of hotspots per superspot (`R`).  Default: 10.
    ///
    /// Treated as a target: the achieved ratio is checked after construction
    /// and a deviation only produces a warning.
    pub superspot_ratio: f64,

    /// Minimum hotspots per superspot.  Default: 2.
    pub min_children: usize,

    /// Hotspot clustering radius `d_min` in kilometres.  Default: 2.0.
    pub spacing_threshold_km: f64,

    /// Superspot clustering radius in kilometres.  `None` derives it from
    /// `spacing_threshold_km * sqrt(superspot_ratio)`.
    pub superspot_spacing_km: Option<f64>,

    /// Relative ratio deviation tolerated before warning.  Default: 0.5.
    pub ratio_tolerance: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            superspot_ratio:      10.0,
            min_children:         2,
            spacing_threshold_km: 2.0,
            superspot_spacing_km: None,
            ratio_tolerance:      0.5,
        }
    }
}

impl NetworkConfig {
    /// Reject parameter combinations that cannot produce a valid hierarchy.
    pub fn validate(&self) -> NetworkResult<()> {
        if !self.superspot_ratio.is_finite() || self.superspot_ratio <= 0.0 {
            return Err(NetworkError::Config(format!(
                "superspot_ratio must be a positive number, got {}",
                self.superspot_ratio
            )));
        }
        if self.min_children == 0 {
            return Err(NetworkError::Config("min_children must be at least 1".into()));
        }
        if !self.spacing_threshold_km.is_finite() || self.spacing_threshold_km <= 0.0 {
            return Err(NetworkError::Config(format!(
                "spacing_threshold_km must be a positive number, got {}",
                self.spacing_threshold_km
            )));
        }
        if let Some(d) = self.superspot_spacing_km {
            if !d.is_finite() || d <= 0.0 {
                return Err(NetworkError::Config(format!(
                    "superspot_spacing_km must be a positive number, got {d}"
                )));
            }
        }
        if !self.ratio_tolerance.is_finite() || self.ratio_tolerance < 0.0 {
            return Err(NetworkError::Config(format!(
                "ratio_tolerance must be non-negative, got {}",
                self.ratio_tolerance
            )));
        }
        Ok(())
    }

    /// Radius used to group hotspot centroids into superspots.
    ///
    /// Hotspot seeds are at least `d_min` apart, so grouping `R` of them needs
    /// a disc whose area is roughly `R` times larger.
    pub fn superspot_spacing(&self) -> f64 {
        self.superspot_spacing_km
            .unwrap_or(self.spacing_threshold_km * self.superspot_ratio.sqrt())
    }
}
