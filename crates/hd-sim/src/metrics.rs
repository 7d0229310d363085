//! Aggregate result of one run.

use serde::{Deserialize, Serialize};

use crate::{DeliveryOrder, OrderStatus};

/// Flat key-value result record, summed over terminal orders.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimMetrics {
    pub total_deliveries: usize,
    pub delivered: usize,
    pub failed: usize,
    /// `delivered / total_deliveries`; 0 for an empty run.
    pub success_rate: f64,
    /// Every leg driven, shared legs counted once.
    pub total_distance_km: f64,
    /// Mean creation-to-delivery time over delivered orders.
    pub avg_delivery_time_secs: f64,
    /// Groups that departed a hub with two or more members.
    pub ride_share_groups: usize,
    pub shared_orders: usize,
}

impl SimMetrics {
    pub fn from_orders(
        orders: &[DeliveryOrder],
        total_distance_km: f64,
        ride_share_groups: usize,
    ) -> Self {
        let total = orders.len();
        let delivered = orders.iter().filter(|o| o.status == OrderStatus::Delivered).count();
        let failed = orders.iter().filter(|o| o.status == OrderStatus::Failed).count();
        let delivery_secs: u64 = orders.iter().filter_map(DeliveryOrder::delivery_secs).sum();

        Self {
            total_deliveries: total,
            delivered,
            failed,
            success_rate: if total == 0 { 0.0 } else { delivered as f64 / total as f64 },
            total_distance_km,
            avg_delivery_time_secs: if delivered == 0 {
                0.0
            } else {
                delivery_secs as f64 / delivered as f64
            },
            ride_share_groups,
            shared_orders: orders.iter().filter(|o| o.shared).count(),
        }
    }
}
