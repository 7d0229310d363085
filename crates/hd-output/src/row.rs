//! Plain data rows written by the output backends.

use hd_core::Tick;
use hd_sim::{DeliveryOrder, OrderStatus, SimMetrics};

/// One order in its terminal state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderRow {
    pub order_id:       u32,
    pub producer:       u32,
    pub consumer:       u32,
    pub created_secs:   u64,
    pub status:         OrderStatus,
    /// `None` unless delivered.
    pub completed_secs: Option<u64>,
    pub hops:           u32,
    pub distance_km:    f64,
    pub shared:         bool,
}

impl From<&DeliveryOrder> for OrderRow {
    fn from(o: &DeliveryOrder) -> Self {
        Self {
            order_id:       o.id.0,
            producer:       o.producer.0,
            consumer:       o.consumer.0,
            created_secs:   o.created.0,
            status:         o.status,
            completed_secs: o.completed.map(|t| t.0),
            hops:           o.hops,
            distance_km:    o.distance_km,
            shared:         o.shared,
        }
    }
}

/// Summary of one run, labelled so several runs can share a file.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub run:                    String,
    pub final_tick:             u64,
    pub total_deliveries:       u64,
    pub delivered:              u64,
    pub failed:                 u64,
    pub success_rate:           f64,
    pub total_distance_km:      f64,
    pub avg_delivery_time_secs: f64,
    pub ride_share_groups:      u64,
    pub shared_orders:          u64,
}

impl MetricsRow {
    pub fn new(run: impl Into<String>, final_tick: Tick, m: &SimMetrics) -> Self {
        Self {
            run:                    run.into(),
            final_tick:             final_tick.0,
            total_deliveries:       m.total_deliveries as u64,
            delivered:              m.delivered as u64,
            failed:                 m.failed as u64,
            success_rate:           m.success_rate,
            total_distance_km:      m.total_distance_km,
            avg_delivery_time_secs: m.avg_delivery_time_secs,
            ride_share_groups:      m.ride_share_groups as u64,
            shared_orders:          m.shared_orders as u64,
        }
    }
}
