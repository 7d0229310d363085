//! Delivery orders and their lifecycle.

use serde::{Deserialize, Serialize};

use hd_core::{NodeId, OrderId, Tick};

/// `Pending → InTransit → {Delivered | Failed}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InTransit,
    Delivered,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Failed => "failed",
        }
    }
}

/// An order to inject into a run: producer and consumer location nodes plus
/// a creation time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub producer: NodeId,
    pub consumer: NodeId,
    pub created: Tick,
}

/// Run-scoped state of one order.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliveryOrder {
    pub id: OrderId,
    pub producer: NodeId,
    pub consumer: NodeId,
    pub created: Tick,
    /// Node the order is at, or heading to while a leg is under way.
    pub position: NodeId,
    pub status: OrderStatus,
    /// Hub decisions taken so far.
    pub hops: u32,
    /// This order's share of every leg it rode.
    pub distance_km: f64,
    pub completed: Option<Tick>,
    /// Rode at least one leg together with another order.
    pub shared: bool,
}

impl DeliveryOrder {
    pub fn new(id: OrderId, req: OrderRequest) -> Self {
        Self {
            id,
            producer: req.producer,
            consumer: req.consumer,
            created: req.created,
            position: req.producer,
            status: OrderStatus::Pending,
            hops: 0,
            distance_km: 0.0,
            completed: None,
            shared: false,
        }
    }

    /// Seconds from creation to delivery; `None` unless delivered.
    pub fn delivery_secs(&self) -> Option<u64> {
        match (self.status, self.completed) {
            (OrderStatus::Delivered, Some(t)) => Some(t.since(self.created)),
            _ => None,
        }
    }
}
