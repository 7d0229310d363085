//! Simulation observer trait for progress reporting and data collection.

use hd_core::Tick;

use crate::{DeliveryOrder, Event, SimMetrics};

/// Callbacks invoked by [`Simulator::run`][crate::Simulator::run].
///
/// All methods default to no-ops so implementors only override what they
/// need.
///
/// # Example: failure counter
///
/// ```rust,ignore
/// struct Failures(usize);
///
/// impl SimObserver for Failures {
///     fn on_order_terminal(&mut self, order: &DeliveryOrder) {
///         if order.status == OrderStatus::Failed {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called for every processed event, before it is handled.
    fn on_event(&mut self, _event: &Event) {}

    /// Called once per order when it is delivered or fails.
    fn on_order_terminal(&mut self, _order: &DeliveryOrder) {}

    /// Called once after the run completes (not after a cancelled run).
    fn on_sim_end(&mut self, _final_tick: Tick, _metrics: &SimMetrics) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
