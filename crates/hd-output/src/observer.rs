//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use hd_core::Tick;
use hd_sim::{DeliveryOrder, SimMetrics, SimObserver};

use crate::row::{MetricsRow, OrderRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Order rows are handed to the writer in batches of this size.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// A [`SimObserver`] that writes every terminal order and the run summary to
/// any [`OutputWriter`] backend.
///
/// Nothing reaches the writer before `on_sim_end`, so a cancelled run leaves
/// no order rows behind.
///
/// `SimObserver` methods cannot fail, so writer errors are stored.  After
/// `sim.run()` returns, check with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    run:        String,
    pending:    Vec<OrderRow>,
    batch_size: usize,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// `run` labels the metrics row, e.g. the routing policy.
    pub fn new(writer: W, run: impl Into<String>) -> Self {
        Self {
            writer,
            run: run.into(),
            pending: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            last_error: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn flush_orders(&mut self) {
        let rows = std::mem::take(&mut self.pending);
        for batch in rows.chunks(self.batch_size) {
            let result = self.writer.write_orders(batch);
            self.store_err(result);
        }
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_order_terminal(&mut self, order: &DeliveryOrder) {
        self.pending.push(OrderRow::from(order));
    }

    fn on_sim_end(&mut self, final_tick: Tick, metrics: &SimMetrics) {
        self.flush_orders();
        let row = MetricsRow::new(self.run.clone(), final_tick, metrics);
        let result = self.writer.write_metrics(&row);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
