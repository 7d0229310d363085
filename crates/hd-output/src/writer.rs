//! The `OutputWriter` trait implemented by all backend writers.

use crate::{MetricsRow, OrderRow, OutputResult};

/// Implemented by the CSV, SQLite and Parquet writers.
///
/// Errors surface through [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error]
/// when a writer is driven by the observer.
pub trait OutputWriter {
    /// Append a batch of terminal orders.
    fn write_orders(&mut self, rows: &[OrderRow]) -> OutputResult<()>;

    /// Append one run summary.
    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()>;

    /// Flush and close the underlying files.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
