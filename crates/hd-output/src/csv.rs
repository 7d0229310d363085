//! CSV output backend.
//!
//! Creates `orders.csv` and `metrics.csv` in the output directory.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::error::create_file;
use crate::writer::OutputWriter;
use crate::{MetricsRow, OrderRow, OutputResult};

pub const ORDER_HEADERS: [&str; 9] = [
    "order_id",
    "producer",
    "consumer",
    "created_secs",
    "status",
    "completed_secs",
    "hops",
    "distance_km",
    "shared",
];

pub const METRICS_HEADERS: [&str; 10] = [
    "run",
    "final_tick",
    "total_deliveries",
    "delivered",
    "failed",
    "success_rate",
    "total_distance_km",
    "avg_delivery_time_secs",
    "ride_share_groups",
    "shared_orders",
];

/// Writes orders and run summaries to two CSV files.  One writer may serve
/// several runs; `finish` only flushes.
pub struct CsvWriter {
    orders:  Writer<File>,
    metrics: Writer<File>,
}

impl CsvWriter {
    /// Create both files in `dir` and write their header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut orders = Writer::from_writer(create_file(&dir.join("orders.csv"))?);
        orders.write_record(ORDER_HEADERS)?;

        let mut metrics = Writer::from_writer(create_file(&dir.join("metrics.csv"))?);
        metrics.write_record(METRICS_HEADERS)?;

        Ok(Self { orders, metrics })
    }
}

impl OutputWriter for CsvWriter {
    fn write_orders(&mut self, rows: &[OrderRow]) -> OutputResult<()> {
        for row in rows {
            self.orders.write_record(&[
                row.order_id.to_string(),
                row.producer.to_string(),
                row.consumer.to_string(),
                row.created_secs.to_string(),
                row.status.as_str().to_string(),
                row.completed_secs.map(|s| s.to_string()).unwrap_or_default(),
                row.hops.to_string(),
                row.distance_km.to_string(),
                (row.shared as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
        self.metrics.write_record(&[
            row.run.clone(),
            row.final_tick.to_string(),
            row.total_deliveries.to_string(),
            row.delivered.to_string(),
            row.failed.to_string(),
            row.success_rate.to_string(),
            row.total_distance_km.to_string(),
            row.avg_delivery_time_secs.to_string(),
            row.ride_share_groups.to_string(),
            row.shared_orders.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.orders.flush()?;
        self.metrics.flush()?;
        Ok(())
    }
}
