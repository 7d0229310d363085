//! Parquet output backend (feature `parquet`).
//!
//! Creates `orders.parquet` and `metrics.parquet` in the output directory.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{BooleanBuilder, Float64Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::create_file;
use crate::writer::OutputWriter;
use crate::{MetricsRow, OrderRow, OutputResult};

fn order_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("order_id",       DataType::UInt32,  false),
        Field::new("producer",       DataType::UInt32,  false),
        Field::new("consumer",       DataType::UInt32,  false),
        Field::new("created_secs",   DataType::UInt64,  false),
        Field::new("status",         DataType::Utf8,    false),
        Field::new("completed_secs", DataType::UInt64,  true),
        Field::new("hops",           DataType::UInt32,  false),
        Field::new("distance_km",    DataType::Float64, false),
        Field::new("shared",         DataType::Boolean, false),
    ]))
}

fn metrics_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("run",                    DataType::Utf8,    false),
        Field::new("final_tick",             DataType::UInt64,  false),
        Field::new("total_deliveries",       DataType::UInt64,  false),
        Field::new("delivered",              DataType::UInt64,  false),
        Field::new("failed",                 DataType::UInt64,  false),
        Field::new("success_rate",           DataType::Float64, false),
        Field::new("total_distance_km",      DataType::Float64, false),
        Field::new("avg_delivery_time_secs", DataType::Float64, false),
        Field::new("ride_share_groups",      DataType::UInt64,  false),
        Field::new("shared_orders",          DataType::UInt64,  false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes orders and run summaries to two Parquet files.
///
/// `finish()` **must** be called to write the file footers.
pub struct ParquetWriter {
    orders:         Option<ArrowWriter<File>>,
    metrics:        Option<ArrowWriter<File>>,
    order_schema:   Arc<Schema>,
    metrics_schema: Arc<Schema>,
}

impl ParquetWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let order_schema = order_schema();
        let metrics_schema = metrics_schema();

        let orders = ArrowWriter::try_new(
            create_file(&dir.join("orders.parquet"))?,
            Arc::clone(&order_schema),
            Some(snappy_props()),
        )?;
        let metrics = ArrowWriter::try_new(
            create_file(&dir.join("metrics.parquet"))?,
            Arc::clone(&metrics_schema),
            Some(snappy_props()),
        )?;

        Ok(Self {
            orders: Some(orders),
            metrics: Some(metrics),
            order_schema,
            metrics_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_orders(&mut self, rows: &[OrderRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.orders.as_mut() else {
            return Ok(());
        };

        let mut ids       = UInt32Builder::new();
        let mut producers = UInt32Builder::new();
        let mut consumers = UInt32Builder::new();
        let mut created   = UInt64Builder::new();
        let mut statuses  = StringBuilder::new();
        let mut completed = UInt64Builder::new();
        let mut hops      = UInt32Builder::new();
        let mut distances = Float64Builder::new();
        let mut shared    = BooleanBuilder::new();

        for row in rows {
            ids.append_value(row.order_id);
            producers.append_value(row.producer);
            consumers.append_value(row.consumer);
            created.append_value(row.created_secs);
            statuses.append_value(row.status.as_str());
            completed.append_option(row.completed_secs);
            hops.append_value(row.hops);
            distances.append_value(row.distance_km);
            shared.append_value(row.shared);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.order_schema),
            vec![
                Arc::new(ids.finish()),
                Arc::new(producers.finish()),
                Arc::new(consumers.finish()),
                Arc::new(created.finish()),
                Arc::new(statuses.finish()),
                Arc::new(completed.finish()),
                Arc::new(hops.finish()),
                Arc::new(distances.finish()),
                Arc::new(shared.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
        let Some(writer) = self.metrics.as_mut() else {
            return Ok(());
        };

        let mut run = StringBuilder::new();
        run.append_value(&row.run);
        let u64_col = |v: u64| {
            let mut b = UInt64Builder::new();
            b.append_value(v);
            b.finish()
        };
        let f64_col = |v: f64| {
            let mut b = Float64Builder::new();
            b.append_value(v);
            b.finish()
        };

        let batch = RecordBatch::try_new(
            Arc::clone(&self.metrics_schema),
            vec![
                Arc::new(run.finish()),
                Arc::new(u64_col(row.final_tick)),
                Arc::new(u64_col(row.total_deliveries)),
                Arc::new(u64_col(row.delivered)),
                Arc::new(u64_col(row.failed)),
                Arc::new(f64_col(row.success_rate)),
                Arc::new(f64_col(row.total_distance_km)),
                Arc::new(f64_col(row.avg_delivery_time_secs)),
                Arc::new(u64_col(row.ride_share_groups)),
                Arc::new(u64_col(row.shared_orders)),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.orders.take() {
            w.close()?;
        }
        if let Some(w) = self.metrics.take() {
            w.close()?;
        }
        Ok(())
    }
}
