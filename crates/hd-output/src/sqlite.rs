//! SQLite output backend (feature `sqlite`).
//!
//! One `output.db` in the output directory with tables `orders` and
//! `metrics`.  Order rows carry the run label of the metrics row written
//! after them, so several runs can share a database.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{MetricsRow, OrderRow, OutputResult};

pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS orders (
                 run            TEXT,
                 order_id       INTEGER NOT NULL,
                 producer       INTEGER NOT NULL,
                 consumer       INTEGER NOT NULL,
                 created_secs   INTEGER NOT NULL,
                 status         TEXT    NOT NULL,
                 completed_secs INTEGER,
                 hops           INTEGER NOT NULL,
                 distance_km    REAL    NOT NULL,
                 shared         INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS metrics (
                 run                    TEXT    PRIMARY KEY,
                 final_tick             INTEGER NOT NULL,
                 total_deliveries       INTEGER NOT NULL,
                 delivered              INTEGER NOT NULL,
                 failed                 INTEGER NOT NULL,
                 success_rate           REAL    NOT NULL,
                 total_distance_km      REAL    NOT NULL,
                 avg_delivery_time_secs REAL    NOT NULL,
                 ride_share_groups      INTEGER NOT NULL,
                 shared_orders          INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_orders(&mut self, rows: &[OrderRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO orders \
                 (order_id, producer, consumer, created_secs, status, completed_secs, hops, distance_km, shared) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.order_id,
                    row.producer,
                    row.consumer,
                    row.created_secs as i64,
                    row.status.as_str(),
                    row.completed_secs.map(|s| s as i64),
                    row.hops,
                    row.distance_km,
                    row.shared as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        // Claim the orders written since the previous run summary.
        tx.execute("UPDATE orders SET run = ?1 WHERE run IS NULL", [&row.run])?;
        tx.execute(
            "INSERT INTO metrics \
             (run, final_tick, total_deliveries, delivered, failed, success_rate, \
              total_distance_km, avg_delivery_time_secs, ride_share_groups, shared_orders) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                row.run,
                row.final_tick as i64,
                row.total_deliveries as i64,
                row.delivered as i64,
                row.failed as i64,
                row.success_rate,
                row.total_distance_km,
                row.avg_delivery_time_secs,
                row.ride_share_groups as i64,
                row.shared_orders as i64,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
