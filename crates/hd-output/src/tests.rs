//! Tests for hd-output.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use hd_core::{Location, LocationId, Role};
    use hd_graph::{GraphConfig, RoutingGraph};
    use hd_network::{NetworkBuilder, NetworkConfig};
    use hd_sim::OrderStatus;

    use crate::{MetricsRow, OrderRow};

    pub fn tmp() -> tempfile::TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    pub fn delivered(order_id: u32) -> OrderRow {
        OrderRow {
            order_id,
            producer:       0,
            consumer:       5,
            created_secs:   100,
            status:         OrderStatus::Delivered,
            completed_secs: Some(820),
            hops:           2,
            distance_km:    5.25,
            shared:         true,
        }
    }

    pub fn failed(order_id: u32) -> OrderRow {
        OrderRow {
            status:         OrderStatus::Failed,
            completed_secs: None,
            shared:         false,
            ..delivered(order_id)
        }
    }

    pub fn metrics(run: &str) -> MetricsRow {
        MetricsRow {
            run:                    run.into(),
            final_tick:             9_000,
            total_deliveries:       2,
            delivered:              1,
            failed:                 1,
            success_rate:           0.5,
            total_distance_km:      10.5,
            avg_delivery_time_secs: 720.0,
            ride_share_groups:      1,
            shared_orders:          1,
        }
    }

    /// Two groups of four locations ~5 km apart: 2 hotspots, 1 superspot.
    pub fn small_graph() -> Arc<RoutingGraph> {
        let offsets = [(0.000, 0.000), (0.002, 0.000), (0.000, 0.002), (0.002, 0.002)];
        let mut locs = Vec::new();
        for (g, lat) in [39.960, 40.005].into_iter().enumerate() {
            for (k, (dlat, dlon)) in offsets.iter().enumerate() {
                let id = (g * 4 + k) as u32;
                let role = if k % 2 == 0 { Role::Producer } else { Role::Consumer };
                locs.push(Location::new(LocationId(id), lat + dlat, -83.0 + dlon, role));
            }
        }
        let cfg = NetworkConfig { superspot_ratio: 1.0, ..NetworkConfig::default() };
        let h = NetworkBuilder::new(cfg).unwrap().build(&locs).unwrap();
        Arc::new(RoutingGraph::from_hierarchy(&h, &GraphConfig::default()).unwrap())
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use crate::csv::{CsvWriter, METRICS_HEADERS, ORDER_HEADERS};
    use crate::writer::OutputWriter;

    use super::helpers::{delivered, failed, metrics, tmp};

    fn headers(path: &std::path::Path) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert_eq!(headers(&dir.path().join("orders.csv")), ORDER_HEADERS);
        assert_eq!(headers(&dir.path().join("metrics.csv")), METRICS_HEADERS);
    }

    #[test]
    fn order_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_orders(&[delivered(0), failed(1)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("orders.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][4], "delivered");
        assert_eq!(&rows[0][5], "820");
        assert_eq!(&rows[0][8], "1");
        assert_eq!(&rows[1][4], "failed");
        assert_eq!(&rows[1][5], ""); // never completed
        assert_eq!(&rows[1][8], "0");
    }

    #[test]
    fn metrics_rows_accumulate_across_runs() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_metrics(&metrics("learned")).unwrap();
        w.finish().unwrap();
        w.write_metrics(&metrics("direct")).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("metrics.csv")).unwrap();
        let runs: Vec<String> = rdr.records().map(|r| r.unwrap()[0].to_owned()).collect();
        assert_eq!(runs, ["learned", "direct"]);
    }

    #[test]
    fn empty_batch_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_orders(&[]).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        let err = CsvWriter::new(&dir.path().join("nope")).err().expect("missing dir");
        assert!(matches!(err, crate::OutputError::Create { .. }));
        assert!(err.to_string().contains("orders.csv"), "{err}");
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use hd_sim::{CancelToken, NoopObserver, RoutingPolicy, SimBuilder, SimConfig, SimObserver};

    use crate::{CsvWriter, MetricsRow, OrderRow, OutputResult, OutputWriter, SimOutputObserver};

    use super::helpers::{delivered, small_graph, tmp};

    /// Counts calls; fails every order write after the first.
    #[derive(Default)]
    struct Flaky {
        order_batches: usize,
        metrics:       Vec<MetricsRow>,
        finished:      usize,
    }

    impl OutputWriter for Flaky {
        fn write_orders(&mut self, _rows: &[OrderRow]) -> OutputResult<()> {
            self.order_batches += 1;
            if self.order_batches > 1 {
                return Err(std::io::Error::other(format!("batch {}", self.order_batches)).into());
            }
            Ok(())
        }
        fn write_metrics(&mut self, row: &MetricsRow) -> OutputResult<()> {
            self.metrics.push(row.clone());
            Ok(())
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn full_run_to_csv() {
        let graph = small_graph();
        let cfg = SimConfig { total_deliveries: 12, seed: 5, ..SimConfig::default() };
        let sim = SimBuilder::new(cfg, graph).policy(RoutingPolicy::ShortestPath).build().unwrap();
        let expected = sim.run(&mut NoopObserver).unwrap();

        let dir = tmp();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap(), "shortest_path");
        let metrics = sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(metrics, expected);

        let mut rdr = csv::Reader::from_path(dir.path().join("orders.csv")).unwrap();
        assert_eq!(rdr.records().count(), 12);

        let mut rdr = csv::Reader::from_path(dir.path().join("metrics.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "shortest_path");
        assert_eq!(&rows[0][2], "12");
    }

    #[test]
    fn first_error_is_kept() {
        let mut obs = SimOutputObserver::new(Flaky::default(), "run").with_batch_size(1);
        let order = hd_sim::DeliveryOrder::new(
            hd_core::OrderId(0),
            hd_sim::OrderRequest {
                producer: hd_core::NodeId(0),
                consumer: hd_core::NodeId(1),
                created:  hd_core::Tick(0),
            },
        );
        for _ in 0..3 {
            obs.on_order_terminal(&order);
        }
        obs.on_sim_end(hd_core::Tick(10), &hd_sim::SimMetrics::default());

        let err = obs.take_error().expect("write error stored");
        assert!(err.to_string().contains("batch 2"), "{err}");
        assert!(obs.take_error().is_none());

        let writer = obs.into_writer();
        assert_eq!(writer.order_batches, 3);
        assert_eq!(writer.metrics.len(), 1);
        assert_eq!(writer.finished, 1);
    }

    /// Cancels the run once `after` orders have finished.
    struct CancelAfter<W: OutputWriter> {
        inner: SimOutputObserver<W>,
        token: CancelToken,
        after: usize,
    }

    impl<W: OutputWriter> SimObserver for CancelAfter<W> {
        fn on_order_terminal(&mut self, order: &hd_sim::DeliveryOrder) {
            self.inner.on_order_terminal(order);
            self.after = self.after.saturating_sub(1);
            if self.after == 0 {
                self.token.cancel();
            }
        }
        fn on_sim_end(&mut self, final_tick: hd_core::Tick, metrics: &hd_sim::SimMetrics) {
            self.inner.on_sim_end(final_tick, metrics);
        }
    }

    #[test]
    fn cancelled_run_writes_nothing() {
        let token = CancelToken::new();
        let cfg = SimConfig { total_deliveries: 12, seed: 5, ..SimConfig::default() };
        let sim = SimBuilder::new(cfg, small_graph())
            .policy(RoutingPolicy::ShortestPath)
            .cancel_token(token.clone())
            .build()
            .unwrap();

        let inner = SimOutputObserver::new(Flaky::default(), "cancelled").with_batch_size(1);
        let mut obs = CancelAfter { inner, token, after: 3 };
        assert!(matches!(sim.run(&mut obs), Err(hd_sim::SimError::Cancelled)));

        let writer = obs.inner.into_writer();
        assert_eq!(writer.order_batches, 0);
        assert!(writer.metrics.is_empty());
        assert_eq!(writer.finished, 0);
    }

    #[test]
    fn rows_buffer_until_sim_end() {
        let mut obs = SimOutputObserver::new(Flaky::default(), "run");
        let row_source = delivered(0);
        let order = hd_sim::DeliveryOrder {
            completed: Some(hd_core::Tick(row_source.completed_secs.unwrap())),
            status: row_source.status,
            ..hd_sim::DeliveryOrder::new(
                hd_core::OrderId(0),
                hd_sim::OrderRequest {
                    producer: hd_core::NodeId(0),
                    consumer: hd_core::NodeId(5),
                    created:  hd_core::Tick(100),
                },
            )
        };
        assert_eq!(OrderRow::from(&order).completed_secs, Some(820));

        obs.on_order_terminal(&order);
        obs.on_order_terminal(&order);
        obs.on_sim_end(hd_core::Tick(900), &hd_sim::SimMetrics::default());
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().order_batches, 1);
    }
}

// ── SQLite ────────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    use super::helpers::{delivered, failed, metrics, tmp};

    #[test]
    fn orders_are_claimed_by_the_next_run() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_orders(&[delivered(0), failed(1)]).unwrap();
        w.write_metrics(&metrics("learned")).unwrap();
        w.write_orders(&[delivered(0)]).unwrap();
        w.write_metrics(&metrics("direct")).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count = |run: &str| -> i64 {
            conn.query_row("SELECT COUNT(*) FROM orders WHERE run = ?1", [run], |r| r.get(0))
                .unwrap()
        };
        assert_eq!(count("learned"), 2);
        assert_eq!(count("direct"), 1);

        let completed: Option<i64> = conn
            .query_row(
                "SELECT completed_secs FROM orders WHERE run = 'learned' AND order_id = 1",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(completed, None);

        let rate: f64 = conn
            .query_row("SELECT success_rate FROM metrics WHERE run = 'direct'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rate, 0.5);
    }
}

// ── Parquet ───────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use std::fs::File;

    use parquet::file::reader::{FileReader, SerializedFileReader};

    use crate::parquet::ParquetWriter;
    use crate::writer::OutputWriter;

    use super::helpers::{delivered, failed, metrics, tmp};

    #[test]
    fn row_counts_in_footer() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_orders(&[delivered(0), failed(1), delivered(2)]).unwrap();
        w.write_metrics(&metrics("learned")).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let rows = |name: &str| {
            let reader = SerializedFileReader::new(File::open(dir.path().join(name)).unwrap()).unwrap();
            reader.metadata().file_metadata().num_rows()
        };
        assert_eq!(rows("orders.parquet"), 3);
        assert_eq!(rows("metrics.parquet"), 1);
    }
}
