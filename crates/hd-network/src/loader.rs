//! CSV location feed loader.
//!
//! # CSV format
//!
//! One row per location, produced by the external geographic/census
//! extractor:
//!
//! ```csv
//! id,lat,lon,role
//! 0,39.9612,-82.9988,producer
//! 1,39.9700,-83.0030,consumer
//! 2,39.9550,-82.9900,anchor
//! ```
//!
//! Rows that fail to parse, carry an unknown role, or have out-of-range
//! coordinates are skipped individually and counted in the [`LoadReport`];
//! they never abort the load.  Duplicate ids are left for the
//! [`NetworkBuilder`](crate::NetworkBuilder) to reject.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use hd_core::{Location, LocationId, Role};

use crate::NetworkResult;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LocationRecord {
    id:   u32,
    lat:  f64,
    lon:  f64,
    role: String,
}

/// Outcome counts of one feed load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded:  usize,
    pub skipped: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load locations from a CSV file.
pub fn load_locations_csv(path: &Path) -> NetworkResult<(Vec<Location>, LoadReport)> {
    let file = std::fs::File::open(path)?;
    load_locations_reader(file)
}

/// Like [`load_locations_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
pub fn load_locations_reader<R: Read>(reader: R) -> NetworkResult<(Vec<Location>, LoadReport)> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut locations = Vec::new();
    let mut report = LoadReport::default();

    for (row, result) in csv_reader.deserialize::<LocationRecord>().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row, error = %e, "skipping unparsable location row");
                report.skipped += 1;
                continue;
            }
        };
        let Some(role) = Role::parse(&record.role) else {
            debug!(row, role = %record.role, "skipping location with unknown role");
            report.skipped += 1;
            continue;
        };
        let location = Location::new(LocationId(record.id), record.lat, record.lon, role);
        if !location.is_valid() {
            debug!(row, id = record.id, "skipping location with invalid coordinates");
            report.skipped += 1;
            continue;
        }
        locations.push(location);
    }

    report.loaded = locations.len();
    if report.skipped > 0 {
        warn!(skipped = report.skipped, "malformed location records skipped");
    }
    info!(loaded = report.loaded, "location feed loaded");
    Ok((locations, report))
}
