//! Pipeline configuration: one JSON document covering every stage.
//!
//! Every section is optional; missing fields take their defaults.
//!
//! ```json
//! {
//!   "locations_csv": "data/columbus.csv",
//!   "network":  { "superspot_ratio": 8.0 },
//!   "training": { "episodes": 1000, "seed": 3 },
//!   "sim":      { "total_deliveries": 500 },
//!   "output_dir": "output/columbus"
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hd_agent::TrainingConfig;
use hd_graph::GraphConfig;
use hd_network::NetworkConfig;
use hd_sim::SimConfig;

use crate::city::CityConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Location feed; the synthetic city is used when absent.
    pub locations_csv: Option<PathBuf>,
    pub city: CityConfig,
    pub network: NetworkConfig,
    pub graph: GraphConfig,
    pub training: TrainingConfig,
    pub sim: SimConfig,
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            locations_csv: None,
            city: CityConfig::default(),
            network: NetworkConfig::default(),
            graph: GraphConfig::default(),
            training: TrainingConfig::default(),
            sim: SimConfig { total_deliveries: 300, ..SimConfig::default() },
            output_dir: PathBuf::from("output/pipeline"),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))
    }
}
