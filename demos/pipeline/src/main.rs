//! pipeline — end-to-end run of the hub-delivery workspace.
//!
//! 1. Load a location feed (or generate a synthetic city).
//! 2. Build the hotspot/superspot hierarchy and the routing graph.
//! 3. Train one Q-agent per hub.
//! 4. Simulate the same orders under several routing policies and compare.
//!
//! Usage: `pipeline [config.json]`.  Logging honours `RUST_LOG`
//! (default `info`).

mod city;
mod config;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use hd_agent::{ModelArtifact, Trainer, UniformConsumers};
use hd_graph::RoutingGraph;
use hd_network::{NetworkBuilder, load_locations_csv};
use hd_output::{CsvWriter, SimOutputObserver};
use hd_sim::{RoutingPolicy, SimBuilder, SimConfig, SimMetrics};

use city::synthetic_city;
use config::PipelineConfig;

/// Episodes averaged per point of the printed learning curve.
const CURVE_WINDOW: usize = 50;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load(Path::new(&path))?,
        None => PipelineConfig::default(),
    };
    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating {}", cfg.output_dir.display()))?;

    // 1. Locations.
    let locations = match &cfg.locations_csv {
        Some(path) => {
            let (locations, report) = load_locations_csv(path)?;
            info!(loaded = report.loaded, skipped = report.skipped, "location feed loaded");
            locations
        }
        None => synthetic_city(&cfg.city),
    };

    // 2. Hierarchy and graph.
    let hierarchy = NetworkBuilder::new(cfg.network.clone())?.build(&locations)?;
    hierarchy.save_json(&cfg.output_dir.join("hierarchy.json"))?;
    println!(
        "Network: {} locations → {} hotspots → {} superspots (ratio {:.2})",
        hierarchy.location_count(),
        hierarchy.hotspot_count(),
        hierarchy.superspot_count(),
        hierarchy.ratio(),
    );

    let graph = Arc::new(RoutingGraph::from_hierarchy(&hierarchy, &cfg.graph)?);
    println!("Routing graph: {} nodes, {} edges", graph.node_count(), graph.edge_count());

    // 3. Training.
    let demand = UniformConsumers::from_graph(&graph);
    let t0 = Instant::now();
    let outcome = Trainer::new(&graph, &demand, cfg.training.clone())?.train_all()?;
    let curve = outcome.stats.window_means(CURVE_WINDOW);
    println!(
        "Trained {} agents in {:.2} s; mean return {:.1} → {:.1}",
        outcome.agents.len(),
        t0.elapsed().as_secs_f64(),
        curve.first().copied().unwrap_or_default(),
        curve.last().copied().unwrap_or_default(),
    );
    ModelArtifact::from_agents(&outcome.agents, &cfg.training)
        .save_json(&cfg.output_dir.join("model.json"))?;
    let agents = Arc::new(outcome.agents);

    // 4. Policy comparison over identical orders (same seed).
    let runs = [
        ("learned_shared", RoutingPolicy::Learned(agents.clone()), true),
        ("learned_solo", RoutingPolicy::Learned(agents), false),
        ("shortest_path", RoutingPolicy::ShortestPath, true),
        ("direct", RoutingPolicy::Direct, false),
    ];

    println!();
    println!(
        "{:<16} {:>9} {:>9} {:>12} {:>10} {:>8}",
        "Run", "Delivered", "Success", "Distance km", "Avg min", "Groups"
    );
    println!("{}", "-".repeat(69));
    for (label, policy, ride_sharing) in runs {
        let sim_cfg = SimConfig { ride_sharing, ..cfg.sim.clone() };
        let metrics = simulate(&cfg.output_dir, label, sim_cfg, graph.clone(), policy)?;
        println!(
            "{:<16} {:>9} {:>9.3} {:>12.1} {:>10.1} {:>8}",
            label,
            metrics.delivered,
            metrics.success_rate,
            metrics.total_distance_km,
            metrics.avg_delivery_time_secs / 60.0,
            metrics.ride_share_groups,
        );
    }
    println!();
    println!("Output written to {}", cfg.output_dir.display());
    Ok(())
}

/// One simulation run, written to `<out>/<label>/`.
fn simulate(
    out: &Path,
    label: &str,
    config: SimConfig,
    graph: Arc<RoutingGraph>,
    policy: RoutingPolicy,
) -> Result<SimMetrics> {
    let dir = out.join(label);
    std::fs::create_dir_all(&dir)?;
    let sim = SimBuilder::new(config, graph).policy(policy).build()?;

    let mut obs = SimOutputObserver::new(CsvWriter::new(&dir)?, label);
    let metrics = sim.run(&mut obs)?;
    if let Some(e) = obs.take_error() {
        warn!(run = label, error = %e, "output error");
    }
    Ok(metrics)
}
