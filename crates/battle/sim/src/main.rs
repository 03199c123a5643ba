//! Headless battle simulator.
//!
//! Loads a scenario from a content directory, steps the engine frame by
//! frame and prints the combat narration to stdout. Diagnostics go to stderr
//! through `tracing` (`RUST_LOG=battle_core=debug` for engine internals).
mod driver;
mod pilot;

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use clap::Parser;

use crate::driver::Simulation;

#[derive(Debug, Parser)]
#[command(name = "battle-sim", about = "Step a battle scenario headlessly")]
struct Args {
    /// Content directory holding config.toml, catalog.ron and scenarios/.
    #[arg(long, default_value = "crates/battle/content/data")]
    data: PathBuf,

    /// Scenario name (file stem under scenarios/).
    #[arg(long, default_value = "duel")]
    scenario: String,

    /// Frames to simulate unless the battle ends earlier.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Overrides the scenario seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Let the party leader fight on its own as well.
    #[arg(long)]
    autopilot: bool,

    /// Print the final battle state as JSON.
    #[arg(long)]
    snapshot: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let factory = ContentFactory::new(&args.data);
    let config = factory.load_config()?;
    let loaded = factory.load_catalog()?;
    let mut scenario = factory
        .load_scenario(&args.scenario)
        .with_context(|| format!("Failed to load scenario '{}'", args.scenario))?;
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }

    tracing::info!(
        scenario = %scenario.name,
        seed = scenario.seed,
        frames = args.frames,
        "simulation starting"
    );
    let mut simulation = Simulation::new(config, loaded, scenario, args.autopilot);
    let summary = simulation.run(args.frames);

    println!("{summary}");
    if args.snapshot {
        let json = serde_json::to_string_pretty(simulation.state())
            .context("Failed to encode battle snapshot")?;
        println!("{json}");
    }
    Ok(())
}
