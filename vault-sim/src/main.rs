mod config;
use config::SimConfig;

mod scenario;
use scenario::Simulation;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replays a deposit/withdraw scenario against an in-memory token and vault.
#[derive(Debug, Parser)]
#[command(about, long_about = None)]
struct Arguments {
    /// Scenario file. Defaults to the nearest `vault-sim.toml`, or an empty
    /// deployment if there is none.
    scenario: Option<PathBuf>,
}

fn main() -> eyre::Result<()> {
    // Initialize logging
    let tracing_sub = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(tracing_sub)?;

    let args = Arguments::parse();
    let config = match &args.scenario {
        Some(path) => SimConfig::load_from_path(path)?,
        None => SimConfig::load()?,
    };
    info!(
        "Loaded scenario with {} steps for token {} ({})",
        config.steps.len(),
        config.token.name,
        config.token.symbol
    );

    let mut sim = Simulation::deploy(&config)?;
    let report = sim.run()?;
    info!("{}", report);

    Ok(())
}
