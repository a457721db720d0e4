//! REMASC simulator binary.
//!
//! Runs the fee engine over a simulated chain and prints a JSON summary.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use remasc_sim::cli::Cli;
use remasc_sim::sim::Simulator;
use remasc_storage::{KvBackend, MemoryBackend, RocksBackend};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("REMASC simulator v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.remasc_config().context("loading REMASC configuration")?;
    let params = cli.params();

    let summary = match &cli.data_dir {
        Some(dir) => {
            let backend = Arc::new(
                RocksBackend::open(dir).with_context(|| format!("opening database at {}", dir.display()))?,
            );
            let summary = Simulator::new(config, params, Arc::clone(&backend))?.run()?;
            backend.flush()?;
            summary
        }
        None => Simulator::new(config, params, Arc::new(MemoryBackend::new()))?.run()?,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
