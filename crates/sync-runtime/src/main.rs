//! # ledger-sync
//!
//! Runs the ledger sync engine until Ctrl+C and logs every statistics update.
//!
//! ## Startup Sequence
//!
//! 1. Parse CLI flags
//! 2. Load configuration (defaults → TOML → `LX_*` env → flags)
//! 3. Initialize telemetry (tracing + Prometheus registry)
//! 4. Build the engine and bootstrap it
//! 5. Log statistics until Ctrl+C, then dispose

use anyhow::{Context, Result};
use clap::Parser;
use lx_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use shared_types::BackendMode;
use std::path::PathBuf;
use std::str::FromStr;
use sync_runtime::{EngineConfig, LedgerSyncEngine};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "ledger-sync", version, about = "Bounded in-memory ledger state sync")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Backend: `simulated` or `live`
    #[arg(long)]
    mode: Option<String>,

    /// Node base URL for live mode
    #[arg(long)]
    node_url: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    block_interval_ms: Option<u64>,

    #[arg(long)]
    max_blocks: Option<usize>,

    /// Bootstrap only; do not start the schedule
    #[arg(long, default_value_t = false)]
    no_auto_start: bool,

    /// Overrides LX_LOG_LEVEL / RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Print the Prometheus text exposition on exit
    #[arg(long, default_value_t = false)]
    dump_metrics: bool,
}

impl Cli {
    fn apply(&self, config: &mut EngineConfig) -> Result<()> {
        if let Some(mode) = &self.mode {
            config.mode = BackendMode::from_str(mode)?;
        }
        if let Some(url) = &self.node_url {
            config.live.node_url = url.clone();
        }
        if let Some(seed) = self.seed {
            config.simulator.seed = seed;
        }
        if let Some(interval) = self.block_interval_ms {
            config.block_interval_ms = interval;
        }
        if let Some(max_blocks) = self.max_blocks {
            config.store.max_blocks = max_blocks;
        }
        if self.no_auto_start {
            config.auto_start = false;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        EngineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config)?;

    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = &cli.log_level {
        telemetry = telemetry.with_log_level(level.clone());
    }
    let _telemetry = init_telemetry(telemetry)?;

    info!("===========================================");
    info!("  ledger-sync v{}", env!("CARGO_PKG_VERSION"));
    info!("  Backend: {}", config.mode.as_str());
    info!("===========================================");

    let engine = LedgerSyncEngine::new(config).context("Failed to build engine")?;

    let mut stats = engine.hub().subscribe_stats()?;
    let stats_logger = tokio::spawn(async move {
        while let Some(stats) = stats.recv().await {
            info!(
                height = stats.current_height,
                finalized = stats.finalized_height,
                tps = stats.avg_throughput,
                validators = stats.active_validators,
                next_election_ms = stats.time_to_next_election_ms,
                "Network stats"
            );
        }
        debug!("Stats channel closed");
    });

    engine.bootstrap().await.context("Bootstrap failed")?;
    info!("Engine running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    info!("Initiating graceful shutdown...");
    engine.dispose().await;
    if let Err(e) = stats_logger.await {
        warn!(error = %e, "Stats logger ended abnormally");
    }

    if cli.dump_metrics {
        println!("{}", encode_metrics()?);
    }
    info!("Shutdown complete");
    Ok(())
}
