//! # Ledger-Sync Telemetry
//!
//! Logging and metrics shared by every ledger-sync crate.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` registry with an `EnvFilter` and
//!   either a JSON layer (containers) or a pretty layer (development).
//! - **Metrics**: Prometheus counters and gauges on a private registry,
//!   rendered with [`encode_metrics`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lx_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LX_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `LX_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `LX_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `LX_SERVICE_NAME` | `ledger-sync` | Service name field |

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, BLOCKS_EVICTED, BLOCKS_GENERATED,
    CHAIN_HEIGHT, CYCLE_DURATION, FINALIZED_HEIGHT, PAGES_LOADED, POLLS, RECORDS_REJECTED,
    RETAINED_BLOCKS,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    let tracing_guard = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
