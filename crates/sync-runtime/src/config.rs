//! # Engine Configuration
//!
//! Unified configuration for the store, both backends and the schedule.
//!
//! ## Loading Order
//!
//! 1. Built-in defaults
//! 2. Optional TOML file
//! 3. `LX_*` environment overrides
//! 4. CLI flags (applied by the binary)
//!
//! ```toml
//! mode = "live"
//! block_interval_ms = 4000
//! finality_lag = 6
//!
//! [simulator]
//! seed = 42
//! account_pool_size = 24
//!
//! [live]
//! node_url = "http://127.0.0.1:8645"
//! page_size = 25
//!
//! [store]
//! max_blocks = 120
//! ```
//!
//! `block_interval_ms` and `finality_lag` live at the top level and override
//! the copies inside `[simulator]` and `[live]`.

use lx_01_state_store::StoreLimits;
use lx_03_chain_simulator::SimulatorConfig;
use lx_05_live_sync::LiveSyncConfig;
use serde::Deserialize;
use shared_types::{BackendMode, ValidationError};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for {var}: `{value}`")]
    Env { var: &'static str, value: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which backend feeds the store
    pub mode: BackendMode,
    /// Start the schedule right after bootstrap
    pub auto_start: bool,
    /// Schedule period; also the simulator's block spacing
    pub block_interval_ms: u64,
    pub finality_lag: u64,
    pub simulator: SimulatorConfig,
    pub live: LiveSyncConfig,
    pub store: StoreLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Simulated,
            auto_start: true,
            block_interval_ms: 4_000,
            finality_lag: 6,
            simulator: SimulatorConfig::default(),
            live: LiveSyncConfig::default(),
            store: StoreLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `LX_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("LX_MODE") {
            self.mode = BackendMode::from_str(&mode)?;
        }
        if let Some(url) = lookup("LX_NODE_URL") {
            self.live.node_url = url;
        }
        override_parsed(&lookup, "LX_SEED", &mut self.simulator.seed)?;
        override_parsed(&lookup, "LX_BLOCK_INTERVAL_MS", &mut self.block_interval_ms)?;
        override_parsed(&lookup, "LX_FINALITY_LAG", &mut self.finality_lag)?;
        override_parsed(&lookup, "LX_MAX_BLOCKS", &mut self.store.max_blocks)?;
        override_parsed(&lookup, "LX_ACCOUNT_POOL", &mut self.simulator.account_pool_size)?;
        override_parsed(&lookup, "LX_TX_MIN", &mut self.simulator.tx_per_block_min)?;
        override_parsed(&lookup, "LX_TX_MAX", &mut self.simulator.tx_per_block_max)?;
        override_parsed(&lookup, "LX_PAGE_SIZE", &mut self.live.page_size)?;
        override_parsed(&lookup, "LX_AUTO_START", &mut self.auto_start)?;
        Ok(())
    }

    /// Simulator settings with the shared schedule values applied.
    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            block_interval_ms: self.block_interval_ms,
            finality_lag: self.finality_lag,
            ..self.simulator.clone()
        }
    }

    /// Live sync settings with the shared schedule values applied.
    pub fn live_config(&self) -> LiveSyncConfig {
        LiveSyncConfig {
            block_interval_ms: self.block_interval_ms,
            finality_lag: self.finality_lag,
            ..self.live.clone()
        }
    }

    pub fn block_interval(&self) -> Duration {
        Duration::from_millis(self.block_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.simulator_config().validate()?;
        self.live_config().validate()?;

        if self.store.max_blocks == 0 {
            return Err(ValidationError::InvalidConfig {
                field: "max_blocks",
                reason: "must be positive".into(),
            });
        }
        if self.simulator.initial_block_count > self.store.max_blocks as u64 {
            return Err(ValidationError::InvalidConfig {
                field: "initial_block_count",
                reason: format!(
                    "{} exceeds max_blocks {}",
                    self.simulator.initial_block_count, self.store.max_blocks
                ),
            });
        }
        Ok(())
    }
}

fn override_parsed<F, T>(lookup: &F, var: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(var) else {
        return Ok(());
    };
    *target = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value: raw })?;
    Ok(())
}
