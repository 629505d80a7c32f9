//! Simulator configuration.

use serde::Deserialize;
use shared_types::ValidationError;

/// Knobs for the synthetic chain.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Generator seed
    pub seed: u64,
    /// Time between generated blocks (ms)
    pub block_interval_ms: u64,
    /// Blocks required on top before a block is finalized
    pub finality_lag: u64,
    /// Back-dated blocks generated before the schedule starts
    pub initial_block_count: u64,
    /// Number of addresses transactions are drawn from
    pub account_pool_size: usize,
    pub tx_per_block_min: u64,
    pub tx_per_block_max: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            block_interval_ms: 4_000,
            finality_lag: 6,
            initial_block_count: 24,
            account_pool_size: 24,
            tx_per_block_min: 2,
            tx_per_block_max: 12,
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.block_interval_ms == 0 {
            return Err(ValidationError::InvalidConfig {
                field: "block_interval_ms",
                reason: "must be positive".into(),
            });
        }
        if self.tx_per_block_min > self.tx_per_block_max {
            return Err(ValidationError::InvalidConfig {
                field: "tx_per_block_min",
                reason: format!(
                    "{} exceeds tx_per_block_max {}",
                    self.tx_per_block_min, self.tx_per_block_max
                ),
            });
        }
        // A transaction needs a sender and a different recipient.
        if self.account_pool_size < 2 {
            return Err(ValidationError::InvalidConfig {
                field: "account_pool_size",
                reason: "at least 2 accounts required".into(),
            });
        }
        Ok(())
    }
}
