//! Records exactly as the node sends them.
//!
//! Nothing here is validated; the live sync mapper turns these into domain
//! entities and drops records that fail.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `get_blocks` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlocksPage {
    #[serde(default)]
    pub blocks: Vec<WireBlock>,
    /// Height to request the next older page from. `None` when exhausted.
    #[serde(default)]
    pub next_cursor: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBlock {
    pub height: u64,
    pub hash: String,
    #[serde(default)]
    pub parent_hash: Option<String>,
    pub timestamp: u64,
    pub miner: String,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub committee: Vec<String>,
    #[serde(default)]
    pub transactions: Vec<WireTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTransaction {
    pub tx_id: String,
    pub from: String,
    pub to: String,
    /// Integer or decimal string.
    pub amount: Value,
    pub fee: Value,
    pub timestamp: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// `GET /health` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub validators: Option<u32>,
    #[serde(default)]
    pub consensus: Option<ConsensusHealth>,
    #[serde(default)]
    pub epoch_remaining_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusHealth {
    #[serde(default)]
    pub active_validators: Option<u32>,
}

impl HealthStatus {
    /// Reported validator count, preferring the consensus section.
    pub fn active_validators(&self) -> Option<u32> {
        self.consensus
            .as_ref()
            .and_then(|c| c.active_validators)
            .or(self.validators)
    }
}
