//! # Core Ledger Entities
//!
//! The read model published by the engine.
//!
//! ## Clusters
//!
//! - **Chain**: `BlockSummary`, `BlockDetails`, `TransactionSummary`,
//!   `TransactionDetails`
//! - **State**: `AccountSnapshot`
//! - **Network**: `NetworkStats`, `CommitteeId` rotation
//! - **Snapshot**: `LedgerSnapshot` (everything at one instant)

use crate::values::{Address, AtomicAmount, CommitteeId, Hash, Height, TimestampMs};
use serde::{Deserialize, Serialize};

/// Size of the active committee.
pub const COMMITTEE_SIZE: usize = 8;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// Finality status of a block.
///
/// ```text
/// [Pending] ──height/confirmation threshold──→ [Finalized]
/// ```
///
/// The transition is one-way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    #[default]
    Pending,
    Finalized,
}

/// Status of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Confirmed,
    Failed,
}

impl TransactionStatus {
    /// Lenient wire parsing; unknown strings read as pending.
    pub fn from_wire(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "confirmed" | "finalized" | "success" | "included" => Self::Confirmed,
            "failed" | "rejected" | "reverted" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// Block header-level view shown in lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub height: Height,
    pub hash: Hash,
    /// `None` only for genesis (or when the node omits it).
    pub parent_hash: Option<Hash>,
    pub timestamp: TimestampMs,
    pub transaction_count: u32,
    /// Sum of the values of the block's transactions.
    pub total_value: AtomicAmount,
    pub status: BlockStatus,
    /// Number of blocks on top of this one, itself included.
    pub confirmations: u64,
    pub miner: Address,
    pub committee: Vec<CommitteeId>,
}

impl BlockSummary {
    /// Upgrade to finalized when `finalized` holds. Never downgrades.
    pub fn apply_finality(&mut self, finalized: bool) {
        if finalized {
            self.status = BlockStatus::Finalized;
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status == BlockStatus::Finalized
    }
}

/// A block together with its transaction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDetails {
    pub summary: BlockSummary,
    pub transactions: Vec<TransactionSummary>,
}

impl BlockDetails {
    pub fn hash(&self) -> &Hash {
        &self.summary.hash
    }

    pub fn height(&self) -> Height {
        self.summary.height
    }
}

/// Transaction view shown in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: Hash,
    pub block_hash: Hash,
    pub block_height: Height,
    pub from: Address,
    pub to: Address,
    pub value: AtomicAmount,
    pub fee: AtomicAmount,
    pub timestamp: TimestampMs,
    pub status: TransactionStatus,
    pub memo: Option<String>,
}

/// A transaction with its inputs, outputs and confirmation count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub summary: TransactionSummary,
    pub inputs: Vec<Hash>,
    pub outputs: Vec<Hash>,
    pub confirmations: u64,
}

impl TransactionDetails {
    pub fn hash(&self) -> &Hash {
        &self.summary.hash
    }
}

// =============================================================================
// CLUSTER B: STATE
// =============================================================================

/// The state of one account plus its bounded recent activity.
///
/// Activity lists are most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    pub balance: AtomicAmount,
    pub staked: AtomicAmount,
    /// Incremented once per outgoing transaction.
    pub nonce: u64,
    /// Reputation score (0-100).
    pub reputation: u8,
    pub last_seen: TimestampMs,
    pub outbound: Vec<Hash>,
    pub inbound: Vec<Hash>,
    pub recent_blocks: Vec<Hash>,
}

impl AccountSnapshot {
    /// An empty account, as created on first reference.
    pub fn empty(address: Address, seen_at: TimestampMs) -> Self {
        Self {
            address,
            balance: AtomicAmount::ZERO,
            staked: AtomicAmount::ZERO,
            nonce: 0,
            reputation: 0,
            last_seen: seen_at,
            outbound: Vec::new(),
            inbound: Vec::new(),
            recent_blocks: Vec::new(),
        }
    }
}

// =============================================================================
// CLUSTER C: NETWORK
// =============================================================================

/// Derived network statistics. Recomputed every cycle, never stored history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub current_height: u64,
    pub finalized_height: u64,
    /// Average transactions per second over the recent window.
    pub avg_throughput: f64,
    pub active_validators: u32,
    pub time_to_next_election_ms: u64,
    pub timestamp: TimestampMs,
}

/// Which backend feeds the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    #[default]
    Simulated,
    Live,
}

impl BackendMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Live => "live",
        }
    }
}

impl std::str::FromStr for BackendMode {
    type Err = crate::errors::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simulated" | "mock" | "sim" => Ok(Self::Simulated),
            "live" | "node" => Ok(Self::Live),
            other => Err(crate::errors::ValidationError::InvalidConfig {
                field: "mode",
                reason: format!("unknown backend mode `{other}`"),
            }),
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// The complete published view at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Ascending by height.
    pub blocks: Vec<BlockSummary>,
    /// Most recent first.
    pub recent_transactions: Vec<TransactionSummary>,
    pub stats: NetworkStats,
    pub accounts: Vec<AccountSnapshot>,
    pub last_refreshed: Option<TimestampMs>,
}
