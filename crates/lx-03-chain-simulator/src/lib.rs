//! # lx-03-chain-simulator
//!
//! Deterministic synthetic chain used when no live node is configured.
//!
//! ## Overview
//!
//! - **Generator**: ChaCha8-based [`DeterministicRng`]. Same seed, same call
//!   sequence, same history.
//! - **Simulator**: [`ChainSimulator`] seeds back-dated history, then produces
//!   one block per tick. Transfers debit the sender (value + fee, clamped at
//!   zero), credit the recipient (value) and the miner (fee).
//! - **Committee**: 8 of 24 identifiers, reshuffled every 32 blocks.
//! - **Backend**: [`SimulatedBackend`] implements `SyncBackend` on top of the
//!   shared ledger.
//!
//! ## Cycle
//!
//! ```text
//! tick ──→ rotate committee? ──→ draw miner + txs ──→ apply transfers
//!                                                        │
//!      publish ←── stats ←── finality (h <= tip - lag) ←── insert + evict
//! ```

pub mod backend;
pub mod committee;
pub mod config;
pub mod rng;
pub mod simulator;

pub use backend::SimulatedBackend;
pub use committee::{CommitteeSchedule, COMMITTEE_POOL_SIZE, ROTATION_INTERVAL};
pub use config::SimulatorConfig;
pub use rng::DeterministicRng;
pub use simulator::ChainSimulator;
