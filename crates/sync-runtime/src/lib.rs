//! # Sync Runtime
//!
//! Wires the ledger-sync subsystems into one engine context object. The
//! `ledger-sync` binary in `main.rs` is a thin shell around it.
//!
//! ## Wiring
//!
//! ```text
//!               EngineConfig
//!                    │
//!                    ▼
//!   ┌──────────────────────────────────┐
//!   │         LedgerSyncEngine         │
//!   │                                  │
//!   │  dyn SyncBackend ──→ SharedLedger│──→ StateHub channels
//!   │   ├ SimulatedBackend  (store +   │──→ point lookups
//!   │   └ LiveSyncBackend    hub)      │
//!   │        └ dyn NodeApi ────────────│──→ pass-through calls
//!   └──────────────────────────────────┘
//! ```

pub mod config;
pub mod engine;

pub use config::{ConfigError, EngineConfig};
pub use engine::LedgerSyncEngine;
