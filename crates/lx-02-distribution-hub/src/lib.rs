//! # lx-02-distribution-hub
//!
//! Publishes the contents of the bounded store to any number of readers.
//!
//! ## Channels
//!
//! | Channel | Value | Published |
//! |---------|-------|-----------|
//! | `blocks` | `Vec<BlockSummary>` ascending | every cycle |
//! | `recent_transactions` | `Vec<TransactionSummary>` newest first | every cycle |
//! | `stats` | `NetworkStats` | every cycle |
//! | `accounts` | `Vec<AccountSnapshot>` | every cycle |
//! | `last_refreshed` | `Option<TimestampMs>` | successful cycles |
//! | `refreshing` / `loading_more` | `bool` | on entry and exit |
//! | `has_more` | `bool` | after each page |
//!
//! A new subscriber always receives the current value first, then every
//! later publication in order.
//!
//! ## Shared Ledger
//!
//! [`SharedLedger`] pairs the store (behind a `RwLock`) with the hub. Writers
//! mutate under the lock, then call [`SharedLedger::publish`] once per cycle
//! so readers never observe a half-applied cycle.

pub mod hub;
pub mod ledger;

pub use hub::{BusyFlag, StateHub};
pub use ledger::SharedLedger;
