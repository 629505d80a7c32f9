//! # lx-01-state-store
//!
//! Bounded State Store shared by both synchronization backends.
//!
//! ## Overview
//!
//! - **Block index**: `BTreeMap<Height, Hash>` so the oldest block is always
//!   the first entry.
//! - **Detail caches**: block and transaction details keyed by hash.
//! - **Recent transactions**: most-recent-first, capped.
//! - **Accounts**: created lazily, never evicted; their activity lists are
//!   most-recent-first and capped.
//!
//! ## Eviction
//!
//! ```text
//! insert_block ──→ len > max_blocks? ──yes──→ pop oldest height
//!                                               ├── drop its tx details
//!                                               ├── drop its txs from recent list
//!                                               └── scrub its hash from every
//!                                                   account's recent blocks
//! ```
//!
//! Repeated one block at a time until the store is back within bound.

pub mod capped;
pub mod config;
pub mod derive;
pub mod store;

pub use capped::{push_back_capped, push_front_capped};
pub use config::StoreLimits;
pub use derive::{average_throughput, THROUGHPUT_WINDOW};
pub use store::{ActivityOrder, BoundedStateStore, StoreWindow, WindowBlock};
