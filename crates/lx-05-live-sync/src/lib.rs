//! # lx-05-live-sync
//!
//! Keeps the shared ledger in step with a real node.
//!
//! ## Cycle
//!
//! Each refresh asks for the newest page of blocks and replaces the retained
//! window with it wholesale. Accounts are rebuilt from the new window; hashes
//! that were already finalized stay finalized. Older history is appended one
//! page at a time through [`LiveSyncBackend::load_more_blocks`], never past
//! the store's block cap.
//!
//! ## Concurrency
//!
//! Refresh and load-more each carry their own in-flight flag. A second call
//! while one is running returns immediately and does not reach the node.
//! Both mutate the store in short critical sections, and appending refuses a
//! height that is already present.
//!
//! ## Failure Policy
//!
//! Transport and protocol failures are logged and counted. The previously
//! published state stays exactly as it was and the next scheduled cycle
//! retries.

mod busy;
pub mod backend;
pub mod config;
pub mod mapper;

pub use backend::{HydratedBalance, LiveSyncBackend, RefreshOutcome};
pub use config::LiveSyncConfig;
pub use mapper::{map_block, map_page, map_transaction};
