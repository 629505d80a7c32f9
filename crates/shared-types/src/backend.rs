//! # Sync Backend Trait
//!
//! The contract both data sources implement so the engine never branches on
//! the mode.
//!
//! ```text
//!                 ┌────────────────────┐
//!                 │  LedgerSyncEngine  │
//!                 └─────────┬──────────┘
//!                           │ dyn SyncBackend
//!            ┌──────────────┴──────────────┐
//!            ▼                             ▼
//!   SimulatedBackend               LiveSyncBackend
//!   bootstrap = seed history       bootstrap = first poll
//!   tick      = generate 1 block   tick      = re-poll
//!   load_more = always false       load_more = older page
//! ```
//!
//! Both write into the same bounded store and publish through the same hub.

use crate::entities::BackendMode;
use crate::errors::SyncResult;
use async_trait::async_trait;

#[async_trait]
pub trait SyncBackend: Send + Sync {
    /// Human-readable name for log lines.
    fn name(&self) -> &'static str;

    fn mode(&self) -> BackendMode;

    /// Establish the baseline history before the schedule starts.
    async fn bootstrap(&self) -> SyncResult<()>;

    /// Run one scheduled cycle.
    ///
    /// Live backends swallow transport failures here (the previous snapshot
    /// stays published) and still return `Ok(())`.
    async fn tick(&self) -> SyncResult<()>;

    /// Append one page of older history.
    ///
    /// Returns `false` with no state change when nothing more can be loaded.
    async fn load_more(&self) -> SyncResult<bool>;

    /// Whether an older page is believed to exist.
    fn has_more(&self) -> bool;
}
