//! Typed state channels, one per published view.

use shared_bus::{StateChannel, Subscription, SubscriptionError};
use shared_types::{
    AccountSnapshot, BlockSummary, NetworkStats, SyncError, SyncResult, TimestampMs,
    TransactionSummary,
};
use tracing::debug;

/// The busy indicators readers can watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusyFlag {
    Refreshing,
    LoadingMore,
}

/// Every channel the engine publishes on.
#[derive(Clone)]
pub struct StateHub {
    pub blocks: StateChannel<Vec<BlockSummary>>,
    pub recent_transactions: StateChannel<Vec<TransactionSummary>>,
    pub stats: StateChannel<NetworkStats>,
    pub accounts: StateChannel<Vec<AccountSnapshot>>,
    pub last_refreshed: StateChannel<Option<TimestampMs>>,
    pub refreshing: StateChannel<bool>,
    pub loading_more: StateChannel<bool>,
    pub has_more: StateChannel<bool>,
}

impl Default for StateHub {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHub {
    pub fn new() -> Self {
        Self {
            blocks: StateChannel::new("blocks", Vec::new()),
            recent_transactions: StateChannel::new("recent_transactions", Vec::new()),
            stats: StateChannel::new("stats", NetworkStats::default()),
            accounts: StateChannel::new("accounts", Vec::new()),
            last_refreshed: StateChannel::new("last_refreshed", None),
            refreshing: StateChannel::new("refreshing", false),
            loading_more: StateChannel::new("loading_more", false),
            has_more: StateChannel::new("has_more", false),
        }
    }

    fn flag(&self, flag: BusyFlag) -> &StateChannel<bool> {
        match flag {
            BusyFlag::Refreshing => &self.refreshing,
            BusyFlag::LoadingMore => &self.loading_more,
        }
    }

    /// Publish a busy flag. Repeating the current value sends nothing.
    pub fn set_busy(&self, flag: BusyFlag, busy: bool) -> SyncResult<()> {
        self.flag(flag)
            .publish_if_changed(busy)
            .map(|_| ())
            .map_err(closed)
    }

    pub fn is_busy(&self, flag: BusyFlag) -> bool {
        self.flag(flag).current()
    }

    pub fn set_has_more(&self, has_more: bool) -> SyncResult<()> {
        self.has_more
            .publish_if_changed(has_more)
            .map(|_| ())
            .map_err(closed)
    }

    pub fn subscribe_blocks(&self) -> SyncResult<Subscription<Vec<BlockSummary>>> {
        self.blocks.subscribe().map_err(closed)
    }

    pub fn subscribe_transactions(&self) -> SyncResult<Subscription<Vec<TransactionSummary>>> {
        self.recent_transactions.subscribe().map_err(closed)
    }

    pub fn subscribe_stats(&self) -> SyncResult<Subscription<NetworkStats>> {
        self.stats.subscribe().map_err(closed)
    }

    pub fn subscribe_accounts(&self) -> SyncResult<Subscription<Vec<AccountSnapshot>>> {
        self.accounts.subscribe().map_err(closed)
    }

    pub fn subscribe_last_refreshed(&self) -> SyncResult<Subscription<Option<TimestampMs>>> {
        self.last_refreshed.subscribe().map_err(closed)
    }

    pub fn subscribe_busy(&self, flag: BusyFlag) -> SyncResult<Subscription<bool>> {
        self.flag(flag).subscribe().map_err(closed)
    }

    pub fn subscribe_has_more(&self) -> SyncResult<Subscription<bool>> {
        self.has_more.subscribe().map_err(closed)
    }

    /// Close every channel. Subscribers drain what is queued, then end.
    pub fn close_all(&self) {
        self.blocks.close();
        self.recent_transactions.close();
        self.stats.close();
        self.accounts.close();
        self.last_refreshed.close();
        self.refreshing.close();
        self.loading_more.close();
        self.has_more.close();
        debug!("All state channels closed");
    }

    pub fn is_closed(&self) -> bool {
        self.blocks.is_closed()
    }
}

pub(crate) fn closed(_: SubscriptionError) -> SyncError {
    SyncError::Closed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values_replayed() {
        let hub = StateHub::new();
        let mut blocks = hub.subscribe_blocks().unwrap();
        let mut refreshed = hub.subscribe_last_refreshed().unwrap();

        assert_eq!(blocks.try_recv().unwrap(), Some(Vec::new()));
        assert_eq!(refreshed.try_recv().unwrap(), Some(None));
    }

    #[test]
    fn test_busy_flag_entry_and_exit() {
        let hub = StateHub::new();
        let mut sub = hub.subscribe_busy(BusyFlag::Refreshing).unwrap();

        hub.set_busy(BusyFlag::Refreshing, true).unwrap();
        assert!(hub.is_busy(BusyFlag::Refreshing));
        hub.set_busy(BusyFlag::Refreshing, false).unwrap();

        let seen: Vec<bool> = std::iter::from_fn(|| sub.try_recv().unwrap()).collect();
        assert_eq!(seen, vec![false, true, false]);
        assert!(!hub.is_busy(BusyFlag::LoadingMore));
    }

    #[test]
    fn test_close_all_rejects_subscribe_and_publish() {
        let hub = StateHub::new();
        hub.close_all();
        hub.close_all();

        assert!(hub.is_closed());
        assert!(matches!(hub.subscribe_stats(), Err(SyncError::Closed)));
        assert_eq!(hub.set_has_more(true), Err(SyncError::Closed));
    }
}
