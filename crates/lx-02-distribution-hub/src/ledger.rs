//! The store and the hub behind one handle.

use crate::hub::StateHub;
use lx_01_state_store::{BoundedStateStore, StoreLimits};
use lx_telemetry::{CHAIN_HEIGHT, FINALIZED_HEIGHT};
use parking_lot::RwLock;
use shared_types::{
    AccountSnapshot, Address, BlockDetails, Hash, LedgerSnapshot, NetworkStats, SyncResult,
    TimestampMs, TransactionDetails,
};
use std::sync::Arc;
use tracing::trace;

/// Cloneable handle shared by the backend that writes and the readers.
#[derive(Clone)]
pub struct SharedLedger {
    store: Arc<RwLock<BoundedStateStore>>,
    hub: StateHub,
}

impl SharedLedger {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            store: Arc::new(RwLock::new(BoundedStateStore::new(limits))),
            hub: StateHub::new(),
        }
    }

    pub fn hub(&self) -> &StateHub {
        &self.hub
    }

    /// Run `f` with exclusive access to the store.
    ///
    /// Keep the closure synchronous and short; nothing is published until
    /// [`publish`](Self::publish) is called.
    pub fn write<R>(&self, f: impl FnOnce(&mut BoundedStateStore) -> R) -> R {
        f(&mut self.store.write())
    }

    /// Run `f` with shared access to the store.
    pub fn read<R>(&self, f: impl FnOnce(&BoundedStateStore) -> R) -> R {
        f(&self.store.read())
    }

    /// Publish the store contents plus `stats` on every data channel.
    ///
    /// `refreshed_at` is published on `last_refreshed` when present.
    pub fn publish(&self, stats: NetworkStats, refreshed_at: Option<TimestampMs>) -> SyncResult<()> {
        let (blocks, transactions, accounts) = self.read(|store| {
            (
                store.blocks_ascending(),
                store.recent_transactions(),
                store.accounts(),
            )
        });

        CHAIN_HEIGHT.set(stats.current_height as f64);
        FINALIZED_HEIGHT.set(stats.finalized_height as f64);
        trace!(
            blocks = blocks.len(),
            transactions = transactions.len(),
            accounts = accounts.len(),
            "Publishing ledger state"
        );

        let closed = crate::hub::closed;
        self.hub.blocks.publish(blocks).map_err(closed)?;
        self.hub.recent_transactions.publish(transactions).map_err(closed)?;
        self.hub.stats.publish(stats).map_err(closed)?;
        self.hub.accounts.publish(accounts).map_err(closed)?;
        if let Some(at) = refreshed_at {
            self.hub.last_refreshed.publish(Some(at)).map_err(closed)?;
        }
        Ok(())
    }

    /// The last published view.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            blocks: self.hub.blocks.current(),
            recent_transactions: self.hub.recent_transactions.current(),
            stats: self.hub.stats.current(),
            accounts: self.hub.accounts.current(),
            last_refreshed: self.hub.last_refreshed.current(),
        }
    }

    pub fn stats(&self) -> NetworkStats {
        self.hub.stats.current()
    }

    pub fn block_details(&self, hash: &Hash) -> Option<BlockDetails> {
        self.read(|store| store.block_details(hash))
    }

    pub fn transaction_details(&self, hash: &Hash) -> Option<TransactionDetails> {
        self.read(|store| store.transaction_details(hash))
    }

    pub fn account(&self, address: &Address) -> Option<AccountSnapshot> {
        self.read(|store| store.account(address).cloned())
    }

    pub fn close(&self) {
        self.hub.close_all();
    }
}
