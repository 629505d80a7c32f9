//! Live Sync Backend
//!
//! Polls a node for the newest page of blocks and swaps it into the store
//! wholesale; pages older history on request.
//!
//! ```text
//! refresh_from_node                       load_more_blocks
//!   ├─ busy? ──→ Skipped                    ├─ busy / no cursor / full ──→ false
//!   ├─ get_blocks(page, tip)                ├─ get_blocks(page, cursor)
//!   ├─ /health (best effort)                ├─ keep heights below the oldest held
//!   ├─ map + sort ascending                 ├─ truncate to remaining capacity
//!   ├─ replace window, rebuild accounts     ├─ append at the old end
//!   └─ publish (+ last_refreshed)           └─ publish
//! ```
//!
//! Any failure leaves the published state exactly as it was.

use crate::busy::BusyGuard;
use crate::config::LiveSyncConfig;
use crate::mapper::map_page;
use async_trait::async_trait;
use lx_01_state_store::{average_throughput, ActivityOrder, BoundedStateStore, StoreWindow, WindowBlock};
use lx_02_distribution_hub::{BusyFlag, SharedLedger};
use lx_04_node_client::{HealthStatus, NodeApi};
use lx_telemetry::metrics::time_cycle;
use lx_telemetry::{PAGES_LOADED, POLLS};
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::{
    AccountSnapshot, Address, AtomicAmount, BackendMode, BlockDetails, NetworkStats, SyncBackend,
    SyncError, SyncResult, TimestampMs, TransactionSummary, ValidationError,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a refresh attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New window published.
    Refreshed,
    /// Another refresh was in flight; nothing done.
    Skipped,
    /// The poll failed; previous state kept.
    Failed,
}

/// Balance learned through `get_balance`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HydratedBalance {
    pub balance: AtomicAmount,
    pub staked: Option<AtomicAmount>,
}

#[derive(Default)]
struct PollState {
    /// Height the next older page starts from.
    cursor: Option<u64>,
    health: Option<HealthStatus>,
}

pub struct LiveSyncBackend {
    config: LiveSyncConfig,
    node: Arc<dyn NodeApi>,
    ledger: SharedLedger,
    refreshing: AtomicBool,
    loading_more: AtomicBool,
    state: Mutex<PollState>,
    balances: Mutex<HashMap<Address, HydratedBalance>>,
}

impl LiveSyncBackend {
    pub fn new(config: LiveSyncConfig, node: Arc<dyn NodeApi>, ledger: SharedLedger) -> Self {
        Self {
            config,
            node,
            ledger,
            refreshing: AtomicBool::new(false),
            loading_more: AtomicBool::new(false),
            state: Mutex::new(PollState::default()),
            balances: Mutex::new(HashMap::new()),
        }
    }

    pub fn node(&self) -> &Arc<dyn NodeApi> {
        &self.node
    }

    pub fn cursor(&self) -> Option<u64> {
        self.state.lock().cursor
    }

    /// Poll the newest page and replace the window with it.
    ///
    /// A call arriving while another is in flight returns
    /// [`RefreshOutcome::Skipped`] without touching the node.
    pub async fn refresh_from_node(&self) -> RefreshOutcome {
        let Some(_busy) =
            BusyGuard::acquire(&self.refreshing, self.ledger.hub(), BusyFlag::Refreshing)
        else {
            POLLS.with_label_values(&["skipped"]).inc();
            debug!("Refresh already in flight");
            return RefreshOutcome::Skipped;
        };
        let _timer = time_cycle("live");

        match self.poll_latest().await {
            Ok(()) => {
                POLLS.with_label_values(&["success"]).inc();
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                POLLS.with_label_values(&["failure"]).inc();
                warn!(node = %self.config.node_url, error = %e, "Refresh failed, keeping previous state");
                RefreshOutcome::Failed
            }
        }
    }

    async fn poll_latest(&self) -> SyncResult<()> {
        let page = self.node.get_blocks(self.config.page_size, None).await?;
        let health = match self.node.health().await {
            Ok(health) => Some(health),
            Err(e) => {
                debug!(error = %e, "Health probe failed");
                None
            }
        };

        let tip = page.blocks.iter().map(|b| b.height).max().unwrap_or(0);
        let blocks = map_page(&page.blocks, tip, self.config.finality_lag);
        let balances = self.balances.lock().clone();
        let now = TimestampMs::now();

        let (retained, stats) = self.ledger.write(|store| {
            store.replace_window(StoreWindow {
                blocks,
                current_height: tip,
            });
            // Accounts are rebuilt from what survived the bound.
            let activity: Vec<BlockDetails> = store
                .blocks_ascending()
                .iter()
                .filter_map(|b| store.block_by_height(b.height).cloned())
                .collect();
            for block in &activity {
                index_activity(store, block, ActivityOrder::Newest);
            }
            apply_balances(store, &balances);
            (activity.len(), self.derive_stats(store, health.as_ref(), now))
        });

        {
            let mut state = self.state.lock();
            state.cursor = page.next_cursor;
            state.health = health;
        }
        self.ledger.hub().set_has_more(page.next_cursor.is_some())?;
        self.ledger.publish(stats, Some(now))?;

        info!(
            height = tip,
            blocks = retained,
            has_more = page.next_cursor.is_some(),
            "Refreshed from node"
        );
        Ok(())
    }

    /// Append one older page to the tail of history.
    ///
    /// Returns `false` with no state change when another load is in flight,
    /// the cursor is exhausted, the store is full, the page is empty or the
    /// request fails.
    pub async fn load_more_blocks(&self) -> bool {
        let Some(_busy) =
            BusyGuard::acquire(&self.loading_more, self.ledger.hub(), BusyFlag::LoadingMore)
        else {
            debug!("Load-more already in flight");
            return false;
        };

        let Some(cursor) = self.cursor() else {
            debug!("No older page to load");
            return false;
        };
        if self.ledger.read(BoundedStateStore::remaining_capacity) == 0 {
            debug!("Store at capacity, not loading older blocks");
            return false;
        }

        match self.append_page(cursor).await {
            Ok(appended) => appended > 0,
            Err(e) => {
                warn!(cursor, error = %e, "Loading older blocks failed");
                false
            }
        }
    }

    async fn append_page(&self, cursor: u64) -> SyncResult<usize> {
        let page = self
            .node
            .get_blocks(self.config.page_size, Some(cursor))
            .await?;

        // Read after the await: a refresh may have replaced the window meanwhile.
        let (tip, oldest, capacity) = self.ledger.read(|store| {
            (
                store.current_height(),
                store.oldest_height(),
                store.remaining_capacity(),
            )
        });
        let page_tip = page.blocks.iter().map(|b| b.height).max().unwrap_or(0);

        let mut older: Vec<WindowBlock> = map_page(&page.blocks, tip.max(page_tip), self.config.finality_lag)
            .into_iter()
            .filter(|b| oldest.map_or(true, |o| b.details.height().get() < o))
            .collect();
        // Newest first so each block lands directly below the current oldest.
        older.reverse();
        older.truncate(capacity);
        if older.is_empty() {
            debug!(cursor, "Older page had nothing to append");
            return Ok(0);
        }

        let balances = self.balances.lock().clone();
        let health = self.state.lock().health.clone();
        let now = TimestampMs::now();

        let (appended, stats) = self.ledger.write(|store| {
            let mut appended = 0;
            for block in older {
                let details = block.details.clone();
                if store.append_older_block(block) {
                    index_activity(store, &details, ActivityOrder::Oldest);
                    appended += 1;
                }
            }
            apply_balances(store, &balances);
            (appended, self.derive_stats(store, health.as_ref(), now))
        });

        self.state.lock().cursor = page.next_cursor;
        self.ledger.hub().set_has_more(page.next_cursor.is_some())?;
        self.ledger.publish(stats, None)?;
        PAGES_LOADED.inc();

        info!(cursor, appended, next_cursor = ?page.next_cursor, "Loaded older blocks");
        Ok(appended)
    }

    /// Fetch one account's balance and fold it into the published accounts.
    pub async fn hydrate_account(&self, address: &Address) -> SyncResult<HydratedBalance> {
        let value = self.node.get_balance(address).await?;
        let hydrated = parse_balance(&value)?;
        self.balances.lock().insert(address.clone(), hydrated);

        let updated = self.ledger.write(|store| match store.account_mut(address) {
            Some(account) => {
                apply_balance(account, hydrated);
                true
            }
            None => false,
        });
        if updated {
            self.ledger.publish(self.ledger.stats(), None)?;
        }
        Ok(hydrated)
    }

    fn derive_stats(
        &self,
        store: &BoundedStateStore,
        health: Option<&HealthStatus>,
        now: TimestampMs,
    ) -> NetworkStats {
        let window = store.recent_blocks(usize::MAX);
        let active_validators = health
            .and_then(HealthStatus::active_validators)
            .unwrap_or_else(|| {
                let miners: HashSet<_> = window.iter().map(|b| &b.miner).collect();
                miners.len() as u32
            });

        NetworkStats {
            current_height: store.current_height(),
            finalized_height: store.finalized_height(),
            avg_throughput: average_throughput(&window, self.config.block_interval_ms),
            active_validators,
            time_to_next_election_ms: health.and_then(|h| h.epoch_remaining_ms).unwrap_or(0),
            timestamp: now,
        }
    }
}

/// Record a block's miner and transfers in the account activity lists.
/// Each outgoing transfer bumps the sender's nonce.
fn index_activity(store: &mut BoundedStateStore, block: &BlockDetails, order: ActivityOrder) {
    let summary = &block.summary;
    store.record_mined_block(&summary.miner, &summary.hash, summary.timestamp, order);

    let transfers: Box<dyn Iterator<Item = &TransactionSummary>> = match order {
        ActivityOrder::Newest => Box::new(block.transactions.iter()),
        ActivityOrder::Oldest => Box::new(block.transactions.iter().rev()),
    };
    for tx in transfers {
        store.record_activity(tx, order);
        if let Some(sender) = store.account_mut(&tx.from) {
            sender.nonce += 1;
        }
    }
}

fn apply_balances(store: &mut BoundedStateStore, balances: &HashMap<Address, HydratedBalance>) {
    for (address, hydrated) in balances {
        if let Some(account) = store.account_mut(address) {
            apply_balance(account, *hydrated);
        }
    }
}

fn apply_balance(account: &mut AccountSnapshot, hydrated: HydratedBalance) {
    account.balance = hydrated.balance;
    if let Some(staked) = hydrated.staked {
        account.staked = staked;
    }
}

/// `get_balance` answers either a bare amount or `{ balance, staked? }`.
fn parse_balance(value: &Value) -> Result<HydratedBalance, ValidationError> {
    match value {
        Value::Object(fields) => {
            let balance = fields
                .get("balance")
                .ok_or_else(|| ValidationError::MalformedPayload {
                    reason: "get_balance result has no `balance`".into(),
                })
                .and_then(AtomicAmount::from_json)?;
            let staked = fields
                .get("staked")
                .map(AtomicAmount::from_json)
                .transpose()?;
            Ok(HydratedBalance { balance, staked })
        }
        other => Ok(HydratedBalance {
            balance: AtomicAmount::from_json(other)?,
            staked: None,
        }),
    }
}

#[async_trait]
impl SyncBackend for LiveSyncBackend {
    fn name(&self) -> &'static str {
        "live-sync"
    }

    fn mode(&self) -> BackendMode {
        BackendMode::Live
    }

    /// The first poll. A failure is logged and the engine starts empty.
    async fn bootstrap(&self) -> SyncResult<()> {
        self.tick().await
    }

    async fn tick(&self) -> SyncResult<()> {
        match self.refresh_from_node().await {
            RefreshOutcome::Failed if self.ledger.hub().is_closed() => Err(SyncError::Closed),
            _ => Ok(()),
        }
    }

    async fn load_more(&self) -> SyncResult<bool> {
        Ok(self.load_more_blocks().await)
    }

    fn has_more(&self) -> bool {
        self.cursor().is_some()
    }
}
