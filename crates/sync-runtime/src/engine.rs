//! # Ledger Sync Engine
//!
//! The explicit context object owning the store, the hub and the active
//! backend. Built once at startup; its owner calls `bootstrap`, `start`,
//! `stop` and `dispose`.
//!
//! ## Lifecycle
//!
//! ```text
//! new ──→ bootstrap ──→ start ⇄ stop ──→ dispose
//!           │             │
//!           │             └─ interval loop: backend.tick() every block_interval
//!           └─ seed history (simulated) / first poll (live)
//! ```
//!
//! `refresh_now` runs one cycle immediately and leaves the schedule alone.

use crate::config::EngineConfig;
use lx_02_distribution_hub::{SharedLedger, StateHub};
use lx_03_chain_simulator::SimulatedBackend;
use lx_04_node_client::{HttpNodeClient, NodeApi};
use lx_05_live_sync::{HydratedBalance, LiveSyncBackend};
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::{
    AccountSnapshot, Address, BackendMode, BlockDetails, Hash, LedgerSnapshot, NetworkStats,
    SyncBackend, SyncError, SyncResult, TransactionDetails,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// A running schedule.
struct Schedule {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct LedgerSyncEngine {
    config: EngineConfig,
    ledger: SharedLedger,
    backend: Arc<dyn SyncBackend>,
    /// Present in live mode only.
    live: Option<Arc<LiveSyncBackend>>,
    schedule: Mutex<Option<Schedule>>,
    bootstrapped: AtomicBool,
    disposed: AtomicBool,
}

impl LedgerSyncEngine {
    /// Validate `config` and build the store, hub and backend.
    ///
    /// In live mode this also builds the HTTP client for `live.node_url`.
    pub fn new(config: EngineConfig) -> SyncResult<Self> {
        config.validate()?;
        let node: Option<Arc<dyn NodeApi>> = match config.mode {
            BackendMode::Simulated => None,
            BackendMode::Live => {
                let live = config.live_config();
                let client = HttpNodeClient::new(&live.node_url, live.request_timeout())?;
                Some(Arc::new(client))
            }
        };
        Self::build(config, node)
    }

    /// Build a live engine on top of an existing node connection.
    pub fn with_node(config: EngineConfig, node: Arc<dyn NodeApi>) -> SyncResult<Self> {
        config.validate()?;
        let config = EngineConfig {
            mode: BackendMode::Live,
            ..config
        };
        Self::build(config, Some(node))
    }

    fn build(config: EngineConfig, node: Option<Arc<dyn NodeApi>>) -> SyncResult<Self> {
        let ledger = SharedLedger::new(config.store.clone());

        let (backend, live) = match node {
            Some(node) => {
                let live = Arc::new(LiveSyncBackend::new(
                    config.live_config(),
                    node,
                    ledger.clone(),
                ));
                (Arc::clone(&live) as Arc<dyn SyncBackend>, Some(live))
            }
            None => {
                let simulated = SimulatedBackend::new(config.simulator_config(), ledger.clone());
                (Arc::new(simulated) as Arc<dyn SyncBackend>, None)
            }
        };

        info!(
            mode = config.mode.as_str(),
            backend = backend.name(),
            max_blocks = config.store.max_blocks,
            interval_ms = config.block_interval_ms,
            "Ledger sync engine created"
        );

        Ok(Self {
            config,
            ledger,
            backend,
            live,
            schedule: Mutex::new(None),
            bootstrapped: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    fn ensure_open(&self) -> SyncResult<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(SyncError::Closed);
        }
        Ok(())
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Establish the baseline history, then start the schedule when
    /// `auto_start` is set. Only the first call does anything.
    pub async fn bootstrap(&self) -> SyncResult<()> {
        self.ensure_open()?;
        if self.bootstrapped.swap(true, Ordering::AcqRel) {
            debug!("Engine already bootstrapped");
            return Ok(());
        }

        self.backend.bootstrap().await?;
        let stats = self.ledger.stats();
        info!(
            backend = self.backend.name(),
            height = stats.current_height,
            finalized = stats.finalized_height,
            "Bootstrap complete"
        );

        if self.config.auto_start {
            self.start()?;
        }
        Ok(())
    }

    /// Start the periodic schedule. Calling it while running is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> SyncResult<()> {
        self.ensure_open()?;
        let mut schedule = self.schedule.lock();
        if schedule.is_some() {
            debug!("Schedule already running");
            return Ok(());
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_schedule(
            Arc::clone(&self.backend),
            self.config.block_interval(),
            shutdown_rx,
        ));
        *schedule = Some(Schedule {
            shutdown_tx,
            handle,
        });

        info!(
            backend = self.backend.name(),
            interval_ms = self.config.block_interval_ms,
            "Schedule started"
        );
        Ok(())
    }

    /// Cancel the schedule and wait for the loop to exit. No-op when stopped.
    pub async fn stop(&self) {
        let running = self.schedule.lock().take();
        let Some(schedule) = running else {
            return;
        };

        if schedule.shutdown_tx.send(true).is_err() {
            debug!("Schedule loop already gone");
        }
        if let Err(e) = schedule.handle.await {
            error!(error = %e, "Schedule loop panicked");
        }
        info!(backend = self.backend.name(), "Schedule stopped");
    }

    pub fn is_running(&self) -> bool {
        self.schedule.lock().is_some()
    }

    /// Stop the schedule and close every channel. Further use fails with
    /// [`SyncError::Closed`].
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.stop().await;
        self.ledger.close();
        info!("Ledger sync engine disposed");
    }

    /// Run one cycle now without resetting the schedule.
    pub async fn refresh_now(&self) -> SyncResult<()> {
        self.ensure_open()?;
        self.backend.tick().await
    }

    /// Append one older page. Always `false` in simulated mode.
    pub async fn load_more_blocks(&self) -> SyncResult<bool> {
        self.ensure_open()?;
        self.backend.load_more().await
    }

    pub fn has_more(&self) -> bool {
        self.backend.has_more()
    }

    // =========================================================================
    // READS (cache only, never touch the network)
    // =========================================================================

    pub fn hub(&self) -> &StateHub {
        self.ledger.hub()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub fn stats(&self) -> NetworkStats {
        self.ledger.stats()
    }

    pub fn block_details(&self, hash: &Hash) -> Option<BlockDetails> {
        self.ledger.block_details(hash)
    }

    pub fn transaction_details(&self, hash: &Hash) -> Option<TransactionDetails> {
        self.ledger.transaction_details(hash)
    }

    pub fn account_snapshot(&self, address: &Address) -> Option<AccountSnapshot> {
        self.ledger.account(address)
    }

    // =========================================================================
    // PASS-THROUGH (uncached, live mode only)
    // =========================================================================

    fn node(&self, operation: &'static str) -> SyncResult<&Arc<dyn NodeApi>> {
        self.ensure_open()?;
        self.live
            .as_ref()
            .map(|live| live.node())
            .ok_or(SyncError::NotAvailable {
                operation,
                mode: self.mode().as_str(),
            })
    }

    /// Fetch one balance from the node and fold it into the published
    /// accounts.
    pub async fn hydrate_account(&self, address: &Address) -> SyncResult<HydratedBalance> {
        self.ensure_open()?;
        let live = self.live.as_ref().ok_or(SyncError::NotAvailable {
            operation: "hydrate_account",
            mode: self.mode().as_str(),
        })?;
        live.hydrate_account(address).await
    }

    pub async fn get_transaction(&self, tx_id: &Hash) -> SyncResult<Value> {
        Ok(self.node("get_transaction")?.get_transaction(tx_id).await?)
    }

    pub async fn get_transaction_history(
        &self,
        address: &Address,
        limit: u32,
        cursor: Option<&str>,
    ) -> SyncResult<Value> {
        Ok(self
            .node("get_transaction_history")?
            .get_transaction_history(address, limit, cursor)
            .await?)
    }

    pub async fn get_balance(&self, address: &Address) -> SyncResult<Value> {
        Ok(self.node("get_balance")?.get_balance(address).await?)
    }

    pub async fn get_staking_info(&self, address: &Address) -> SyncResult<Value> {
        Ok(self.node("get_staking_info")?.get_staking_info(address).await?)
    }

    pub async fn get_privacy_pool(&self) -> SyncResult<Value> {
        Ok(self.node("get_privacy_pool")?.get_privacy_pool().await?)
    }

    pub async fn get_governance_proposals(&self) -> SyncResult<Value> {
        Ok(self
            .node("get_governance_proposals")?
            .get_governance_proposals()
            .await?)
    }

    pub async fn get_treasury(&self) -> SyncResult<Value> {
        Ok(self.node("get_treasury")?.get_treasury().await?)
    }

    pub async fn get_tokens(&self) -> SyncResult<Value> {
        Ok(self.node("get_tokens")?.get_tokens().await?)
    }

    pub async fn get_contract_code(&self, address: &Address) -> SyncResult<Value> {
        Ok(self.node("get_contract_code")?.get_contract_code(address).await?)
    }

    pub async fn get_contract_abi(&self, address: &Address) -> SyncResult<Value> {
        Ok(self.node("get_contract_abi")?.get_contract_abi(address).await?)
    }

    pub async fn get_events(&self, limit: u32) -> SyncResult<Value> {
        Ok(self.node("get_events")?.get_events(limit).await?)
    }

    pub async fn get_analytics(&self) -> SyncResult<Value> {
        Ok(self.node("get_analytics")?.get_analytics().await?)
    }

    pub async fn get_chain_params(&self) -> SyncResult<Value> {
        Ok(self.node("get_chain_params")?.get_chain_params().await?)
    }

    pub async fn get_nodes(&self) -> SyncResult<Value> {
        Ok(self.node("get_nodes")?.get_nodes().await?)
    }

    pub async fn get_bridge_history(
        &self,
        address: Option<&Address>,
        limit: u32,
    ) -> SyncResult<Value> {
        Ok(self
            .node("get_bridge_history")?
            .get_bridge_history(address, limit)
            .await?)
    }

    pub async fn get_bridge_stats(&self) -> SyncResult<Value> {
        Ok(self.node("get_bridge_stats")?.get_bridge_stats().await?)
    }
}

/// Tick `backend` every `period` until `shutdown_rx` flips or the hub closes.
///
/// The first tick fires one period after start; bootstrap already covered
/// time zero.
impl Drop for LedgerSyncEngine {
    /// Signal a running schedule to exit. The loop is not awaited here; it
    /// ends on its next poll and releases its backend handle.
    fn drop(&mut self) {
        if let Some(schedule) = self.schedule.get_mut().take() {
            let _ = schedule.shutdown_tx.send(true);
            debug!("Engine dropped with schedule running");
        }
    }
}

async fn run_schedule(
    backend: Arc<dyn SyncBackend>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match backend.tick().await {
                    Ok(()) => {}
                    Err(SyncError::Closed) => {
                        warn!(backend = backend.name(), "Channels closed, schedule exiting");
                        break;
                    }
                    Err(e) => error!(backend = backend.name(), error = %e, "Scheduled cycle failed"),
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
}
