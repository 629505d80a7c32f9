//! [`SyncBackend`] adapter driving the simulator against the shared ledger.

use crate::config::SimulatorConfig;
use crate::simulator::ChainSimulator;
use async_trait::async_trait;
use lx_02_distribution_hub::SharedLedger;
use lx_telemetry::metrics::time_cycle;
use parking_lot::Mutex;
use shared_types::{BackendMode, SyncBackend, SyncResult, TimestampMs};
use tracing::info;

pub struct SimulatedBackend {
    simulator: Mutex<ChainSimulator>,
    ledger: SharedLedger,
}

impl SimulatedBackend {
    pub fn new(config: SimulatorConfig, ledger: SharedLedger) -> Self {
        Self {
            simulator: Mutex::new(ChainSimulator::new(config)),
            ledger,
        }
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    /// Generate one block stamped `now` and publish the result.
    ///
    /// The simulator lock is held until publication finishes, so cycles from
    /// the schedule and from manual refreshes never interleave.
    pub fn generate_at(&self, now: TimestampMs) -> SyncResult<()> {
        let _timer = time_cycle("simulated");
        let mut simulator = self.simulator.lock();
        let stats = self.ledger.write(|store| {
            simulator.generate_next_block(store, now);
            simulator.network_stats(store, now)
        });
        self.ledger.publish(stats, Some(now))
    }

    /// Seed history ending at `now` and publish it.
    pub fn seed_at(&self, now: TimestampMs) -> SyncResult<()> {
        let mut simulator = self.simulator.lock();
        let (generated, stats) = self.ledger.write(|store| {
            let generated = simulator.seed_initial_state(store, now);
            (generated.len(), simulator.network_stats(store, now))
        });
        info!(blocks = generated, height = stats.current_height, "Seeded synthetic history");

        self.ledger.hub().set_has_more(false)?;
        self.ledger.publish(stats, Some(now))
    }
}

#[async_trait]
impl SyncBackend for SimulatedBackend {
    fn name(&self) -> &'static str {
        "simulator"
    }

    fn mode(&self) -> BackendMode {
        BackendMode::Simulated
    }

    async fn bootstrap(&self) -> SyncResult<()> {
        self.seed_at(TimestampMs::now())
    }

    async fn tick(&self) -> SyncResult<()> {
        self.generate_at(TimestampMs::now())
    }

    /// Synthetic history has no older pages.
    async fn load_more(&self) -> SyncResult<bool> {
        Ok(false)
    }

    fn has_more(&self) -> bool {
        false
    }
}
