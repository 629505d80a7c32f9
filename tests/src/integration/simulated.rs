//! # Simulated Engine Scenarios
//!
//! Seeded history, eviction under the block cap, height-based finality and
//! seed reproducibility, all driven through the public engine surface.

#[cfg(test)]
mod tests {
    use lx_01_state_store::StoreLimits;
    use lx_02_distribution_hub::SharedLedger;
    use lx_03_chain_simulator::{SimulatedBackend, SimulatorConfig};
    use proptest::prelude::*;
    use shared_types::{AtomicAmount, BlockStatus, Hash, TimestampMs};
    use sync_runtime::{EngineConfig, LedgerSyncEngine};

    fn engine(config: EngineConfig) -> LedgerSyncEngine {
        LedgerSyncEngine::new(EngineConfig {
            auto_start: false,
            ..config
        })
        .unwrap()
    }

    fn simulator(seed: u64, initial: u64, tx: u64) -> SimulatorConfig {
        SimulatorConfig {
            seed,
            initial_block_count: initial,
            tx_per_block_min: tx,
            tx_per_block_max: tx,
            ..SimulatorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_seeded_history_shape() {
        let engine = engine(EngineConfig {
            simulator: simulator(12345, 5, 3),
            ..EngineConfig::default()
        });
        engine.bootstrap().await.unwrap();

        let snapshot = engine.snapshot();
        let heights: Vec<u64> = snapshot.blocks.iter().map(|b| b.height.get()).collect();
        assert_eq!(heights, vec![1, 2, 3, 4, 5]);

        for block in &snapshot.blocks {
            assert_eq!(block.transaction_count, 3);
            let details = engine.block_details(&block.hash).unwrap();
            assert_eq!(details.transactions.len(), 3);
            let sum: AtomicAmount = details.transactions.iter().map(|tx| tx.value).sum();
            assert_eq!(block.total_value, sum);
        }

        // Every party of every transaction resolves to an account.
        for tx in &snapshot.recent_transactions {
            assert!(engine.account_snapshot(&tx.from).is_some());
            assert!(engine.account_snapshot(&tx.to).is_some());
        }
    }

    #[tokio::test]
    async fn test_eviction_to_block_cap() {
        let engine = engine(EngineConfig {
            simulator: simulator(7, 0, 2),
            store: StoreLimits::with_max_blocks(10),
            ..EngineConfig::default()
        });
        engine.bootstrap().await.unwrap();

        let mut early_blocks: Vec<Hash> = Vec::new();
        let mut early_txs: Vec<Hash> = Vec::new();
        for _ in 0..5 {
            engine.refresh_now().await.unwrap();
        }
        for block in engine.snapshot().blocks {
            let details = engine.block_details(&block.hash).unwrap();
            early_txs.extend(details.transactions.iter().map(|tx| tx.hash.clone()));
            early_blocks.push(block.hash);
        }
        assert_eq!(early_blocks.len(), 5);

        for _ in 0..10 {
            engine.refresh_now().await.unwrap();
        }

        let snapshot = engine.snapshot();
        let heights: Vec<u64> = snapshot.blocks.iter().map(|b| b.height.get()).collect();
        assert_eq!(heights, (6..=15).collect::<Vec<_>>());
        for hash in &early_blocks {
            assert!(engine.block_details(hash).is_none());
        }
        for hash in &early_txs {
            assert!(engine.transaction_details(hash).is_none());
            assert!(snapshot.recent_transactions.iter().all(|tx| &tx.hash != hash));
        }
        for account in &snapshot.accounts {
            assert!(account.recent_blocks.iter().all(|h| !early_blocks.contains(h)));
        }
    }

    #[tokio::test]
    async fn test_finality_threshold() {
        let engine = engine(EngineConfig {
            finality_lag: 3,
            simulator: simulator(99, 10, 1),
            ..EngineConfig::default()
        });
        engine.bootstrap().await.unwrap();

        let snapshot = engine.snapshot();
        for block in &snapshot.blocks {
            let expected = if block.height.get() <= 7 {
                BlockStatus::Finalized
            } else {
                BlockStatus::Pending
            };
            assert_eq!(block.status, expected, "height {}", block.height.get());
        }
        assert_eq!(snapshot.stats.finalized_height, 7);

        // Finalized blocks stay finalized as the tip moves.
        engine.refresh_now().await.unwrap();
        let after = engine.snapshot();
        assert!(after
            .blocks
            .iter()
            .filter(|b| b.height.get() <= 8)
            .all(|b| b.status == BlockStatus::Finalized));
    }

    #[tokio::test]
    async fn test_same_seed_same_history() {
        let run = || {
            let backend = SimulatedBackend::new(
                simulator(2024, 6, 4),
                SharedLedger::new(StoreLimits::default()),
            );
            let base = TimestampMs::new(1_700_000_000_000);
            backend.seed_at(base).unwrap();
            for i in 1..=4 {
                backend.generate_at(base.saturating_add_ms(i * 4_000)).unwrap();
            }
            backend
        };

        let a = run();
        let b = run();
        assert_eq!(a.ledger().snapshot(), b.ledger().snapshot());
        assert_eq!(a.ledger().stats().current_height, 10);
    }

    #[tokio::test]
    async fn test_long_run_with_two_accounts() {
        let engine = engine(EngineConfig {
            simulator: SimulatorConfig {
                account_pool_size: 2,
                ..simulator(5, 24, 12)
            },
            ..EngineConfig::default()
        });
        engine.bootstrap().await.unwrap();
        for _ in 0..50 {
            engine.refresh_now().await.unwrap();
        }

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.blocks.len(), 74);
        for pair in snapshot.blocks.windows(2) {
            assert_eq!(pair[1].height.get(), pair[0].height.get() + 1);
        }
        // Two accounts: every transfer goes between them, the miner is one of them.
        assert_eq!(snapshot.accounts.len(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Whatever the seed and cap, every published cycle is a contiguous
        /// bounded window whose details resolve, and heights only grow.
        #[test]
        fn prop_published_cycles_stay_consistent(
            seed in any::<u64>(),
            max_blocks in 3usize..40,
            initial in 0u64..10,
            ticks in 1u64..30,
        ) {
            let backend = SimulatedBackend::new(
                SimulatorConfig {
                    initial_block_count: initial.min(max_blocks as u64),
                    ..simulator(seed, 0, 3)
                },
                SharedLedger::new(StoreLimits::with_max_blocks(max_blocks)),
            );
            let ledger = backend.ledger();
            let base = TimestampMs::new(1_700_000_000_000);
            backend.seed_at(base).unwrap();

            let mut last = ledger.stats();
            for i in 1..=ticks {
                backend.generate_at(base.saturating_add_ms(i * 4_000)).unwrap();
                let snapshot = ledger.snapshot();

                prop_assert!(snapshot.blocks.len() <= max_blocks);
                for pair in snapshot.blocks.windows(2) {
                    prop_assert_eq!(pair[1].height.get(), pair[0].height.get() + 1);
                }
                prop_assert_eq!(
                    snapshot.blocks.last().map(|b| b.height.get()),
                    Some(snapshot.stats.current_height)
                );
                prop_assert!(snapshot.stats.current_height > last.current_height);
                prop_assert!(snapshot.stats.finalized_height >= last.finalized_height);
                for tx in &snapshot.recent_transactions {
                    prop_assert!(ledger.transaction_details(&tx.hash).is_some());
                }
                last = snapshot.stats;
            }
        }
    }
}
