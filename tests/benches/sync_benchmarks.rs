//! # Ledger-Sync Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | simulator | one generated block at steady state (eviction active) |
//! | store | wholesale window replacement with a full page |
//! | hub | one publication of the full snapshot |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lx_01_state_store::{BoundedStateStore, StoreLimits, StoreWindow, WindowBlock};
use lx_02_distribution_hub::SharedLedger;
use lx_03_chain_simulator::{ChainSimulator, SimulatorConfig};
use shared_types::TimestampMs;
use std::time::Duration;

const BASE_MS: u64 = 1_700_000_000_000;

/// A store already at its block cap.
fn full_store(max_blocks: usize) -> (ChainSimulator, BoundedStateStore, u64) {
    let mut simulator = ChainSimulator::new(SimulatorConfig {
        initial_block_count: max_blocks as u64,
        ..SimulatorConfig::default()
    });
    let mut store = BoundedStateStore::new(StoreLimits::with_max_blocks(max_blocks));
    simulator.seed_initial_state(&mut store, TimestampMs::new(BASE_MS));
    (simulator, store, BASE_MS)
}

fn bench_generate_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator");
    group.measurement_time(Duration::from_secs(5));

    for max_blocks in [24usize, 120, 500] {
        let (mut simulator, mut store, mut now) = full_store(max_blocks);
        group.bench_with_input(
            BenchmarkId::new("generate_next_block", max_blocks),
            &max_blocks,
            |b, _| {
                b.iter(|| {
                    now += 4_000;
                    black_box(simulator.generate_next_block(&mut store, TimestampMs::new(now)))
                })
            },
        );
    }
    group.finish();
}

fn bench_replace_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for page in [25usize, 100] {
        let (_, source, _) = full_store(page);
        let window: Vec<WindowBlock> = source
            .blocks_ascending()
            .iter()
            .filter_map(|b| source.block_by_height(b.height))
            .map(|details| WindowBlock {
                details: details.clone(),
                transactions: details
                    .transactions
                    .iter()
                    .filter_map(|tx| source.transaction_details(&tx.hash))
                    .collect(),
            })
            .collect();
        let tip = source.current_height();

        group.throughput(Throughput::Elements(page as u64));
        group.bench_with_input(BenchmarkId::new("replace_window", page), &page, |b, _| {
            let mut store = BoundedStateStore::new(StoreLimits::default());
            b.iter(|| {
                store.replace_window(StoreWindow {
                    blocks: window.clone(),
                    current_height: tip,
                });
                black_box(store.block_count())
            })
        });
    }
    group.finish();
}

fn bench_publish(c: &mut Criterion) {
    let ledger = SharedLedger::new(StoreLimits::default());
    let mut simulator = ChainSimulator::new(SimulatorConfig::default());
    let now = TimestampMs::new(BASE_MS);
    let stats = ledger.write(|store| {
        simulator.seed_initial_state(store, now);
        simulator.network_stats(store, now)
    });

    c.bench_function("hub/publish_snapshot", |b| {
        b.iter(|| ledger.publish(black_box(stats.clone()), Some(now)))
    });
}

criterion_group!(benches, bench_generate_block, bench_replace_window, bench_publish);
criterion_main!(benches);
