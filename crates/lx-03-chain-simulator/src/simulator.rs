//! The synthetic chain.
//!
//! Pure domain logic: the simulator owns its generator, account pool and
//! committee schedule, and writes into a [`BoundedStateStore`] handed in by
//! the caller. Nothing here touches the hub or the clock.

use crate::committee::CommitteeSchedule;
use crate::config::SimulatorConfig;
use crate::rng::DeterministicRng;
use lx_01_state_store::{
    average_throughput, ActivityOrder, BoundedStateStore, WindowBlock, THROUGHPUT_WINDOW,
};
use lx_telemetry::{log_block_event, BLOCKS_GENERATED};
use sha2::{Digest, Sha256};
use shared_types::{
    AccountSnapshot, Address, AtomicAmount, BlockDetails, BlockStatus, BlockSummary, Hash, Height,
    NetworkStats, TimestampMs, TransactionDetails, TransactionStatus, TransactionSummary,
    ATOMIC_UNITS_PER_COIN, COMMITTEE_SIZE,
};

const MEMOS: &[&str] = &[
    "payroll",
    "invoice settlement",
    "stake top-up",
    "treasury grant",
    "bridge transfer",
    "rebalance",
];

/// Probability that a generated transaction carries a memo.
const MEMO_PROBABILITY: f64 = 0.25;

pub struct ChainSimulator {
    config: SimulatorConfig,
    rng: DeterministicRng,
    /// Initial state of every pool account, in draw order.
    pool: Vec<AccountSnapshot>,
    committee: CommitteeSchedule,
    height: Option<Height>,
    last_hash: Option<Hash>,
}

impl ChainSimulator {
    /// Draw the account pool and the first committee from `config.seed`.
    pub fn new(config: SimulatorConfig) -> Self {
        let mut rng = DeterministicRng::new(config.seed);

        let pool = (0..config.account_pool_size)
            .map(|_| {
                let address = rng.next_address();
                AccountSnapshot {
                    balance: AtomicAmount::from_coins(rng.next_int(50, 500)),
                    staked: AtomicAmount::from_coins(rng.next_int(0, 100)),
                    reputation: rng.next_int(60, 100) as u8,
                    ..AccountSnapshot::empty(address, TimestampMs::default())
                }
            })
            .collect();
        let committee = CommitteeSchedule::new(&mut rng);

        Self {
            config,
            rng,
            pool,
            committee,
            height: None,
            last_hash: None,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn current_height(&self) -> Option<Height> {
        self.height
    }

    /// Insert the pool accounts and generate `initial_block_count` blocks
    /// back-dated at fixed intervals before `now`.
    ///
    /// Returns the generated block summaries.
    pub fn seed_initial_state(
        &mut self,
        store: &mut BoundedStateStore,
        now: TimestampMs,
    ) -> Vec<BlockSummary> {
        for account in &self.pool {
            let mut account = account.clone();
            account.last_seen = now;
            store.insert_account(account);
        }

        let count = self.config.initial_block_count;
        let interval = self.config.block_interval_ms;
        (1..=count)
            .map(|i| {
                let back = (count - i + 1).saturating_mul(interval);
                self.generate_next_block(store, now.saturating_sub_ms(back))
            })
            .collect()
    }

    /// Produce one block at `timestamp`, apply it and recompute finality.
    pub fn generate_next_block(
        &mut self,
        store: &mut BoundedStateStore,
        timestamp: TimestampMs,
    ) -> BlockSummary {
        let height = self.height.map_or(Height::GENESIS, Height::next);
        self.committee.maybe_rotate(&mut self.rng, height.get());

        let miner_index = self.rng.next_int(0, self.pool.len() as u64 - 1) as usize;
        let miner = self.pool_address(miner_index);
        let tx_count = self
            .rng
            .next_int(self.config.tx_per_block_min, self.config.tx_per_block_max);

        let drafts: Vec<TxDraft> = (0..tx_count).map(|_| self.draft_transaction()).collect();
        let hash = block_hash(self.last_hash.as_ref(), height, timestamp, &miner, &drafts);

        let transactions: Vec<TransactionDetails> = drafts
            .into_iter()
            .map(|draft| draft.into_details(&hash, height, timestamp))
            .collect();

        for tx in &transactions {
            apply_transfer(store, &tx.summary, &miner);
            store.record_activity(&tx.summary, ActivityOrder::Newest);
        }
        store.record_mined_block(&miner, &hash, timestamp, ActivityOrder::Newest);

        let summary = BlockSummary {
            height,
            hash: hash.clone(),
            parent_hash: self.last_hash.clone(),
            timestamp,
            transaction_count: transactions.len() as u32,
            total_value: transactions.iter().map(|tx| tx.summary.value).sum(),
            status: BlockStatus::Pending,
            confirmations: 1,
            miner,
            committee: self.committee.active().to_vec(),
        };
        let details = BlockDetails {
            summary: summary.clone(),
            transactions: transactions.iter().map(|tx| tx.summary.clone()).collect(),
        };

        store.insert_block(WindowBlock {
            details,
            transactions,
        });
        store.apply_height_finality(self.config.finality_lag);

        self.height = Some(height);
        self.last_hash = Some(hash.clone());
        BLOCKS_GENERATED.inc();
        log_block_event!(
            debug,
            "simulator",
            "Generated block",
            height.get(),
            hash,
            transactions = summary.transaction_count
        );

        summary
    }

    /// Derive statistics from the store contents.
    pub fn network_stats(&self, store: &BoundedStateStore, now: TimestampMs) -> NetworkStats {
        let window = store.recent_blocks(THROUGHPUT_WINDOW);
        let current_height = store.current_height();
        NetworkStats {
            current_height,
            finalized_height: store.finalized_height(),
            avg_throughput: average_throughput(&window, self.config.block_interval_ms),
            active_validators: COMMITTEE_SIZE as u32,
            time_to_next_election_ms: self
                .committee
                .time_to_next_election_ms(current_height, self.config.block_interval_ms),
            timestamp: now,
        }
    }

    fn pool_address(&self, index: usize) -> Address {
        self.pool[index % self.pool.len()].address.clone()
    }

    fn draft_transaction(&mut self) -> TxDraft {
        let last = self.pool.len() as u64 - 1;
        let sender = self.rng.next_int(0, last) as usize;
        let mut recipient = self.rng.next_int(0, last) as usize;
        if recipient == sender {
            recipient = (recipient + 1) % self.pool.len();
        }

        let value = AtomicAmount::from_coins(self.rng.next_int(1, 2_500))
            .saturating_add(AtomicAmount::new(self.rng.next_int(0, ATOMIC_UNITS_PER_COIN - 1)));
        let fee = AtomicAmount::new(self.rng.next_int(100, 5_000));
        let memo = if self.rng.chance(MEMO_PROBABILITY) {
            self.rng.pick_one(MEMOS).ok().map(|m| (*m).to_string())
        } else {
            None
        };
        let inputs = (0..self.rng.next_int(1, 2)).map(|_| self.rng.next_hash()).collect();
        let outputs = (0..self.rng.next_int(1, 2)).map(|_| self.rng.next_hash()).collect();

        TxDraft {
            hash: self.rng.next_hash(),
            from: self.pool_address(sender),
            to: self.pool_address(recipient),
            value,
            fee,
            memo,
            inputs,
            outputs,
        }
    }
}

/// A transaction before its block hash is known.
struct TxDraft {
    hash: Hash,
    from: Address,
    to: Address,
    value: AtomicAmount,
    fee: AtomicAmount,
    memo: Option<String>,
    inputs: Vec<Hash>,
    outputs: Vec<Hash>,
}

impl TxDraft {
    fn into_details(self, block_hash: &Hash, height: Height, timestamp: TimestampMs) -> TransactionDetails {
        TransactionDetails {
            summary: TransactionSummary {
                hash: self.hash,
                block_hash: block_hash.clone(),
                block_height: height,
                from: self.from,
                to: self.to,
                value: self.value,
                fee: self.fee,
                timestamp,
                status: TransactionStatus::Confirmed,
                memo: self.memo,
            },
            inputs: self.inputs,
            outputs: self.outputs,
            confirmations: 1,
        }
    }
}

/// Sender pays value plus fee (clamped at zero), recipient gains value,
/// miner gains fee.
fn apply_transfer(store: &mut BoundedStateStore, tx: &TransactionSummary, miner: &Address) {
    let sender = store.touch_account(&tx.from, tx.timestamp);
    sender.balance = sender
        .balance
        .saturating_sub(tx.value.saturating_add(tx.fee));
    sender.nonce += 1;

    let recipient = store.touch_account(&tx.to, tx.timestamp);
    recipient.balance = recipient.balance.saturating_add(tx.value);

    let miner = store.touch_account(miner, tx.timestamp);
    miner.balance = miner.balance.saturating_add(tx.fee);
}

fn block_hash(
    parent: Option<&Hash>,
    height: Height,
    timestamp: TimestampMs,
    miner: &Address,
    transactions: &[TxDraft],
) -> Hash {
    let mut hasher = Sha256::new();
    if let Some(parent) = parent {
        hasher.update(parent.as_str().as_bytes());
    }
    hasher.update(height.get().to_be_bytes());
    hasher.update(timestamp.as_millis().to_be_bytes());
    hasher.update(miner.as_str().as_bytes());
    for tx in transactions {
        hasher.update(tx.hash.as_str().as_bytes());
    }
    let digest: [u8; 32] = hasher.finalize().into();
    Hash::from_bytes(&digest)
}
