//! The bounded store itself.
//!
//! Plain data structure, no interior locking. Owners share it behind a lock
//! and keep each mutating cycle inside one critical section.

use crate::capped::{push_back_capped, push_front_capped, push_front_deque};
use crate::config::StoreLimits;
use lx_telemetry::{BLOCKS_EVICTED, RETAINED_BLOCKS};
use shared_types::{
    AccountSnapshot, Address, BlockDetails, BlockSummary, Hash, Height, TimestampMs,
    TransactionDetails, TransactionSummary,
};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::debug;

/// A block plus the details of every transaction it carries.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowBlock {
    pub details: BlockDetails,
    pub transactions: Vec<TransactionDetails>,
}

/// A complete replacement window built off to the side (live mode).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreWindow {
    pub blocks: Vec<WindowBlock>,
    pub current_height: u64,
}

/// Where new account activity lands in the most-recent-first lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityOrder {
    /// Newer than everything held: insert first.
    Newest,
    /// Older than everything held: append if there is room.
    Oldest,
}

/// Blocks, transactions and accounts with fixed-size retention.
#[derive(Debug)]
pub struct BoundedStateStore {
    limits: StoreLimits,
    /// Height -> hash, oldest first.
    index: BTreeMap<Height, Hash>,
    blocks: HashMap<Hash, BlockDetails>,
    transactions: HashMap<Hash, TransactionDetails>,
    /// Most recent first.
    recent: VecDeque<TransactionSummary>,
    accounts: BTreeMap<Address, AccountSnapshot>,
    current_height: u64,
    finalized_height: u64,
}

impl BoundedStateStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            limits,
            index: BTreeMap::new(),
            blocks: HashMap::new(),
            transactions: HashMap::new(),
            recent: VecDeque::new(),
            accounts: BTreeMap::new(),
            current_height: 0,
            finalized_height: 0,
        }
    }

    pub fn limits(&self) -> &StoreLimits {
        &self.limits
    }

    // =========================================================================
    // BLOCKS
    // =========================================================================

    /// Insert a block at the head of history, then enforce the bound.
    ///
    /// Returns the summaries of evicted blocks, oldest first.
    pub fn insert_block(&mut self, block: WindowBlock) -> Vec<BlockSummary> {
        let height = block.details.height();
        let hash = block.details.hash().clone();

        if let Some(previous) = self.index.get(&height).cloned() {
            self.remove_block(&previous);
        }

        for tx in block.transactions {
            push_front_deque(
                &mut self.recent,
                tx.summary.clone(),
                self.limits.max_recent_transactions,
            );
            self.transactions.insert(tx.hash().clone(), tx);
        }

        self.index.insert(height, hash.clone());
        self.blocks.insert(hash, block.details);
        self.current_height = self.current_height.max(height.get());

        self.enforce_bound()
    }

    /// Append a block below the oldest one held (older history).
    ///
    /// Refused when the store is full or the height is already present.
    pub fn append_older_block(&mut self, block: WindowBlock) -> bool {
        let height = block.details.height();
        if self.is_full() || self.index.contains_key(&height) {
            return false;
        }

        // Later transactions in a block are the more recent ones.
        for tx in block.transactions.iter().rev() {
            if self.recent.len() < self.limits.max_recent_transactions {
                self.recent.push_back(tx.summary.clone());
            }
        }
        for tx in block.transactions {
            self.transactions.insert(tx.hash().clone(), tx);
        }

        let hash = block.details.hash().clone();
        self.index.insert(height, hash.clone());
        self.blocks.insert(hash, block.details);
        RETAINED_BLOCKS.set(self.index.len() as f64);
        true
    }

    /// Remove oldest blocks one at a time until back within bound.
    pub fn enforce_bound(&mut self) -> Vec<BlockSummary> {
        let mut evicted = Vec::new();
        while self.index.len() > self.limits.max_blocks {
            let Some((_, hash)) = self.index.pop_first() else {
                break;
            };
            if let Some(summary) = self.purge_block_data(&hash) {
                debug!(height = summary.height.get(), hash = %summary.hash, "Evicted block");
                evicted.push(summary);
            }
        }

        if !evicted.is_empty() {
            BLOCKS_EVICTED.inc_by(evicted.len() as f64);
        }
        RETAINED_BLOCKS.set(self.index.len() as f64);
        evicted
    }

    fn remove_block(&mut self, hash: &Hash) -> Option<BlockSummary> {
        let summary = self.purge_block_data(hash)?;
        self.index.remove(&summary.height);
        Some(summary)
    }

    /// Drop a block's details, its transactions and every reference to it.
    fn purge_block_data(&mut self, hash: &Hash) -> Option<BlockSummary> {
        let details = self.blocks.remove(hash)?;

        let tx_hashes: HashSet<&Hash> = details.transactions.iter().map(|tx| &tx.hash).collect();
        for tx_hash in &tx_hashes {
            self.transactions.remove(*tx_hash);
        }
        self.recent.retain(|tx| &tx.block_hash != hash);

        for account in self.accounts.values_mut() {
            account.recent_blocks.retain(|h| h != hash);
        }

        Some(details.summary)
    }

    /// Recompute confirmations and height-threshold finality for every block.
    ///
    /// A block is finalized iff `height <= current_height - finality_lag`.
    /// Returns the number of blocks that became finalized.
    pub fn apply_height_finality(&mut self, finality_lag: u64) -> usize {
        let current = self.current_height;
        let threshold = current.saturating_sub(finality_lag);
        let mut newly_finalized = 0;

        for hash in self.index.values() {
            let Some(block) = self.blocks.get_mut(hash) else {
                continue;
            };
            let summary = &mut block.summary;
            let height = summary.height.get();
            summary.confirmations = current.saturating_sub(height) + 1;

            let was_finalized = summary.is_finalized();
            summary.apply_finality(height <= threshold);
            if summary.is_finalized() {
                if !was_finalized {
                    newly_finalized += 1;
                }
                self.finalized_height = self.finalized_height.max(height);
            }
        }

        newly_finalized
    }

    /// Swap in a fully built window, replacing blocks, transactions and the
    /// recent list wholesale. Accounts are cleared for the caller to rebuild
    /// from the new window.
    ///
    /// A hash already finalized in the previous contents stays finalized, and
    /// the finalized height never moves backwards.
    pub fn replace_window(&mut self, window: StoreWindow) {
        let previously_final: HashSet<Hash> = self
            .blocks
            .values()
            .filter(|b| b.summary.is_finalized())
            .map(|b| b.summary.hash.clone())
            .collect();

        self.index.clear();
        self.blocks.clear();
        self.transactions.clear();
        self.recent.clear();

        let mut blocks = window.blocks;
        blocks.sort_by_key(|b| b.details.height());

        for mut block in blocks {
            if previously_final.contains(block.details.hash()) {
                block.details.summary.apply_finality(true);
            }
            if block.details.summary.is_finalized() {
                self.finalized_height = self.finalized_height.max(block.details.height().get());
            }
            for tx in block.transactions {
                push_front_deque(
                    &mut self.recent,
                    tx.summary.clone(),
                    self.limits.max_recent_transactions,
                );
                self.transactions.insert(tx.hash().clone(), tx);
            }
            self.index
                .insert(block.details.height(), block.details.hash().clone());
            self.blocks
                .insert(block.details.hash().clone(), block.details);
        }

        self.accounts.clear();
        self.current_height = window.current_height.max(self.newest_height().unwrap_or(0));

        self.enforce_bound();
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// Get an account, creating an empty one on first reference.
    pub fn touch_account(&mut self, address: &Address, seen_at: TimestampMs) -> &mut AccountSnapshot {
        let account = self
            .accounts
            .entry(address.clone())
            .or_insert_with(|| AccountSnapshot::empty(address.clone(), seen_at));
        account.last_seen = account.last_seen.max(seen_at);
        account
    }

    /// Insert a pre-built account (seeding).
    pub fn insert_account(&mut self, account: AccountSnapshot) {
        self.accounts.insert(account.address.clone(), account);
    }

    /// Record `tx` in the sender's outbound list, the recipient's inbound list
    /// and both accounts' recent-block lists. Creates missing accounts.
    pub fn record_activity(&mut self, tx: &TransactionSummary, order: ActivityOrder) {
        let activity_cap = self.limits.account_activity_cap;
        let block_cap = self.limits.account_block_cap;

        let sender = self.touch_account(&tx.from, tx.timestamp);
        match order {
            ActivityOrder::Newest => {
                push_front_capped(&mut sender.outbound, tx.hash.clone(), activity_cap);
                push_front_capped(&mut sender.recent_blocks, tx.block_hash.clone(), block_cap);
            }
            ActivityOrder::Oldest => {
                push_back_capped(&mut sender.outbound, tx.hash.clone(), activity_cap);
                push_back_capped(&mut sender.recent_blocks, tx.block_hash.clone(), block_cap);
            }
        }

        let recipient = self.touch_account(&tx.to, tx.timestamp);
        match order {
            ActivityOrder::Newest => {
                push_front_capped(&mut recipient.inbound, tx.hash.clone(), activity_cap);
                push_front_capped(&mut recipient.recent_blocks, tx.block_hash.clone(), block_cap);
            }
            ActivityOrder::Oldest => {
                push_back_capped(&mut recipient.inbound, tx.hash.clone(), activity_cap);
                push_back_capped(&mut recipient.recent_blocks, tx.block_hash.clone(), block_cap);
            }
        }
    }

    /// Record that `miner` produced `block_hash`.
    pub fn record_mined_block(
        &mut self,
        miner: &Address,
        block_hash: &Hash,
        at: TimestampMs,
        order: ActivityOrder,
    ) {
        let cap = self.limits.account_block_cap;
        let account = self.touch_account(miner, at);
        match order {
            ActivityOrder::Newest => push_front_capped(&mut account.recent_blocks, block_hash.clone(), cap),
            ActivityOrder::Oldest => {
                push_back_capped(&mut account.recent_blocks, block_hash.clone(), cap);
            }
        }
    }

    pub fn account(&self, address: &Address) -> Option<&AccountSnapshot> {
        self.accounts.get(address)
    }

    pub fn account_mut(&mut self, address: &Address) -> Option<&mut AccountSnapshot> {
        self.accounts.get_mut(address)
    }

    /// All accounts ordered by address.
    pub fn accounts(&self) -> Vec<AccountSnapshot> {
        self.accounts.values().cloned().collect()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Block summaries ascending by height.
    pub fn blocks_ascending(&self) -> Vec<BlockSummary> {
        self.index
            .values()
            .filter_map(|hash| self.blocks.get(hash))
            .map(|b| b.summary.clone())
            .collect()
    }

    /// The `n` most recent block summaries, ascending by height.
    pub fn recent_blocks(&self, n: usize) -> Vec<&BlockSummary> {
        let mut window: Vec<&BlockSummary> = self
            .index
            .values()
            .rev()
            .take(n)
            .filter_map(|hash| self.blocks.get(hash))
            .map(|b| &b.summary)
            .collect();
        window.reverse();
        window
    }

    /// Most-recent-first transactions across all retained blocks.
    pub fn recent_transactions(&self) -> Vec<TransactionSummary> {
        self.recent.iter().cloned().collect()
    }

    pub fn block_details(&self, hash: &Hash) -> Option<BlockDetails> {
        self.blocks.get(hash).cloned()
    }

    pub fn block_by_height(&self, height: Height) -> Option<&BlockDetails> {
        self.index.get(&height).and_then(|hash| self.blocks.get(hash))
    }

    /// Transaction details with a confirmation count relative to the tip.
    pub fn transaction_details(&self, hash: &Hash) -> Option<TransactionDetails> {
        let mut details = self.transactions.get(hash).cloned()?;
        details.confirmations = self
            .current_height
            .saturating_sub(details.summary.block_height.get())
            + 1;
        Some(details)
    }

    pub fn contains_block(&self, hash: &Hash) -> bool {
        self.blocks.contains_key(hash)
    }

    pub fn block_count(&self) -> usize {
        self.index.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_full(&self) -> bool {
        self.index.len() >= self.limits.max_blocks
    }

    /// Free block slots before the bound is reached.
    pub fn remaining_capacity(&self) -> usize {
        self.limits.max_blocks.saturating_sub(self.index.len())
    }

    pub fn oldest_height(&self) -> Option<u64> {
        self.index.keys().next().map(|h| h.get())
    }

    pub fn newest_height(&self) -> Option<u64> {
        self.index.keys().next_back().map(|h| h.get())
    }

    pub fn current_height(&self) -> u64 {
        self.current_height
    }

    pub fn finalized_height(&self) -> u64 {
        self.finalized_height
    }
}
