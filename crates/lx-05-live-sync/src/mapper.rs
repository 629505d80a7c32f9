//! Wire records to domain entities.
//!
//! Validation happens here, once. A record that fails is dropped on its own:
//! a bad transaction costs that transaction, a bad block costs that block.

use lx_01_state_store::WindowBlock;
use lx_04_node_client::{WireBlock, WireTransaction};
use lx_telemetry::{log_block_event, log_tx_event, RECORDS_REJECTED};
use shared_types::{
    Address, AtomicAmount, BlockDetails, BlockStatus, BlockSummary, CommitteeId, Hash, Height,
    TimestampMs, TransactionDetails, TransactionStatus, TransactionSummary, ValidationError,
};

/// Map a page, dropping invalid blocks. Result is ascending by height with
/// duplicate heights removed (first occurrence wins).
pub fn map_page(blocks: &[WireBlock], tip: u64, finality_lag: u64) -> Vec<WindowBlock> {
    let mut mapped: Vec<WindowBlock> = blocks
        .iter()
        .filter_map(|wire| match map_block(wire, tip, finality_lag) {
            Ok(block) => Some(block),
            Err(e) => {
                RECORDS_REJECTED.with_label_values(&["block"]).inc();
                log_block_event!(warn, "live-sync", "Dropping malformed block", wire.height, wire.hash, error = %e);
                None
            }
        })
        .collect();

    mapped.sort_by_key(|b| b.details.height());
    mapped.dedup_by_key(|b| b.details.height());
    mapped
}

/// Map one block. Invalid transactions inside it are dropped individually.
pub fn map_block(
    wire: &WireBlock,
    tip: u64,
    finality_lag: u64,
) -> Result<WindowBlock, ValidationError> {
    let height = Height::new(wire.height)?;
    let hash = Hash::parse(&wire.hash)?;
    let parent_hash = wire.parent_hash.as_deref().map(Hash::parse).transpose()?;
    let miner = Address::parse(&wire.miner)?;
    let committee = wire
        .committee
        .iter()
        .map(|id| CommitteeId::parse(id))
        .collect::<Result<Vec<_>, _>>()?;

    let confirmations = wire
        .confirmations
        .unwrap_or_else(|| tip.saturating_sub(wire.height) + 1);

    let transactions: Vec<TransactionDetails> = wire
        .transactions
        .iter()
        .filter_map(|tx| match map_transaction(tx, &hash, height, confirmations) {
            Ok(details) => Some(details),
            Err(e) => {
                RECORDS_REJECTED.with_label_values(&["transaction"]).inc();
                log_tx_event!(warn, "live-sync", "Dropping malformed transaction", tx.tx_id, height = wire.height, error = %e);
                None
            }
        })
        .collect();

    let mut summary = BlockSummary {
        height,
        hash,
        parent_hash,
        timestamp: TimestampMs::new(wire.timestamp),
        transaction_count: transactions.len() as u32,
        total_value: transactions.iter().map(|tx| tx.summary.value).sum(),
        status: BlockStatus::Pending,
        confirmations,
        miner,
        committee,
    };
    summary.apply_finality(confirmations >= finality_lag);

    Ok(WindowBlock {
        details: BlockDetails {
            summary,
            transactions: transactions.iter().map(|tx| tx.summary.clone()).collect(),
        },
        transactions,
    })
}

pub fn map_transaction(
    wire: &WireTransaction,
    block_hash: &Hash,
    block_height: Height,
    confirmations: u64,
) -> Result<TransactionDetails, ValidationError> {
    let parse_hashes = |raw: &[String]| -> Result<Vec<Hash>, ValidationError> {
        raw.iter().map(|h| Hash::parse(h)).collect()
    };

    Ok(TransactionDetails {
        summary: TransactionSummary {
            hash: Hash::parse(&wire.tx_id)?,
            block_hash: block_hash.clone(),
            block_height,
            from: Address::parse(&wire.from)?,
            to: Address::parse(&wire.to)?,
            value: AtomicAmount::from_json(&wire.amount)?,
            fee: AtomicAmount::from_json(&wire.fee)?,
            timestamp: TimestampMs::new(wire.timestamp),
            status: wire
                .status
                .as_deref()
                .map_or(TransactionStatus::Confirmed, TransactionStatus::from_wire),
            memo: wire.memo.clone().filter(|m| !m.is_empty()),
        },
        inputs: parse_hashes(&wire.inputs)?,
        outputs: parse_hashes(&wire.outputs)?,
        confirmations,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lx_04_node_client::{WireBlock, WireTransaction};
    use serde_json::json;

    pub fn hash_hex(n: u64) -> String {
        format!("0x{n:064x}")
    }

    pub fn address_hex(n: u64) -> String {
        format!("0x{n:040x}")
    }

    pub fn wire_tx(id: u64, from: u64, to: u64, amount: u64) -> WireTransaction {
        WireTransaction {
            tx_id: hash_hex(0x1000 + id),
            from: address_hex(from),
            to: address_hex(to),
            amount: json!(amount),
            fee: json!("10"),
            timestamp: id * 1000,
            status: None,
            memo: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn wire_block(height: u64, txs: Vec<WireTransaction>) -> WireBlock {
        WireBlock {
            height,
            hash: hash_hex(height),
            parent_hash: (height > 1).then(|| hash_hex(height - 1)),
            timestamp: height * 4_000,
            miner: address_hex(0xaa),
            confirmations: None,
            committee: vec!["validator-1".into(), "validator-2".into()],
            transactions: txs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_sorted_ascending() {
        let page = vec![wire_block(5, vec![]), wire_block(3, vec![]), wire_block(4, vec![])];
        let heights: Vec<u64> = map_page(&page, 5, 6)
            .iter()
            .map(|b| b.details.height().get())
            .collect();
        assert_eq!(heights, vec![3, 4, 5]);
    }

    #[test]
    fn test_bad_block_dropped_alone() {
        let mut bad = wire_block(4, vec![]);
        bad.miner = "0xnot-an-address".into();
        let page = vec![wire_block(3, vec![]), bad, wire_block(5, vec![])];

        let mapped = map_page(&page, 5, 6);
        assert_eq!(mapped.len(), 2);
    }

    #[test]
    fn test_bad_transaction_dropped_alone() {
        let mut bad = wire_tx(2, 1, 2, 50);
        bad.amount = json!(-5);
        let block = wire_block(7, vec![wire_tx(1, 1, 2, 100), bad, wire_tx(3, 2, 1, 25)]);

        let mapped = map_block(&block, 7, 6).unwrap();
        assert_eq!(mapped.transactions.len(), 2);
        assert_eq!(mapped.details.summary.transaction_count, 2);
        assert_eq!(mapped.details.summary.total_value, AtomicAmount::new(125));
    }

    #[test]
    fn test_confirmation_finality() {
        // tip 10, lag 3: confirmations = 10 - h + 1 >= 3  <=>  h <= 8
        let finalized = map_block(&wire_block(8, vec![]), 10, 3).unwrap();
        let pending = map_block(&wire_block(9, vec![]), 10, 3).unwrap();
        assert!(finalized.details.summary.is_finalized());
        assert!(!pending.details.summary.is_finalized());

        let mut reported = wire_block(10, vec![]);
        reported.confirmations = Some(40);
        assert!(map_block(&reported, 10, 3).unwrap().details.summary.is_finalized());
    }

    #[test]
    fn test_upper_case_address_normalised() {
        let mut tx = wire_tx(1, 1, 2, 5);
        tx.from = tx.from.to_uppercase().replacen("0X", "0x", 1);
        let hash = Hash::parse(&hash_hex(1)).unwrap();
        let mapped = map_transaction(&tx, &hash, Height::GENESIS, 1).unwrap();
        assert_eq!(mapped.summary.from.as_str(), address_hex(1));
        assert_eq!(mapped.summary.status, TransactionStatus::Confirmed);
    }
}
