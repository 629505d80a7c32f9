//! Derived statistics over the retained window.

use shared_types::BlockSummary;

/// Number of most recent blocks averaged for throughput.
pub const THROUGHPUT_WINDOW: usize = 24;

/// Transactions per second across `blocks` (ascending by height).
///
/// The span is newest timestamp minus oldest. A zero span (one block, or
/// identical timestamps) counts `fallback_span_ms` per block interval, with
/// at least one interval.
pub fn average_throughput(blocks: &[&BlockSummary], fallback_span_ms: u64) -> f64 {
    let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
        return 0.0;
    };

    let tx_count: u64 = blocks.iter().map(|b| u64::from(b.transaction_count)).sum();
    let span_ms = match last
        .timestamp
        .as_millis()
        .saturating_sub(first.timestamp.as_millis())
    {
        0 => fallback_span_ms.saturating_mul((blocks.len() as u64 - 1).max(1)),
        span => span,
    };
    if span_ms == 0 {
        return 0.0;
    }

    tx_count as f64 / (span_ms as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, AtomicAmount, BlockStatus, Hash, Height, TimestampMs};

    fn summary(height: u64, ts: u64, txs: u32) -> BlockSummary {
        BlockSummary {
            height: Height::new(height).unwrap(),
            hash: Hash::from_bytes(&[height as u8; 32]),
            parent_hash: None,
            timestamp: TimestampMs::new(ts),
            transaction_count: txs,
            total_value: AtomicAmount::ZERO,
            status: BlockStatus::Pending,
            confirmations: 1,
            miner: Address::from_bytes(&[1; 20]),
            committee: Vec::new(),
        }
    }

    #[test]
    fn test_empty_window() {
        assert_eq!(average_throughput(&[], 4000), 0.0);
    }

    #[test]
    fn test_throughput_over_span() {
        let a = summary(1, 0, 4);
        let b = summary(2, 2000, 6);
        // 10 transactions over 2 seconds.
        assert!((average_throughput(&[&a, &b], 4000) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_block_uses_fallback() {
        let a = summary(1, 1000, 8);
        assert!((average_throughput(&[&a], 4000) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_identical_timestamps_use_interval_per_block() {
        let blocks: Vec<BlockSummary> = (1..=5).map(|h| summary(h, 1000, 4)).collect();
        let refs: Vec<&BlockSummary> = blocks.iter().collect();
        // 20 transactions over 4 intervals of 4 s.
        assert!((average_throughput(&refs, 4000) - 1.25).abs() < f64::EPSILON);
    }
}
