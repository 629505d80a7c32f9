//! # Refresh and Load-More Overlap
//!
//! The two live operations carry independent busy flags, so a refresh may
//! complete while an older page is still in flight. These scenarios pin down
//! what the published history looks like when that happens.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use lx_01_state_store::StoreLimits;
    use lx_02_distribution_hub::{BusyFlag, SharedLedger};
    use lx_04_node_client::{BlocksPage, HealthStatus, NodeApi, RpcError, RpcResult, WireBlock};
    use lx_05_live_sync::{LiveSyncBackend, LiveSyncConfig, RefreshOutcome};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Node whose older pages wait on a gate; the tip page answers at once.
    #[derive(Default)]
    struct GatedNode {
        pages: Mutex<HashMap<Option<u64>, BlocksPage>>,
        older_gate: Notify,
        older_calls: AtomicUsize,
    }

    impl GatedNode {
        fn set_page(&self, from: Option<u64>, heights: &[u64], next_cursor: Option<u64>) {
            let blocks = heights.iter().map(|h| wire_block(*h)).collect();
            self.pages
                .lock()
                .insert(from, BlocksPage { blocks, next_cursor });
        }
    }

    #[async_trait]
    impl NodeApi for GatedNode {
        async fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
            if method != "get_blocks" {
                return Err(RpcError::Rpc {
                    code: -32601,
                    message: "Method not found".into(),
                });
            }
            let from = params.get("from_height").and_then(Value::as_u64);
            if from.is_some() {
                self.older_calls.fetch_add(1, Ordering::SeqCst);
                self.older_gate.notified().await;
            }
            let page = self.pages.lock().get(&from).cloned().unwrap_or_default();
            Ok(serde_json::to_value(page).unwrap())
        }

        async fn health(&self) -> RpcResult<HealthStatus> {
            Err(RpcError::Status { status: 404 })
        }
    }

    fn wire_block(height: u64) -> WireBlock {
        serde_json::from_value(json!({
            "height": height,
            "hash": format!("0x{height:064x}"),
            "parent_hash": format!("0x{:064x}", height - 1),
            "timestamp": 1_700_000_000_000u64 + height * 4_000,
            "miner": format!("0x{:040x}", 0xa),
            "transactions": [{
                "tx_id": format!("0x{:064x}", 0x10_000 + height),
                "from": format!("0x{:040x}", 1),
                "to": format!("0x{:040x}", 2),
                "amount": 1_000,
                "fee": 10,
                "timestamp": 1_700_000_000_000u64 + height * 4_000,
            }]
        }))
        .unwrap()
    }

    fn setup() -> (Arc<GatedNode>, Arc<LiveSyncBackend>, SharedLedger) {
        let node = Arc::new(GatedNode::default());
        let ledger = SharedLedger::new(StoreLimits::default());
        let backend = Arc::new(LiveSyncBackend::new(
            LiveSyncConfig::default(),
            node.clone(),
            ledger.clone(),
        ));
        (node, backend, ledger)
    }

    fn heights(ledger: &SharedLedger) -> Vec<u64> {
        ledger.snapshot().blocks.iter().map(|b| b.height.get()).collect()
    }

    async fn wait_for_older_request(node: &GatedNode) {
        while node.older_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_refresh_during_load_more_keeps_history_contiguous() {
        let (node, backend, ledger) = setup();
        node.set_page(None, &[9, 8], Some(7));
        node.set_page(Some(7), &[7, 6], None);
        assert_eq!(backend.refresh_from_node().await, RefreshOutcome::Refreshed);

        let loading = tokio::spawn({
            let backend = Arc::clone(&backend);
            async move { backend.load_more_blocks().await }
        });
        wait_for_older_request(&node).await;
        assert!(ledger.hub().is_busy(BusyFlag::LoadingMore));

        // The tip moves while the older page is in flight.
        node.set_page(None, &[10, 9, 8], Some(7));
        assert_eq!(backend.refresh_from_node().await, RefreshOutcome::Refreshed);
        assert_eq!(heights(&ledger), vec![8, 9, 10]);

        node.older_gate.notify_one();
        assert!(loading.await.unwrap());

        assert_eq!(heights(&ledger), vec![6, 7, 8, 9, 10]);
        assert_eq!(ledger.snapshot().recent_transactions.len(), 5);
        assert!(!ledger.hub().is_busy(BusyFlag::Refreshing));
        assert!(!ledger.hub().is_busy(BusyFlag::LoadingMore));
        assert_eq!(backend.cursor(), None);
    }

    #[tokio::test]
    async fn test_older_page_overlapping_new_window_is_not_duplicated() {
        let (node, backend, ledger) = setup();
        node.set_page(None, &[9, 8], Some(7));
        // Overlaps the window the concurrent refresh will install.
        node.set_page(Some(7), &[7, 6, 5], Some(4));
        backend.refresh_from_node().await;

        let loading = tokio::spawn({
            let backend = Arc::clone(&backend);
            async move { backend.load_more_blocks().await }
        });
        wait_for_older_request(&node).await;

        node.set_page(None, &[9, 8, 7, 6], Some(5));
        backend.refresh_from_node().await;

        node.older_gate.notify_one();
        assert!(loading.await.unwrap());
        assert_eq!(heights(&ledger), vec![5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn test_next_refresh_replaces_loaded_pages() {
        let (node, backend, ledger) = setup();
        node.set_page(None, &[9, 8], Some(7));
        node.set_page(Some(7), &[7, 6], None);
        backend.refresh_from_node().await;

        node.older_gate.notify_one();
        assert!(backend.load_more_blocks().await);
        assert_eq!(heights(&ledger), vec![6, 7, 8, 9]);

        // Wholesale replacement: only the newest page survives.
        backend.refresh_from_node().await;
        assert_eq!(heights(&ledger), vec![8, 9]);
        assert_eq!(backend.cursor(), Some(7));
    }
}
