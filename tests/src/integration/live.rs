//! # Live Engine Scenarios
//!
//! The live backend driven over real HTTP against an `httpmock` node:
//! out-of-order pages, pagination, cursor exhaustion and node failures.

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use shared_types::{BackendMode, BlockStatus, SyncError};
    use sync_runtime::{EngineConfig, LedgerSyncEngine};

    fn hash(n: u64) -> String {
        format!("0x{n:064x}")
    }

    fn address(n: u64) -> String {
        format!("0x{n:040x}")
    }

    fn block(height: u64, miner: u64) -> Value {
        json!({
            "height": height,
            "hash": hash(height),
            "parent_hash": if height > 1 { Some(hash(height - 1)) } else { None },
            "timestamp": 1_700_000_000_000u64 + height * 4_000,
            "miner": address(miner),
            "committee": ["validator-1", "validator-4"],
            "transactions": [{
                "tx_id": hash(0x10_000 + height),
                "from": address(1),
                "to": address(2),
                "amount": "2500000",
                "fee": 120,
                "timestamp": 1_700_000_000_000u64 + height * 4_000,
            }]
        })
    }

    fn page(blocks: Vec<Value>, next_cursor: Option<u64>) -> Value {
        json!({
            "version": "2.0",
            "id": 1,
            "result": { "blocks": blocks, "next_cursor": next_cursor }
        })
    }

    fn live_engine(server: &MockServer) -> LedgerSyncEngine {
        let mut config = EngineConfig {
            mode: BackendMode::Live,
            auto_start: false,
            finality_lag: 2,
            ..EngineConfig::default()
        };
        config.live.node_url = server.base_url();
        LedgerSyncEngine::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_out_of_order_poll_published_ascending() {
        let server = MockServer::start_async().await;
        let blocks = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/jsonrpc")
                    .json_body_partial(r#"{"method":"get_blocks"}"#);
                then.status(200)
                    .json_body(page(vec![block(12, 0xa), block(10, 0xb), block(11, 0xa)], None));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(200)
                    .json_body(json!({ "status": "ok", "consensus": { "active_validators": 5 } }));
            })
            .await;

        let engine = live_engine(&server);
        engine.bootstrap().await.unwrap();
        blocks.assert_async().await;

        let snapshot = engine.snapshot();
        let heights: Vec<u64> = snapshot.blocks.iter().map(|b| b.height.get()).collect();
        assert_eq!(heights, vec![10, 11, 12]);
        assert_eq!(snapshot.stats.current_height, 12);
        assert_eq!(snapshot.stats.active_validators, 5);
        assert!(snapshot.last_refreshed.is_some());
        assert_eq!(snapshot.blocks[0].status, BlockStatus::Finalized);
        assert_eq!(snapshot.blocks[2].status, BlockStatus::Pending);
        assert_eq!(snapshot.recent_transactions.len(), 3);
    }

    #[tokio::test]
    async fn test_load_more_without_cursor_leaves_state_unchanged() {
        let server = MockServer::start_async().await;
        let blocks = server
            .mock_async(|when, then| {
                when.method(POST).path("/jsonrpc");
                then.status(200).json_body(page(vec![block(3, 0xa)], None));
            })
            .await;

        let engine = live_engine(&server);
        engine.bootstrap().await.unwrap();
        let before = serde_json::to_vec(&engine.snapshot().blocks).unwrap();

        assert!(!engine.has_more());
        assert!(!engine.load_more_blocks().await.unwrap());
        let after = serde_json::to_vec(&engine.snapshot().blocks).unwrap();
        assert_eq!(before, after);
        // Only the bootstrap poll reached the node.
        blocks.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_pagination_appends_older_page() {
        let server = MockServer::start_async().await;
        let newest = server
            .mock_async(|when, then| {
                when.method(POST).path("/jsonrpc");
                then.status(200)
                    .json_body(page(vec![block(9, 0xa), block(8, 0xa)], Some(7)));
            })
            .await;

        let engine = live_engine(&server);
        engine.bootstrap().await.unwrap();
        assert!(engine.has_more());
        newest.delete_async().await;

        let older = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/jsonrpc")
                    .json_body_partial(r#"{"method":"get_blocks","params":{"from_height":7}}"#);
                then.status(200)
                    .json_body(page(vec![block(6, 0xb), block(7, 0xb)], None));
            })
            .await;

        assert!(engine.load_more_blocks().await.unwrap());
        older.assert_async().await;

        let heights: Vec<u64> = engine.snapshot().blocks.iter().map(|b| b.height.get()).collect();
        assert_eq!(heights, vec![6, 7, 8, 9]);
        assert!(!engine.has_more());
        assert!(!engine.hub().has_more.current());
    }

    #[tokio::test]
    async fn test_node_failure_keeps_previous_snapshot() {
        let server = MockServer::start_async().await;
        let healthy = server
            .mock_async(|when, then| {
                when.method(POST).path("/jsonrpc");
                then.status(200).json_body(page(vec![block(4, 0xa)], None));
            })
            .await;

        let engine = live_engine(&server);
        engine.bootstrap().await.unwrap();
        let before = engine.snapshot();
        healthy.delete_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/jsonrpc");
                then.status(503).body("unavailable");
            })
            .await;

        // The cycle degrades to a no-op rather than an error.
        engine.refresh_now().await.unwrap();
        assert_eq!(engine.snapshot(), before);
    }

    #[tokio::test]
    async fn test_pass_through_surfaces_rpc_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/jsonrpc")
                    .json_body_partial(r#"{"method":"get_treasury"}"#);
                then.status(200).json_body(json!({
                    "version": "2.0",
                    "id": 1,
                    "error": { "code": -32000, "message": "treasury offline" }
                }));
            })
            .await;

        let engine = live_engine(&server);
        let err = engine.get_treasury().await.unwrap_err();
        assert_eq!(
            err,
            SyncError::Protocol {
                code: -32000,
                message: "treasury offline".into()
            }
        );
    }
}
