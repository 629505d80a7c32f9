//! # Channel Delivery Through the Engine
//!
//! Replay-on-subscribe: a listener gets the current value first, then every
//! later publication in order, until the engine is disposed.

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use lx_02_distribution_hub::BusyFlag;
    use serde_json::json;
    use shared_bus::Subscription;
    use shared_types::BackendMode;
    use std::time::Duration;
    use sync_runtime::{EngineConfig, LedgerSyncEngine};
    use tokio::time::timeout;

    /// Drain whatever is queued without waiting.
    fn collect_queued<T>(sub: &mut Subscription<T>) -> Vec<T> {
        let mut values = Vec::new();
        while let Ok(Some(value)) = sub.try_recv() {
            values.push(value);
        }
        values
    }

    fn simulated() -> LedgerSyncEngine {
        let mut config = EngineConfig {
            auto_start: false,
            ..EngineConfig::default()
        };
        config.simulator.initial_block_count = 3;
        LedgerSyncEngine::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_early_and_late_subscribers_see_same_current_value() {
        let engine = simulated();
        let mut early = engine.hub().subscribe_blocks().unwrap();
        engine.bootstrap().await.unwrap();

        let mut late = engine.hub().subscribe_blocks().unwrap();
        let late_first = late.try_recv().unwrap().unwrap();

        let early_values = collect_queued(&mut early);
        assert_eq!(early_values.len(), 2);
        assert!(early_values[0].is_empty());
        assert_eq!(early_values[1], late_first);
        assert_eq!(late_first.len(), 3);
    }

    #[tokio::test]
    async fn test_every_cycle_published_in_order() {
        let engine = simulated();
        engine.bootstrap().await.unwrap();
        let mut stats = engine.hub().subscribe_stats().unwrap();

        for _ in 0..4 {
            engine.refresh_now().await.unwrap();
        }
        let heights: Vec<u64> = collect_queued(&mut stats)
            .iter()
            .map(|s| s.current_height)
            .collect();
        assert_eq!(heights, vec![3, 4, 5, 6, 7]);
    }

    #[tokio::test]
    async fn test_dispose_ends_subscriptions() {
        let engine = simulated();
        engine.bootstrap().await.unwrap();
        let mut accounts = engine.hub().subscribe_accounts().unwrap();
        engine.dispose().await;

        let drained = timeout(Duration::from_secs(1), async {
            let mut count = 0;
            while accounts.recv().await.is_some() {
                count += 1;
            }
            count
        })
        .await
        .unwrap();
        assert_eq!(drained, 1);
        assert!(engine.hub().subscribe_accounts().is_err());
    }

    #[tokio::test]
    async fn test_refreshing_flag_toggles_around_poll() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/jsonrpc");
                then.status(200).json_body(json!({
                    "version": "2.0",
                    "id": 1,
                    "result": { "blocks": [], "next_cursor": null }
                }));
            })
            .await;

        let mut config = EngineConfig {
            mode: BackendMode::Live,
            auto_start: false,
            ..EngineConfig::default()
        };
        config.live.node_url = server.base_url();
        let engine = LedgerSyncEngine::new(config).unwrap();

        let mut refreshing = engine.hub().subscribe_busy(BusyFlag::Refreshing).unwrap();
        engine.bootstrap().await.unwrap();

        assert_eq!(collect_queued(&mut refreshing), vec![false, true, false]);
    }
}
