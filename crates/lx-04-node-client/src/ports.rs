//! Outbound port to a ledger node.
//!
//! The live sync backend depends only on this trait; tests substitute
//! in-memory fakes for [`HttpNodeClient`](crate::HttpNodeClient).

use crate::error::RpcResult;
use crate::wire::{BlocksPage, HealthStatus};
use async_trait::async_trait;
use serde_json::{json, Value};
use shared_types::{Address, Hash};

/// Calls a node answers.
///
/// Only `call` and `health` need implementing; every named method is a thin
/// wrapper over `call`.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// One JSON-RPC round trip returning the raw `result`.
    async fn call(&self, method: &str, params: Value) -> RpcResult<Value>;

    /// Best-effort status probe.
    async fn health(&self) -> RpcResult<HealthStatus>;

    /// Newest `limit` blocks at or below `from_height` (tip when `None`).
    async fn get_blocks(&self, limit: u32, from_height: Option<u64>) -> RpcResult<BlocksPage> {
        let mut params = json!({ "limit": limit });
        if let Some(height) = from_height {
            params["from_height"] = json!(height);
        }
        let result = self.call("get_blocks", params).await?;
        serde_json::from_value(result).map_err(|e| crate::RpcError::Payload {
            method: "get_blocks".into(),
            reason: e.to_string(),
        })
    }

    async fn get_transaction(&self, tx_id: &Hash) -> RpcResult<Value> {
        self.call("get_transaction", json!({ "tx_id": tx_id })).await
    }

    async fn get_transaction_history(
        &self,
        address: &Address,
        limit: u32,
        cursor: Option<&str>,
    ) -> RpcResult<Value> {
        let mut params = json!({ "address": address, "limit": limit });
        if let Some(cursor) = cursor {
            params["cursor"] = json!(cursor);
        }
        self.call("get_transaction_history", params).await
    }

    async fn get_balance(&self, address: &Address) -> RpcResult<Value> {
        self.call("get_balance", json!({ "address": address })).await
    }

    async fn get_staking_info(&self, address: &Address) -> RpcResult<Value> {
        self.call("get_staking_info", json!({ "address": address })).await
    }

    async fn get_privacy_pool(&self) -> RpcResult<Value> {
        self.call("get_privacy_pool", json!({})).await
    }

    async fn get_governance_proposals(&self) -> RpcResult<Value> {
        self.call("get_governance_proposals", json!({})).await
    }

    async fn get_treasury(&self) -> RpcResult<Value> {
        self.call("get_treasury", json!({})).await
    }

    async fn get_tokens(&self) -> RpcResult<Value> {
        self.call("get_tokens", json!({})).await
    }

    async fn get_contract_code(&self, address: &Address) -> RpcResult<Value> {
        self.call("get_contract_code", json!({ "address": address })).await
    }

    async fn get_contract_abi(&self, address: &Address) -> RpcResult<Value> {
        self.call("get_contract_abi", json!({ "address": address })).await
    }

    async fn get_events(&self, limit: u32) -> RpcResult<Value> {
        self.call("get_events", json!({ "limit": limit })).await
    }

    async fn get_analytics(&self) -> RpcResult<Value> {
        self.call("get_analytics", json!({})).await
    }

    async fn get_chain_params(&self) -> RpcResult<Value> {
        self.call("get_chain_params", json!({})).await
    }

    async fn get_nodes(&self) -> RpcResult<Value> {
        self.call("get_nodes", json!({})).await
    }

    async fn get_bridge_history(&self, address: Option<&Address>, limit: u32) -> RpcResult<Value> {
        let mut params = json!({ "limit": limit });
        if let Some(address) = address {
            params["address"] = json!(address);
        }
        self.call("get_bridge_history", params).await
    }

    async fn get_bridge_stats(&self) -> RpcResult<Value> {
        self.call("get_bridge_stats", json!({})).await
    }
}
