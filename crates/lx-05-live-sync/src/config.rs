//! Live sync configuration.

use lx_04_node_client::{parse_base_url, DEFAULT_TIMEOUT};
use serde::Deserialize;
use shared_types::ValidationError;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LiveSyncConfig {
    /// Node base URL; requests go to `<node_url>/jsonrpc` and `/health`
    pub node_url: String,
    /// Blocks requested per `get_blocks` call
    pub page_size: u32,
    pub request_timeout_ms: u64,
    /// Confirmations required before a block is finalized
    pub finality_lag: u64,
    /// Fallback span for throughput when a window has a single timestamp
    pub block_interval_ms: u64,
}

impl Default for LiveSyncConfig {
    fn default() -> Self {
        Self {
            node_url: "http://127.0.0.1:8645".into(),
            page_size: 25,
            request_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            finality_lag: 6,
            block_interval_ms: 4_000,
        }
    }
}

impl LiveSyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 {
            return Err(ValidationError::InvalidConfig {
                field: "page_size",
                reason: "must be positive".into(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ValidationError::InvalidConfig {
                field: "request_timeout_ms",
                reason: "must be positive".into(),
            });
        }
        parse_base_url(&self.node_url).map_err(|e| ValidationError::InvalidConfig {
            field: "node_url",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
