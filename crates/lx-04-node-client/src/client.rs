//! JSON-RPC over HTTP.

use crate::error::{RpcError, RpcResult};
use crate::ports::NodeApi;
use crate::wire::HealthStatus;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

/// Envelope version sent with every request.
const PROTOCOL_VERSION: &str = "2.0";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    version: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Client for a node's `/jsonrpc` and `/health` endpoints.
pub struct HttpNodeClient {
    http: reqwest::Client,
    rpc_url: Url,
    health_url: Url,
    request_id: AtomicU64,
}

impl HttpNodeClient {
    /// Build a client for `base_url` (`http` or `https`).
    pub fn new(base_url: &str, timeout: Duration) -> RpcResult<Self> {
        let base = parse_base_url(base_url)?;
        let join = |path: &str| {
            base.join(path).map_err(|e| RpcError::InvalidUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })
        };

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            rpc_url: join("jsonrpc")?,
            health_url: join("health")?,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }
}

/// Parse and normalise a node base URL so relative joins keep its path.
pub fn parse_base_url(raw: &str) -> RpcResult<Url> {
    let invalid = |reason: String| RpcError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl NodeApi for HttpNodeClient {
    async fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest {
            version: PROTOCOL_VERSION,
            method,
            params,
            id,
        };
        trace!(method, id, "RPC request");

        let response = self
            .http
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        // Error envelopes are honoured even on non-2xx responses.
        let envelope: RpcResponse = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(RpcError::Status {
                    status: status.as_u16(),
                })
            }
            Err(e) => return Err(RpcError::Decode(e.to_string())),
        };

        if let Some(error) = envelope.error {
            debug!(method, code = error.code, message = %error.message, "RPC error envelope");
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
            });
        }

        envelope.result.ok_or(RpcError::MissingResult)
    }

    async fn health(&self) -> RpcResult<HealthStatus> {
        let response = self.http.get(self.health_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))
    }
}
