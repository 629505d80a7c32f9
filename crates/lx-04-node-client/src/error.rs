//! Transport errors and their mapping into the sync taxonomy.

use shared_types::{SyncError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Invalid node URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// The body was not a JSON-RPC envelope.
    #[error("Undecodable response: {0}")]
    Decode(String),

    /// The envelope was fine but `result` has the wrong shape.
    #[error("Unexpected result for {method}: {reason}")]
    Payload { method: String, reason: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("RPC response missing result")]
    MissingResult,
}

pub type RpcResult<T> = Result<T, RpcError>;

impl From<RpcError> for SyncError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Rpc { code, message } => SyncError::Protocol { code, message },
            RpcError::InvalidUrl { url, reason } => SyncError::Validation(ValidationError::InvalidConfig {
                field: "node_url",
                reason: format!("{url}: {reason}"),
            }),
            RpcError::Payload { method, reason } => {
                SyncError::Validation(ValidationError::MalformedPayload {
                    reason: format!("{method}: {reason}"),
                })
            }
            other => SyncError::Network(other.to_string()),
        }
    }
}
