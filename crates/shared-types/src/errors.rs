//! # Error Types
//!
//! The error taxonomy shared by every subsystem.
//!
//! | Kind | Raised by | Policy |
//! |------|-----------|--------|
//! | `ValidationError` | config, payload mapping | fatal to the single call |
//! | `SyncError::Network` | transport / HTTP | caught per cycle, state untouched |
//! | `SyncError::Protocol` | JSON-RPC error envelope | returned to the caller |
//! | absence | point lookups | `Option::None`, never an error |

use thiserror::Error;

/// A malformed configuration value or backend payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid hash: {value}")]
    InvalidHash { value: String },

    #[error("Invalid address: {value}")]
    InvalidAddress { value: String },

    #[error("Invalid amount: {value}")]
    InvalidAmount { value: String },

    #[error("Invalid committee id: {value}")]
    InvalidCommitteeId { value: String },

    #[error("Block height must be positive")]
    ZeroHeight,

    #[error("Cannot pick from an empty list")]
    EmptyChoice,

    #[error("Invalid configuration `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: String },
}

/// Errors surfaced by a synchronization backend or the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transport failure (connect, timeout, HTTP status, undecodable body).
    #[error("Network error: {0}")]
    Network(String),

    /// The node answered with an error envelope.
    #[error("RPC error {code}: {message}")]
    Protocol { code: i64, message: String },

    /// The operation is not offered by the active backend.
    #[error("Not available in {mode} mode: {operation}")]
    NotAvailable {
        operation: &'static str,
        mode: &'static str,
    },

    /// The engine or channel has been disposed.
    #[error("Engine disposed")]
    Closed,
}

impl SyncError {
    /// Transport failures are retried by the next scheduled cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;
