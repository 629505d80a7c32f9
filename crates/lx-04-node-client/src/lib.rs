//! # lx-04-node-client
//!
//! Request/response access to a ledger node.
//!
//! ## Protocol
//!
//! ```text
//! POST <base>/jsonrpc   { version, method, params, id }
//!   ok    → { result: ... }
//!   error → { error: { code, message } }   ⇒ RpcError::Rpc
//! GET  <base>/health    best-effort validator metadata
//! ```
//!
//! ## Error Mapping
//!
//! | `RpcError` | `SyncError` |
//! |------------|-------------|
//! | `Rpc` | `Protocol { code, message }` |
//! | `Payload` | `Validation(MalformedPayload)` |
//! | `InvalidUrl` | `Validation(InvalidConfig)` |
//! | everything else | `Network` |

pub mod client;
pub mod error;
pub mod ports;
pub mod wire;

pub use client::{parse_base_url, HttpNodeClient, DEFAULT_TIMEOUT};
pub use error::{RpcError, RpcResult};
pub use ports::NodeApi;
pub use wire::{BlocksPage, ConsensusHealth, HealthStatus, WireBlock, WireTransaction};
