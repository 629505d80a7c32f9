//! # Shared Types Crate
//!
//! This crate contains the validated value types, the ledger entities and the
//! error taxonomy used by every ledger-sync subsystem.
//!
//! ## Design Principles
//!
//! - **Validate once**: `Hash`, `Address`, `AtomicAmount`, `Height` and
//!   `CommitteeId` can only be built through checked constructors. Anything
//!   holding one of these types is known to be well formed.
//! - **Single Source of Truth**: both backends (simulator and live poller)
//!   produce the same entities, so consumers never branch on the mode.
//! - **Absence is not an error**: point lookups return `Option`, errors are
//!   reserved for the taxonomy in [`errors`].

pub mod backend;
pub mod entities;
pub mod errors;
pub mod values;

pub use backend::SyncBackend;
pub use entities::*;
pub use errors::*;
pub use values::*;
