//! # Ledger-Sync Test Suite
//!
//! Cross-crate scenarios that exercise the engine end to end.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── simulated.rs   # seeded history, eviction, finality, determinism
//!     ├── live.rs        # live backend over HTTP against a mock node
//!     ├── race.rs        # refresh overlapping an older-page load
//!     └── channels.rs    # replay-on-subscribe delivery through the engine
//!
//! tests/benches/
//! └── sync_benchmarks.rs # block generation and window replacement
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lx-tests
//! cargo test -p lx-tests integration::live::
//! cargo bench -p lx-tests
//! ```

pub mod integration;
