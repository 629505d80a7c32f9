//! # Integration Tests
//!
//! Scenarios spanning the store, the hub, both backends and the engine.

pub mod channels;
pub mod live;
pub mod race;
pub mod simulated;
