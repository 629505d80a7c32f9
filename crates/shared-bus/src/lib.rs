//! # Shared Bus - Replay-on-Subscribe State Channels
//!
//! Each tracked quantity (block list, statistics, busy flags, ...) lives in its
//! own [`StateChannel`]: a state cell plus an ordered list of listeners.
//!
//! ```text
//!   publish(v) ──→ ┌───────────────────────┐
//!                  │ StateChannel<T>       │
//!                  │  current: T           │──→ listener #1 (registration order)
//!                  │  listeners: [#1, #2]  │──→ listener #2
//!                  └───────────────────────┘
//!   subscribe() ──→ new listener, receives `current` immediately
//! ```
//!
//! ## Guarantees
//!
//! - A new subscriber first receives the current value, then every later
//!   update, in publication order.
//! - Updates reach listeners in registration order.
//! - Dropping a [`Subscription`] unregisters it.
//! - After [`StateChannel::close`], pending values can still be drained but
//!   `publish` and `subscribe` fail with [`SubscriptionError::Closed`].

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod channel;
pub mod subscriber;

pub use channel::StateChannel;
pub use subscriber::{Subscription, SubscriptionError};
