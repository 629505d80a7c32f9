//! # Subscriptions
//!
//! The receiving side of a [`StateChannel`](crate::StateChannel).

use crate::channel::ChannelInner;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

pub(crate) type ListenerId = u64;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The channel was closed.
    #[error("State channel closed")]
    Closed,
}

/// A registered listener.
///
/// When dropped, the listener is removed from its channel.
pub struct Subscription<T> {
    id: ListenerId,
    receiver: mpsc::UnboundedReceiver<T>,
    channel: Weak<Mutex<ChannelInner<T>>>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        id: ListenerId,
        receiver: mpsc::UnboundedReceiver<T>,
        channel: Weak<Mutex<ChannelInner<T>>>,
    ) -> Self {
        Self {
            id,
            receiver,
            channel,
        }
    }

    /// Wait for the next value.
    ///
    /// # Returns
    ///
    /// - `Some(value)` - the next value, in publication order
    /// - `None` - the channel was closed and every queued value was drained
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Take the next queued value without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` - a value was queued
    /// - `Ok(None)` - nothing queued yet
    /// - `Err(SubscriptionError::Closed)` - closed and drained
    pub fn try_recv(&mut self) -> Result<Option<T>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Drain the queue and keep only the newest value.
    pub fn latest(&mut self) -> Result<Option<T>, SubscriptionError> {
        let mut newest = None;
        loop {
            match self.try_recv() {
                Ok(Some(value)) => newest = Some(value),
                Ok(None) => return Ok(newest),
                Err(e) if newest.is_none() => return Err(e),
                Err(_) => return Ok(newest),
            }
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let Some(channel) = self.channel.upgrade() else {
            return;
        };
        channel.lock().listeners.retain(|(id, _)| *id != self.id);
        debug!(listener = self.id, "Listener unregistered");
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
