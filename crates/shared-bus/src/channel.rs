//! # State Channel
//!
//! The publishing side: a state cell plus registration-ordered listeners.

use crate::subscriber::{ListenerId, Subscription, SubscriptionError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

pub(crate) struct ChannelInner<T> {
    pub(crate) current: T,
    pub(crate) listeners: Vec<(ListenerId, mpsc::UnboundedSender<T>)>,
    pub(crate) next_id: ListenerId,
    pub(crate) closed: bool,
}

/// A broadcast cell with replay semantics.
///
/// Cloning the channel yields another handle to the same cell.
pub struct StateChannel<T> {
    name: &'static str,
    inner: Arc<Mutex<ChannelInner<T>>>,
    published: Arc<AtomicU64>,
}

impl<T> Clone for StateChannel<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Arc::clone(&self.inner),
            published: Arc::clone(&self.published),
        }
    }
}

impl<T: Clone + Send + 'static> StateChannel<T> {
    /// Create a channel holding `initial`.
    #[must_use]
    pub fn new(name: &'static str, initial: T) -> Self {
        Self {
            name,
            inner: Arc::new(Mutex::new(ChannelInner {
                current: initial,
                listeners: Vec::new(),
                next_id: 0,
                closed: false,
            })),
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a listener. The current value is queued for it immediately.
    pub fn subscribe(&self) -> Result<Subscription<T>, SubscriptionError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(SubscriptionError::Closed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive, so this send cannot fail.
        let _ = tx.send(inner.current.clone());

        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, tx));

        debug!(channel = self.name, listener = id, "Listener registered");
        Ok(Subscription::new(id, rx, Arc::downgrade(&self.inner)))
    }

    /// Replace the current value and deliver it to every listener.
    ///
    /// Returns the number of listeners reached. Listeners whose receiving
    /// side has gone away are pruned.
    pub fn publish(&self, value: T) -> Result<usize, SubscriptionError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(SubscriptionError::Closed);
        }

        inner.current = value;
        let current = inner.current.clone();
        inner
            .listeners
            .retain(|(_, tx)| tx.send(current.clone()).is_ok());

        self.published.fetch_add(1, Ordering::Relaxed);
        let reached = inner.listeners.len();
        trace!(channel = self.name, receivers = reached, "Value published");
        Ok(reached)
    }

    /// Publish only when the value differs from the current one.
    ///
    /// Returns `Ok(false)` when nothing was sent.
    pub fn publish_if_changed(&self, value: T) -> Result<bool, SubscriptionError>
    where
        T: PartialEq,
    {
        if self.inner.lock().current == value {
            return Ok(false);
        }
        self.publish(value).map(|_| true)
    }

    /// Clone of the current value.
    #[must_use]
    pub fn current(&self) -> T {
        self.inner.lock().current.clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with_current<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.lock().current)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Total successful publications.
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Flush listeners and reject further use. Idempotent.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        let dropped = inner.listeners.len();
        inner.listeners.clear();
        debug!(channel = self.name, listeners = dropped, "Channel closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}
