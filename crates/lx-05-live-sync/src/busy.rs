//! Re-entrancy guard for one in-flight operation.

use lx_02_distribution_hub::{BusyFlag, StateHub};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Held while an operation runs. Publishes the flag on entry and clears it
/// on drop, whichever way the operation ends.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    hub: &'a StateHub,
    kind: BusyFlag,
}

impl<'a> BusyGuard<'a> {
    /// `None` when the same operation is already in flight.
    pub(crate) fn acquire(flag: &'a AtomicBool, hub: &'a StateHub, kind: BusyFlag) -> Option<Self> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        if let Err(e) = hub.set_busy(kind, true) {
            debug!(?kind, error = %e, "Busy flag not published");
        }
        Some(Self { flag, hub, kind })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        // The hub may already be closed during teardown.
        let _ = self.hub.set_busy(self.kind, false);
    }
}
