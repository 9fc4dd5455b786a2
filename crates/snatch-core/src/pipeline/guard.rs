//! Single-run-at-a-time guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Held for the lifetime of one run; releases the slot when dropped, including
/// while unwinding from a panic on the run thread.
#[derive(Debug)]
pub(super) struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl RunGuard {
    /// Claims the slot, or `None` if a run already holds it.
    pub(super) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
