//! Pending pass counter.

use core::sync::atomic::{AtomicU32, Ordering};

/// Consecutive passing assertions not yet reported.
///
/// Shared by every test run reporting through the same [`Reporter`](super::Reporter).
/// Increments and the flush are single atomic operations, so concurrent runs
/// neither lose nor double-count passes, although their passes are pooled into
/// whichever flush happens next.
#[derive(Debug, Default)]
pub struct AssertionCounter {
    pending: AtomicU32,
}

impl AssertionCounter {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// Count one passing assertion. Wraps at `u32::MAX`.
    pub fn record_pass(&self) {
        self.pending.fetch_add(1, Ordering::Relaxed);
    }

    /// Current pending count (for diagnostics and tests)
    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Take the pending count, leaving zero behind.
    pub fn take(&self) -> u32 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    /// Put back a count whose flush could not be delivered.
    pub fn restore(&self, count: u32) {
        self.pending.fetch_add(count, Ordering::Relaxed);
    }
}
