//! Registration handles.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use crate::registry::hook::HookId;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Identifier of a [`Handle`], unique within the process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(u64);

/// The registration context of one test module.
///
/// Every test added through a handle is removed when the handle is passed
/// to [`Registry::teardown_owner`](crate::Registry::teardown_owner). A module
/// must do that before it goes away; otherwise its tests stay registered and
/// the registry refuses to shut down.
#[derive(Debug)]
pub struct Handle {
    id: HandleId,
    pub(crate) tests: Vec<HookId>,
}

impl Handle {
    pub fn new() -> Self {
        Self {
            id: HandleId(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)),
            tests: Vec::new(),
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Tests registered through this handle and not yet torn down.
    pub fn tests(&self) -> &[HookId] {
        &self.tests
    }

    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.tests.is_empty() {
            warn!(
                handle = self.id.0,
                tests = self.tests.len(),
                "Handle dropped with tests still registered"
            );
        }
    }
}
