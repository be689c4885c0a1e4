//! Test cases: named, ordered groups of hooks.

use crate::registry::hook::HookId;

/// A named group of tests, stored in the registry's name map.
///
/// Holds hook ids in registration order; the hooks themselves live in the
/// registry's arena and belong to the handles that registered them.
#[derive(Debug)]
pub(crate) struct TestCase {
    name: String,
    hooks: Vec<HookId>,
}

impl TestCase {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hooks: Vec::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn hooks(&self) -> &[HookId] {
        &self.hooks
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub(crate) fn reserve_one(&mut self) -> bool {
        self.hooks.try_reserve(1).is_ok()
    }

    pub(crate) fn link(&mut self, id: HookId) {
        self.hooks.push(id);
    }

    /// Remove `id`, keeping the others in order. False if it was not listed.
    pub(crate) fn unlink(&mut self, id: HookId) -> bool {
        match self.hooks.iter().position(|h| *h == id) {
            Some(index) => {
                self.hooks.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn summary(&self) -> CaseSummary {
        CaseSummary {
            name: self.name.clone(),
            tests: self.hooks.len(),
        }
    }
}

/// Snapshot of a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSummary {
    pub name: String,
    /// Number of tests currently listed.
    pub tests: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_keeps_registration_order() {
        let mut case = TestCase::new("basic");
        for id in [3, 1, 2] {
            case.link(HookId(id));
        }
        assert_eq!(case.hooks(), &[HookId(3), HookId(1), HookId(2)]);
    }

    #[test]
    fn test_unlink() {
        let mut case = TestCase::new("basic");
        case.link(HookId(1));
        case.link(HookId(2));
        case.link(HookId(3));

        assert!(case.unlink(HookId(2)));
        assert!(!case.unlink(HookId(2)));
        assert_eq!(case.hooks(), &[HookId(1), HookId(3)]);
        assert_eq!(case.summary().tests, 2);
    }
}
