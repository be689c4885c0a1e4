//! Test case registry.
//!
//! Tests are [`Hook`]s listed in two places: the ordered hook list of their
//! test case (used for running) and the [`Handle`] of the module that
//! registered them (used for cleanup). Both lists hold ids into one arena,
//! and a single lock covers the case map, the arena and every list, so a
//! hook is linked into both lists or neither and is removed exactly once.

mod case;
mod handle;
mod hook;

use std::collections::HashMap;

use ktf_map::NameMap;
use spin::Mutex;
use tracing::{debug, error, warn};

pub use case::CaseSummary;
pub use handle::{Handle, HandleId};
pub use hook::{ExitPolicy, Hook, HookId, TestDescriptor, TestFn};

use crate::config::KtfConfig;
use crate::error::{KtfError, KtfResult};
use crate::report::Reporter;
use case::TestCase;

/// Everything the registry lock protects.
#[derive(Debug, Default)]
struct RegistryInner {
    cases: NameMap<TestCase>,
    hooks: HashMap<HookId, Hook>,
}

/// Find `name` or create it empty, in one step under the caller's lock.
///
/// The flag is true when this call created the case.
fn find_or_create<'a>(
    cases: &'a mut NameMap<TestCase>,
    name: &str,
) -> KtfResult<(&'a mut TestCase, bool)> {
    let (case, created) = cases.get_or_insert_with(name, || TestCase::new(name))?;
    if created {
        debug!(case = %case.name(), "Added test set");
    }
    Ok((case, created))
}

/// Undo [`find_or_create`] after a later step of the same call failed.
fn abandon_case(cases: &mut NameMap<TestCase>, name: &str, created: bool) {
    if created && cases.remove(name).is_some() {
        debug!(case = %name, "Removed test set created by a failed registration");
    }
}

/// The set of test cases known to one test framework instance.
#[derive(Debug)]
pub struct Registry {
    inner: Mutex<RegistryInner>,
    reporter: Reporter,
}

impl Registry {
    /// Create an empty registry with default limits.
    pub fn new() -> Self {
        Self::with_config(&KtfConfig::default())
    }

    /// Create an empty registry with the limits of `config`.
    pub fn with_config(config: &KtfConfig) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            reporter: Reporter::new(&config.limits),
        }
    }

    /// Reporter that tests of this registry report through.
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Number of test cases.
    pub fn case_count(&self) -> usize {
        self.inner.lock().cases.len()
    }

    /// Number of live tests across all cases.
    pub fn test_count(&self) -> usize {
        self.inner.lock().hooks.len()
    }

    /// Exact lookup; never creates.
    pub fn find(&self, name: &str) -> Option<CaseSummary> {
        self.inner.lock().cases.get(name).map(TestCase::summary)
    }

    /// Look up a test case, creating it empty if it does not exist.
    ///
    /// Concurrent callers with the same name all get the same case.
    pub fn find_or_create(&self, name: &str) -> KtfResult<CaseSummary> {
        let mut inner = self.inner.lock();
        find_or_create(&mut inner.cases, name).map(|(case, _)| case.summary())
    }

    /// Case names in key order.
    pub fn case_names(&self) -> Vec<String> {
        self.inner.lock().cases.keys().cloned().collect()
    }

    /// Snapshot of the tests of `case`, in registration order.
    pub fn tests(&self, case: &str) -> Option<Vec<Hook>> {
        let inner = self.inner.lock();
        let case = inner.cases.get(case)?;
        Some(
            case.hooks()
                .iter()
                .filter_map(|id| inner.hooks.get(id).cloned())
                .collect(),
        )
    }

    /// Register a test, logging instead of returning any failure.
    ///
    /// A failed registration leaves no trace in the registry or the handle.
    pub fn add_test(
        &self,
        desc: &TestDescriptor,
        handle: &mut Handle,
        exit: ExitPolicy,
        start: i32,
        end: i32,
    ) {
        if let Err(e) = self.try_add_test(desc, handle, exit, start, end) {
            error!(
                test = %desc.name,
                file = %desc.file,
                case = %desc.case,
                error = %e,
                "Failed to add test to test case"
            );
        }
    }

    /// Register a test and return its id.
    ///
    /// Space in every list is reserved before anything is linked. On error
    /// nothing is left behind, including a case this call created.
    pub fn try_add_test(
        &self,
        desc: &TestDescriptor,
        handle: &mut Handle,
        exit: ExitPolicy,
        start: i32,
        end: i32,
    ) -> KtfResult<HookId> {
        handle
            .tests
            .try_reserve(1)
            .map_err(|_| KtfError::NoMemory("reserving handle test list"))?;

        let mut inner = self.inner.lock();
        let RegistryInner { cases, hooks } = &mut *inner;

        hooks
            .try_reserve(1)
            .map_err(|_| KtfError::NoMemory("reserving hook arena"))?;
        let (case, created) = find_or_create(cases, &desc.case)?;
        if !case.reserve_one() {
            abandon_case(cases, &desc.case, created);
            return Err(KtfError::NoMemory("reserving test case hook list"));
        }

        let id = HookId::next();
        let hook = Hook {
            id,
            name: desc.name.clone(),
            case: desc.case.clone(),
            file: desc.file.clone(),
            func: desc.func,
            start,
            end,
            exit,
            owner: handle.id(),
        };

        debug!(
            case = %desc.case,
            test = %desc.name,
            start,
            end,
            "Added test"
        );
        case.link(id);
        hooks.insert(id, hook);
        handle.tests.push(id);
        Ok(id)
    }

    /// Remove every test registered through `handle`. Returns how many.
    ///
    /// Only hooks this registry holds for `handle` are removed; ids the
    /// handle got from another registry stay on the handle. Cases are left
    /// in place, possibly empty.
    pub fn teardown_owner(&self, handle: &mut Handle) -> usize {
        if handle.tests.is_empty() {
            return 0;
        }

        let owner = handle.id();
        let mut inner = self.inner.lock();
        let RegistryInner { cases, hooks } = &mut *inner;

        let mut removed = 0;
        handle.tests.retain(|id| {
            if !hooks.get(id).is_some_and(|hook| hook.owner == owner) {
                return true;
            }
            if let Some(hook) = hooks.remove(id) {
                if let Some(case) = cases.get_mut(&hook.case) {
                    case.unlink(*id);
                }
                debug!(case = %hook.case, test = %hook.name, "Deleted test");
                removed += 1;
            }
            false
        });
        removed
    }

    /// Delete all test cases, or report the first case that still has tests.
    ///
    /// On `Busy` nothing is changed; the owners of the remaining tests must
    /// tear them down before shutdown can succeed.
    pub fn shutdown(&self) -> KtfResult<()> {
        let mut inner = self.inner.lock();

        if let Some(case) = inner.cases.values().find(|case| !case.is_empty()) {
            let test = case
                .hooks()
                .first()
                .and_then(|id| inner.hooks.get(id))
                .map(|hook| hook.name.clone())
                .unwrap_or_default();
            warn!(
                case = %case.name(),
                test = %test,
                "(memory leak) test set still active at unload"
            );
            return Err(KtfError::Busy {
                case: case.name().to_string(),
                test,
            });
        }

        let count = inner.cases.len();
        inner.cases.clear();
        debug!(cases = count, "Deleted all test cases");
        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
