//! Registered test functions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::registry::handle::HandleId;
use crate::report::TestRun;

/// Body of a test. The second argument is the loop index of a ranged test.
pub type TestFn = fn(&mut TestRun<'_>, i32);

static NEXT_HOOK: AtomicU64 = AtomicU64::new(1);

/// Identifier of a hook, unique within the process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HookId(pub(crate) u64);

impl HookId {
    pub(crate) fn next() -> Self {
        HookId(NEXT_HOOK.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook#{}", self.0)
    }
}

/// What a test module declares about one test.
#[derive(Debug, Clone)]
pub struct TestDescriptor {
    pub case: String,
    pub name: String,
    pub file: String,
    pub func: TestFn,
}

impl TestDescriptor {
    pub fn new(case: impl Into<String>, name: impl Into<String>, func: TestFn) -> Self {
        Self {
            case: case.into(),
            name: name.into(),
            file: String::new(),
            func,
        }
    }

    /// Record the source file the test is defined in.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }
}

/// Build a [`TestDescriptor`] stamped with the caller's source file.
#[macro_export]
macro_rules! test_descriptor {
    ($case:expr, $name:expr, $func:expr $(,)?) => {
        $crate::TestDescriptor::new($case, $name, $func).with_file(file!())
    };
}

/// How the runner should judge a test's exit. Carried, never interpreted here.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ExitPolicy {
    /// Signal the test is expected to raise, 0 for none.
    pub signal: i32,
    /// Exit value that still counts as success.
    pub allowed_exit_value: i32,
}

impl ExitPolicy {
    pub fn new(signal: i32, allowed_exit_value: i32) -> Self {
        Self {
            signal,
            allowed_exit_value,
        }
    }
}

/// One registered test.
///
/// Listed in exactly one test case and owned by exactly one handle. Values
/// handed out by the registry are snapshots; the registry keeps the original.
#[derive(Debug, Clone)]
pub struct Hook {
    pub(crate) id: HookId,
    pub(crate) name: String,
    pub(crate) case: String,
    pub(crate) file: String,
    pub(crate) func: TestFn,
    pub(crate) start: i32,
    pub(crate) end: i32,
    pub(crate) exit: ExitPolicy,
    pub(crate) owner: HandleId,
}

impl Hook {
    pub fn id(&self) -> HookId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the test case this hook is listed in.
    pub fn case(&self) -> &str {
        &self.case
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn func(&self) -> TestFn {
        self.func
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    /// A ranged test runs once per value in `start..end`.
    pub fn is_ranged(&self) -> bool {
        self.start != self.end
    }

    pub fn exit_policy(&self) -> ExitPolicy {
        self.exit
    }

    /// Handle that registered this hook.
    pub fn owner(&self) -> HandleId {
        self.owner
    }
}
