//! Registry interface step definitions.

use std::collections::HashMap;

use cucumber::{given, then, when, World};
use ktf::{ExitPolicy, Handle, KtfError, Registry, TestDescriptor, TestRun};

fn noop(_run: &mut TestRun<'_>, _i: i32) {}

/// Test context for registry scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct RegistryWorld {
    registry: Registry,
    modules: HashMap<String, Handle>,
    last_shutdown: Option<Result<(), KtfError>>,
    last_add: Option<Result<(), KtfError>>,
}

impl RegistryWorld {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            modules: HashMap::new(),
            last_shutdown: None,
            last_add: None,
        }
    }

    fn add(&mut self, module: String, test: String, case: String) -> Result<(), KtfError> {
        let handle = self.modules.entry(module).or_default();
        let desc = TestDescriptor::new(case, test, noop).with_file("feature.c");
        self.registry
            .try_add_test(&desc, handle, ExitPolicy::default(), 0, 0)
            .map(|_| ())
    }
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// --- Given steps ---

#[given("an empty registry")]
async fn given_empty_registry(world: &mut RegistryWorld) {
    assert_eq!(world.registry.case_count(), 0);
}

#[given(expr = "module {string} added test {string} to case {string}")]
async fn given_module_added_test(world: &mut RegistryWorld, module: String, test: String, case: String) {
    world.add(module, test, case).expect("registration should succeed");
}

// --- When steps ---

#[when(expr = "module {string} adds test {string} to case {string}")]
async fn when_module_adds_test(world: &mut RegistryWorld, module: String, test: String, case: String) {
    let result = world.add(module, test, case);
    world.last_add = Some(result);
}

#[when(expr = "case {string} is looked up twice")]
async fn when_case_looked_up_twice(world: &mut RegistryWorld, case: String) {
    let first = world.registry.find_or_create(&case).expect("valid name");
    let second = world.registry.find_or_create(&case).expect("valid name");
    assert_eq!(first, second);
}

#[when(expr = "module {string} is torn down")]
async fn when_module_torn_down(world: &mut RegistryWorld, module: String) {
    if let Some(handle) = world.modules.get_mut(&module) {
        world.registry.teardown_owner(handle);
    }
}

#[when("the registry is shut down")]
async fn when_registry_shut_down(world: &mut RegistryWorld) {
    world.last_shutdown = Some(world.registry.shutdown());
}

// --- Then steps ---

#[then(expr = "the registry has {int} test case(s)")]
async fn then_case_count(world: &mut RegistryWorld, count: usize) {
    assert_eq!(world.registry.case_count(), count);
}

#[then(expr = "case {string} lists tests {string}")]
async fn then_case_lists(world: &mut RegistryWorld, case: String, tests: String) {
    let hooks = world.registry.tests(&case).expect("case should exist");
    let names: Vec<String> = hooks.iter().map(|h| h.name().to_string()).collect();
    assert_eq!(names, split_names(&tests));
}

#[then(expr = "case {string} has no tests")]
async fn then_case_empty(world: &mut RegistryWorld, case: String) {
    let hooks = world.registry.tests(&case).expect("case should exist");
    assert!(hooks.is_empty());
}

#[then(expr = "module {string} owns {int} test(s)")]
async fn then_module_owns(world: &mut RegistryWorld, module: String, count: usize) {
    let owned = world.modules.get(&module).map_or(0, Handle::test_count);
    assert_eq!(owned, count);
}

#[then("the registration is rejected as an invalid name")]
async fn then_registration_rejected(world: &mut RegistryWorld) {
    match world.last_add.take() {
        Some(Err(KtfError::InvalidName(_))) => {}
        other => panic!("expected InvalidName, got {:?}", other),
    }
}

#[then("shutdown succeeds")]
async fn then_shutdown_succeeds(world: &mut RegistryWorld) {
    match world.last_shutdown.take() {
        Some(Ok(())) => {}
        other => panic!("expected successful shutdown, got {:?}", other),
    }
}

#[then(expr = "shutdown is refused because case {string} still has test {string}")]
async fn then_shutdown_busy(world: &mut RegistryWorld, case: String, test: String) {
    match world.last_shutdown.take() {
        Some(Err(KtfError::Busy { case: c, test: t })) => {
            assert_eq!(c, case);
            assert_eq!(t, test);
        }
        other => panic!("expected Busy, got {:?}", other),
    }
}
