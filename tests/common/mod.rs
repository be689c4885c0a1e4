//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Once;

use ktf::{TestDescriptor, TestRun};

static INIT_LOGGING: Once = Once::new();

/// Route tracing output through the test harness, once per binary.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

pub fn noop(_run: &mut TestRun<'_>, _i: i32) {}

/// Descriptor for a test that does nothing.
pub fn desc(case: &str, name: &str) -> TestDescriptor {
    TestDescriptor::new(case, name, noop).with_file("t.c")
}
