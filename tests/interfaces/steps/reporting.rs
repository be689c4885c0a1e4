//! Result reporting step definitions.

use cucumber::{given, then, when, World};
use ktf::attr::decode;
use ktf::config::ReportLimits;
use ktf::{AttrBuffer, ReportRecord, Reporter};

/// Test context for reporting scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct ReportingWorld {
    reporter: Reporter,
    message: AttrBuffer,
    last_result: Option<bool>,
}

impl ReportingWorld {
    fn new() -> Self {
        let reporter = Reporter::default();
        let message = reporter.message_buffer();
        Self {
            reporter,
            message,
            last_result: None,
        }
    }

    fn records(&self) -> Vec<ReportRecord> {
        let attrs = decode(self.message.as_bytes()).expect("well-formed message");
        ReportRecord::parse(&attrs).expect("well-formed records")
    }
}

// --- Given steps ---

#[given(expr = "a reporter with a message limit of {int} bytes")]
async fn given_reporter_with_limit(world: &mut ReportingWorld, max_message_len: usize) {
    world.reporter = Reporter::new(&ReportLimits {
        max_message_len,
        ..ReportLimits::default()
    });
    world.message = world.reporter.message_buffer();
}

// --- When steps ---

#[when(expr = "{int} assertion(s) pass")]
async fn when_assertions_pass(world: &mut ReportingWorld, count: u32) {
    for _ in 0..count {
        world.last_result = Some(world.reporter.report(
            &mut world.message,
            true,
            "t.c",
            1,
            format_args!(""),
        ));
    }
}

#[when(expr = "an assertion fails in {string} at line {int} with message {string}")]
async fn when_assertion_fails(world: &mut ReportingWorld, file: String, line: u32, message: String) {
    world.last_result = Some(world.reporter.report(
        &mut world.message,
        false,
        &file,
        line,
        format_args!("{}", message),
    ));
}

#[when(expr = "an assertion fails with a {int} byte message")]
async fn when_assertion_fails_long(world: &mut ReportingWorld, len: usize) {
    let text = "x".repeat(len);
    world.last_result = Some(world.reporter.report(
        &mut world.message,
        false,
        "t.c",
        1,
        format_args!("{}", text),
    ));
}

#[when("the message is flushed")]
async fn when_message_flushed(world: &mut ReportingWorld) {
    world.reporter.flush(&mut world.message);
}

// --- Then steps ---

#[then("the message is empty")]
async fn then_message_empty(world: &mut ReportingWorld) {
    assert!(world.message.is_empty());
}

#[then(expr = "{int} passes are pending")]
async fn then_pending(world: &mut ReportingWorld, count: u32) {
    assert_eq!(world.reporter.pending(), count);
}

#[then(expr = "the message reports {int} passes")]
async fn then_reports_passes(world: &mut ReportingWorld, count: u32) {
    assert_eq!(world.records(), vec![ReportRecord::Passed(count)]);
}

#[then(expr = "the message reports {int} passes then a failure in {string} at line {int} with message {string}")]
async fn then_reports_passes_then_failure(
    world: &mut ReportingWorld,
    count: u32,
    file: String,
    line: u32,
    message: String,
) {
    assert_eq!(
        world.records(),
        vec![
            ReportRecord::Passed(count),
            ReportRecord::Failure {
                code: 0,
                file,
                line,
                message,
            },
        ]
    );
}

#[then(expr = "the message reports only a failure with a {int} byte message")]
async fn then_reports_truncated_failure(world: &mut ReportingWorld, len: usize) {
    let records = world.records();
    assert_eq!(records.len(), 1);
    match &records[0] {
        ReportRecord::Failure { message, .. } => assert_eq!(message.len(), len),
        other => panic!("expected a failure record, got {:?}", other),
    }
}

#[then("the assertion evaluates to false")]
async fn then_assertion_false(world: &mut ReportingWorld) {
    assert_eq!(world.last_result, Some(false));
}
