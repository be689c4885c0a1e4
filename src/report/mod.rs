//! Assertion reporting.
//!
//! Passing assertions are only counted. The count is flushed as a single
//! `Stat` attribute right before the next failure record, or when the owner
//! of the outgoing message calls [`Reporter::flush`] before sending it.
//! Assertion volume dwarfs failure volume, so this keeps the channel quiet.

mod channel;
mod counter;

use core::fmt;

use tracing::{debug, error, warn};

pub use channel::{bounded_message, ResultChannel};
pub use counter::AssertionCounter;

use crate::attr::{AttrBuffer, AttributeSink};
use crate::config::ReportLimits;

/// Result code carried by a failure record.
pub const RESULT_FAILED: u32 = 0;

/// Turns assertion outcomes into result attributes.
#[derive(Debug)]
pub struct Reporter {
    asserts: AssertionCounter,
    max_message_len: usize,
    channel_capacity: usize,
}

impl Reporter {
    pub fn new(limits: &ReportLimits) -> Self {
        Self {
            asserts: AssertionCounter::new(),
            max_message_len: limits.max_message_len,
            channel_capacity: limits.channel_capacity,
        }
    }

    /// Passes counted since the last flush.
    pub fn pending(&self) -> u32 {
        self.asserts.pending()
    }

    pub fn max_message_len(&self) -> usize {
        self.max_message_len
    }

    /// An empty outgoing message sized for this reporter's limits.
    pub fn message_buffer(&self) -> AttrBuffer {
        AttrBuffer::new(self.channel_capacity)
    }

    /// Record one assertion outcome and return `passed` unchanged.
    ///
    /// A pass only bumps the pending count. A failure flushes the pending
    /// count (if non-zero), then appends result code, file, line and the
    /// formatted message, truncated to the configured bound. Encoding
    /// problems are logged and otherwise ignored.
    pub fn report<S>(
        &self,
        sink: &mut S,
        passed: bool,
        file: &str,
        line: u32,
        args: fmt::Arguments<'_>,
    ) -> bool
    where
        S: AttributeSink + ?Sized,
    {
        if passed {
            self.asserts.record_pass();
            return passed;
        }

        let mut channel = ResultChannel::new(sink);
        self.flush_into(&mut channel);

        let message = bounded_message(args, self.max_message_len);
        if let Err(e) = channel.put_failure(RESULT_FAILED, file, line, &message) {
            warn!(file, line, error = %e, "Dropped failure record");
        }
        error!(
            file,
            line,
            result = RESULT_FAILED,
            "Assertion failed: {}",
            message
        );
        passed
    }

    /// Emit the pending pass count, if any. Returns the count emitted.
    pub fn flush<S>(&self, sink: &mut S) -> u32
    where
        S: AttributeSink + ?Sized,
    {
        self.flush_into(&mut ResultChannel::new(sink))
    }

    fn flush_into<S>(&self, channel: &mut ResultChannel<'_, S>) -> u32
    where
        S: AttributeSink + ?Sized,
    {
        let count = self.asserts.take();
        if count == 0 {
            return 0;
        }
        match channel.put_count(count) {
            Ok(()) => {
                debug!(count, "update: asserts");
                count
            }
            Err(e) => {
                self.asserts.restore(count);
                warn!(count, error = %e, "Could not flush assertion count, keeping it pending");
                0
            }
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(&ReportLimits::default())
    }
}

/// What a test body reports through while it runs.
pub struct TestRun<'a> {
    reporter: &'a Reporter,
    sink: &'a mut dyn AttributeSink,
}

impl<'a> TestRun<'a> {
    pub fn new(reporter: &'a Reporter, sink: &'a mut dyn AttributeSink) -> Self {
        Self { reporter, sink }
    }

    /// See [`Reporter::report`]. Usually reached through [`fail_unless!`](crate::fail_unless).
    pub fn report(&mut self, passed: bool, file: &str, line: u32, args: fmt::Arguments<'_>) -> bool {
        self.reporter.report(&mut *self.sink, passed, file, line, args)
    }

    pub fn flush(&mut self) -> u32 {
        self.reporter.flush(&mut *self.sink)
    }
}

/// Report `cond` with the caller's file and line.
///
/// Evaluates to the condition, so it can guard the rest of a test body.
///
/// ```ignore
/// if !fail_unless!(run, rx.len() == 3, "got {} frames", rx.len()) {
///     return;
/// }
/// ```
#[macro_export]
macro_rules! fail_unless {
    ($run:expr, $cond:expr $(,)?) => {
        $run.report(
            $cond,
            file!(),
            line!(),
            format_args!("Failure '{}' occurred", stringify!($cond)),
        )
    };
    ($run:expr, $cond:expr, $($arg:tt)+) => {
        $run.report($cond, file!(), line!(), format_args!($($arg)+))
    };
}

/// Report that `cond` holds.
#[macro_export]
macro_rules! ktf_assert {
    ($run:expr, $cond:expr $(,)?) => {
        $crate::fail_unless!($run, $cond)
    };
}

/// Report that two values are equal, logging both on failure.
#[macro_export]
macro_rules! ktf_assert_eq {
    ($run:expr, $left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => $run.report(
                *left == *right,
                file!(),
                line!(),
                format_args!(
                    "Assertion '{}' == '{}' failed: {:?} != {:?}",
                    stringify!($left),
                    stringify!($right),
                    left,
                    right
                ),
            ),
        }
    };
}
