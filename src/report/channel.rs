//! Typed view over an attribute sink.

use core::fmt::{self, Write};

use tracing::debug;

use crate::attr::{self, AttrError, AttrType, AttributeSink};

/// Writes the fields of a result message.
pub struct ResultChannel<'a, S: AttributeSink + ?Sized> {
    sink: &'a mut S,
}

impl<'a, S: AttributeSink + ?Sized> ResultChannel<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self { sink }
    }

    /// Emit a running pass count.
    pub fn put_count(&mut self, count: u32) -> Result<(), AttrError> {
        self.sink.put_u32(AttrType::Stat, count)
    }

    /// Emit a complete failure record, or nothing if it does not fit.
    pub fn put_failure(
        &mut self,
        code: u32,
        file: &str,
        line: u32,
        message: &str,
    ) -> Result<(), AttrError> {
        for value in [file, message] {
            let payload = attr::string_payload_len(value);
            if payload > attr::MAX_ATTR_PAYLOAD {
                return Err(AttrError::TooLarge(payload));
            }
        }

        let needed = attr::attr_size(4) * 2
            + attr::string_attr_size(file)
            + attr::string_attr_size(message);
        let remaining = self.sink.remaining();
        if needed > remaining {
            return Err(AttrError::NoSpace { needed, remaining });
        }

        self.sink.put_u32(AttrType::Stat, code)?;
        self.sink.put_string(AttrType::File, file)?;
        self.sink.put_u32(AttrType::Num, line)?;
        self.sink.put_string(AttrType::Str, message)
    }
}

/// `fmt::Write` target that silently drops everything past `limit` bytes.
struct BoundedWriter {
    buf: String,
    limit: usize,
}

impl Write for BoundedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.limit - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.buf.push_str(&s[..cut]);
        // Keep going: later pieces may be empty, and truncation is not an error.
        self.limit = self.buf.len();
        Ok(())
    }
}

/// Format `args` into at most `max_len - 1` bytes.
///
/// One byte of `max_len` is left for the terminator the wire format adds.
/// Truncation never splits a UTF-8 character.
pub fn bounded_message(args: fmt::Arguments<'_>, max_len: usize) -> String {
    let limit = max_len.saturating_sub(1);
    let mut writer = BoundedWriter {
        buf: String::with_capacity(limit.min(256)),
        limit,
    };
    // BoundedWriter never fails; an error here can only come from a Display impl.
    if writer.write_fmt(args).is_err() {
        debug!(len = writer.buf.len(), "Formatting error cut the failure message short");
    }
    writer.buf
}
