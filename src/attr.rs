//! Result attribute encoding.
//!
//! Results travel to the listener as a flat sequence of netlink-style
//! attributes:
//!
//! ```text
//! +---------+---------+-------------------+---------+
//! | len u16 | type u16| payload           | padding |
//! +---------+---------+-------------------+---------+
//!   len = 4 + payload length (padding excluded)
//!   padding brings the attribute to a 4 byte boundary
//! ```
//!
//! Integers are native-endian `u32`. Strings are NUL-terminated and the
//! terminator is part of the payload.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use ktf_ffi::KernelError;

use crate::config::DEFAULT_CHANNEL_CAPACITY;

/// Attribute header size in bytes.
pub const ATTR_HEADER_LEN: usize = 4;
/// Attribute alignment.
pub const ATTR_ALIGN: usize = 4;
/// Largest payload a `u16` length can describe.
pub const MAX_ATTR_PAYLOAD: usize = u16::MAX as usize - ATTR_HEADER_LEN;
/// Space reserved for the source file name when sizing a failure record.
pub const FILE_NAME_BUDGET: usize = 256;

/// Round `len` up to the attribute alignment.
pub const fn align(len: usize) -> usize {
    (len + ATTR_ALIGN - 1) & !(ATTR_ALIGN - 1)
}

/// Bytes taken by one attribute carrying `payload` bytes, padding included.
pub const fn attr_size(payload: usize) -> usize {
    align(ATTR_HEADER_LEN + payload)
}

/// Payload length of a string attribute: the text up to the first NUL, plus the terminator.
pub fn string_payload_len(value: &str) -> usize {
    c_str(value).len() + 1
}

/// Bytes taken by a string attribute, terminator included.
pub fn string_attr_size(value: &str) -> usize {
    attr_size(string_payload_len(value))
}

/// Worst-case size of a flushed count plus one failure record.
pub const fn failure_record_size(max_message_len: usize) -> usize {
    attr_size(4) // pending pass count
        + attr_size(4) // result code
        + attr_size(FILE_NAME_BUDGET)
        + attr_size(4) // line
        + attr_size(max_message_len)
}

/// The text a string attribute actually carries: everything up to the first NUL.
fn c_str(value: &str) -> &str {
    match value.find('\0') {
        Some(end) => &value[..end],
        None => value,
    }
}

/// Attribute identifiers understood by the result listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum AttrType {
    /// Source line number.
    Num = 5,
    /// Formatted failure message.
    Str = 6,
    /// Source file name.
    File = 7,
    /// Pass count, or result code of a failure.
    Stat = 8,
}

impl AttrType {
    /// Parse an attribute type from its wire value.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            5 => Some(Self::Num),
            6 => Some(Self::Str),
            7 => Some(Self::File),
            8 => Some(Self::Stat),
            _ => None,
        }
    }

    fn is_string(self) -> bool {
        matches!(self, Self::Str | Self::File)
    }
}

/// Errors from attribute encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttrError {
    #[error("Attribute needs {needed} bytes, {remaining} left in message")]
    NoSpace { needed: usize, remaining: usize },

    #[error("Attribute payload of {0} bytes exceeds the attribute length field")]
    TooLarge(usize),

    #[error("Malformed attribute at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    #[error("Unknown attribute type {0}")]
    UnknownType(u16),

    #[error("String attribute is not NUL-terminated UTF-8")]
    InvalidString,

    #[error("Unexpected {0:?} attribute in result sequence")]
    Unexpected(AttrType),
}

impl AttrError {
    pub fn kernel_error(&self) -> KernelError {
        match self {
            AttrError::NoSpace { .. } | AttrError::TooLarge(_) => KernelError::EMSGSIZE,
            _ => KernelError::EINVAL,
        }
    }
}

/// Append-only attribute primitive provided by the transport.
pub trait AttributeSink {
    /// Bytes still available in the outgoing message.
    fn remaining(&self) -> usize;

    /// Append a `u32` attribute.
    fn put_u32(&mut self, kind: AttrType, value: u32) -> Result<(), AttrError>;

    /// Append a NUL-terminated string attribute.
    ///
    /// Text after an embedded NUL is not transmitted.
    fn put_string(&mut self, kind: AttrType, value: &str) -> Result<(), AttrError>;
}

/// In-memory outgoing message with a fixed capacity.
#[derive(Debug, Clone)]
pub struct AttrBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl AttrBuffer {
    /// Create an empty message that can grow up to `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Hand the encoded message to the transport.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Decode what has been written so far.
    pub fn attrs(&self) -> Result<Vec<Attr>, AttrError> {
        decode(&self.buf)
    }

    fn reserve_attr(&self, payload: usize) -> Result<(), AttrError> {
        if payload > MAX_ATTR_PAYLOAD {
            return Err(AttrError::TooLarge(payload));
        }
        let needed = attr_size(payload);
        let remaining = self.remaining();
        if needed > remaining {
            return Err(AttrError::NoSpace { needed, remaining });
        }
        Ok(())
    }

    fn put_header(&mut self, kind: AttrType, payload: usize) {
        self.buf.put_u16_ne((ATTR_HEADER_LEN + payload) as u16);
        self.buf.put_u16_ne(kind as u16);
    }

    fn put_padding(&mut self, payload: usize) {
        let unpadded = ATTR_HEADER_LEN + payload;
        self.buf.put_bytes(0, align(unpadded) - unpadded);
    }
}

impl Default for AttrBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl AttributeSink for AttrBuffer {
    fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.buf.len())
    }

    fn put_u32(&mut self, kind: AttrType, value: u32) -> Result<(), AttrError> {
        self.reserve_attr(4)?;
        self.put_header(kind, 4);
        self.buf.put_u32_ne(value);
        Ok(())
    }

    fn put_string(&mut self, kind: AttrType, value: &str) -> Result<(), AttrError> {
        let text = c_str(value);
        let payload = string_payload_len(value);
        self.reserve_attr(payload)?;
        self.put_header(kind, payload);
        self.buf.put_slice(text.as_bytes());
        self.buf.put_u8(0);
        self.put_padding(payload);
        Ok(())
    }
}

/// Decoded attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    U32(u32),
    Str(String),
}

/// One decoded attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub kind: AttrType,
    pub value: AttrValue,
}

impl Attr {
    pub fn as_u32(&self) -> Option<u32> {
        match self.value {
            AttrValue::U32(v) => Some(v),
            AttrValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            AttrValue::Str(s) => Some(s),
            AttrValue::U32(_) => None,
        }
    }
}

/// Decode a message into its attributes, in order.
pub fn decode(data: &[u8]) -> Result<Vec<Attr>, AttrError> {
    let mut attrs = Vec::new();
    let mut cursor = data;

    while cursor.has_remaining() {
        let offset = data.len() - cursor.remaining();
        if cursor.remaining() < ATTR_HEADER_LEN {
            return Err(AttrError::Malformed {
                offset,
                reason: "truncated header",
            });
        }
        let len = cursor.get_u16_ne() as usize;
        let raw_type = cursor.get_u16_ne();
        if len < ATTR_HEADER_LEN {
            return Err(AttrError::Malformed {
                offset,
                reason: "length shorter than header",
            });
        }
        let payload_len = len - ATTR_HEADER_LEN;
        if payload_len > cursor.remaining() {
            return Err(AttrError::Malformed {
                offset,
                reason: "payload runs past end of message",
            });
        }
        let kind = AttrType::from_u16(raw_type).ok_or(AttrError::UnknownType(raw_type))?;
        let payload = &cursor[..payload_len];

        let value = if kind.is_string() {
            let (last, text) = payload.split_last().ok_or(AttrError::InvalidString)?;
            if *last != 0 {
                return Err(AttrError::InvalidString);
            }
            let text = std::str::from_utf8(text).map_err(|_| AttrError::InvalidString)?;
            AttrValue::Str(text.to_string())
        } else {
            if payload_len != 4 {
                return Err(AttrError::Malformed {
                    offset,
                    reason: "integer attribute is not 4 bytes",
                });
            }
            let mut raw = payload;
            AttrValue::U32(raw.get_u32_ne())
        };
        attrs.push(Attr { kind, value });

        // The last attribute may omit its padding.
        let padded = align(len) - ATTR_HEADER_LEN;
        cursor.advance(padded.min(cursor.remaining()));
    }

    Ok(attrs)
}

/// One logical entry of a result message, as the listener sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRecord {
    /// Consecutive passing assertions since the last flush.
    Passed(u32),
    /// A failed assertion.
    Failure {
        code: u32,
        file: String,
        line: u32,
        message: String,
    },
}

impl ReportRecord {
    /// Group a decoded attribute sequence into records.
    ///
    /// A `Stat` followed by `File` starts a failure record
    /// (`Stat`, `File`, `Num`, `Str`); a lone `Stat` is a pass count.
    pub fn parse(attrs: &[Attr]) -> Result<Vec<ReportRecord>, AttrError> {
        let mut records = Vec::new();
        let mut iter = attrs.iter().peekable();

        while let Some(attr) = iter.next() {
            let stat = match (attr.kind, attr.as_u32()) {
                (AttrType::Stat, Some(v)) => v,
                _ => return Err(AttrError::Unexpected(attr.kind)),
            };

            if !matches!(iter.peek(), Some(next) if next.kind == AttrType::File) {
                records.push(ReportRecord::Passed(stat));
                continue;
            }

            let file = expect_str(iter.next(), AttrType::File)?;
            let line = expect_u32(iter.next(), AttrType::Num)?;
            let message = expect_str(iter.next(), AttrType::Str)?;
            records.push(ReportRecord::Failure {
                code: stat,
                file,
                line,
                message,
            });
        }

        Ok(records)
    }
}

fn expect_str(attr: Option<&Attr>, kind: AttrType) -> Result<String, AttrError> {
    match attr {
        Some(a) if a.kind == kind => a
            .as_str()
            .map(str::to_string)
            .ok_or(AttrError::Unexpected(a.kind)),
        Some(a) => Err(AttrError::Unexpected(a.kind)),
        None => Err(AttrError::Malformed {
            offset: 0,
            reason: "failure record is incomplete",
        }),
    }
}

fn expect_u32(attr: Option<&Attr>, kind: AttrType) -> Result<u32, AttrError> {
    match attr {
        Some(a) if a.kind == kind => a.as_u32().ok_or(AttrError::Unexpected(a.kind)),
        Some(a) => Err(AttrError::Unexpected(a.kind)),
        None => Err(AttrError::Malformed {
            offset: 0,
            reason: "failure record is incomplete",
        }),
    }
}
