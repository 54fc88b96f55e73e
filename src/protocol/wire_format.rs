//! Schema-less protobuf wire-format scanning.
//!
//! A message is a flat sequence of `tag value` pairs. The tag is a varint
//! holding `field_number << 3 | wire_type`:
//!
//! ```text
//! ┌──────────────┬───────────┬────────────────────────────────┐
//! │ wire type    │ tag & 0x7 │ value                          │
//! ├──────────────┼───────────┼────────────────────────────────┤
//! │ Varint       │ 0         │ varint                         │
//! │ Fixed64      │ 1         │ 8 bytes (skipped)              │
//! │ LengthDelim. │ 2         │ varint length + that many bytes│
//! │ Group        │ 3, 4      │ unsupported, stops the scan    │
//! │ Fixed32      │ 5         │ 4 bytes (skipped)              │
//! └──────────────┴───────────┴────────────────────────────────┘
//! ```
//!
//! Scanning never fails. Truncated or malformed input ends the scan and the
//! fields decoded up to that point are returned.

use tracing::trace;

use super::varint::{encode_varint, try_decode_varint};

/// Physical encoding of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    /// Map the low three tag bits to a supported wire type.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    /// The three tag bits for this wire type.
    pub fn bits(self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::LengthDelimited => 2,
            Self::Fixed32 => 5,
        }
    }
}

/// Value of a scanned field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireValue<'a> {
    Varint(u64),
    Bytes(&'a [u8]),
}

/// One `(field number, wire type, value)` tuple.
///
/// Only varint and length-delimited fields are ever produced; fixed-width
/// fields are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireField<'a> {
    pub field_number: u32,
    pub wire_type: WireType,
    pub value: WireValue<'a>,
}

impl<'a> WireField<'a> {
    /// The payload of a length-delimited field.
    #[inline]
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self.value {
            WireValue::Bytes(bytes) => Some(bytes),
            WireValue::Varint(_) => None,
        }
    }

    /// The value of a varint field.
    #[inline]
    pub fn as_varint(&self) -> Option<u64> {
        match self.value {
            WireValue::Varint(v) => Some(v),
            WireValue::Bytes(_) => None,
        }
    }

    /// The payload decoded as UTF-8, if this is a length-delimited field.
    #[inline]
    pub fn as_str(&self) -> Option<&'a str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }
}

/// Iterator over the fields of one message buffer.
///
/// Ends at the first truncated or unsupported field.
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    buf: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Fields<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            done: false,
        }
    }

    /// Byte offset of the next unread tag.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn stop(&mut self, reason: &'static str) -> Option<WireField<'a>> {
        trace!(offset = self.offset, len = self.buf.len(), reason, "field scan stopped");
        self.done = true;
        None
    }

    fn skip(&mut self, from: usize, width: usize) -> bool {
        match from.checked_add(width) {
            Some(end) if end <= self.buf.len() => {
                self.offset = end;
                true
            }
            _ => false,
        }
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = WireField<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done && self.offset < self.buf.len() {
            let Some((tag, pos)) = try_decode_varint(self.buf, self.offset) else {
                return self.stop("truncated tag");
            };

            let field_number = match u32::try_from(tag >> 3) {
                Ok(0) | Err(_) => return self.stop("invalid field number"),
                Ok(n) => n,
            };
            let Some(wire_type) = WireType::from_bits((tag & 0x7) as u8) else {
                return self.stop("unsupported wire type");
            };

            match wire_type {
                WireType::Varint => {
                    let Some((value, end)) = try_decode_varint(self.buf, pos) else {
                        return self.stop("truncated varint");
                    };
                    self.offset = end;
                    return Some(WireField {
                        field_number,
                        wire_type,
                        value: WireValue::Varint(value),
                    });
                }
                WireType::LengthDelimited => {
                    let Some((len, start)) = try_decode_varint(self.buf, pos) else {
                        return self.stop("truncated length");
                    };
                    let remaining = self.buf.len() - start;
                    let len = match usize::try_from(len) {
                        Ok(len) if len <= remaining => len,
                        _ => return self.stop("length exceeds buffer"),
                    };
                    let end = start + len;
                    self.offset = end;
                    return Some(WireField {
                        field_number,
                        wire_type,
                        value: WireValue::Bytes(&self.buf[start..end]),
                    });
                }
                WireType::Fixed64 => {
                    if !self.skip(pos, 8) {
                        return self.stop("truncated fixed64");
                    }
                }
                WireType::Fixed32 => {
                    if !self.skip(pos, 4) {
                        return self.stop("truncated fixed32");
                    }
                }
            }
        }
        None
    }
}

/// Scan a message buffer into its ordered list of fields.
pub fn scan_fields(buf: &[u8]) -> Vec<WireField<'_>> {
    Fields::new(buf).collect()
}

/// First length-delimited occurrence of `field_number`.
pub fn first_bytes<'a>(fields: &[WireField<'a>], field_number: u32) -> Option<&'a [u8]> {
    fields
        .iter()
        .filter(|f| f.field_number == field_number)
        .find_map(WireField::as_bytes)
}

/// First length-delimited occurrence of `field_number`, decoded as UTF-8.
pub fn first_string<'a>(fields: &[WireField<'a>], field_number: u32) -> Option<&'a str> {
    first_bytes(fields, field_number).and_then(|b| std::str::from_utf8(b).ok())
}

/// Peel a one-level wrapper message: its field 1 as a UTF-8 string.
///
/// The agent service wraps most strings as `{1: string}`.
pub fn unwrap_string(buf: &[u8]) -> Option<&str> {
    Fields::new(buf)
        .find(|f| f.field_number == 1 && f.wire_type == WireType::LengthDelimited)
        .and_then(|f| f.as_str())
}

/// Minimal protobuf encoder for building messages in the observed layout.
///
/// Used to construct fixtures and to re-encode captured fragments.
///
/// # Example
///
/// ```
/// use agentwire::protocol::{scan_fields, MessageWriter};
///
/// let msg = MessageWriter::new().string(1, "hi").varint(2, 7).finish();
/// assert_eq!(scan_fields(&msg).len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageWriter {
    buf: Vec<u8>,
}

impl MessageWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn tag(&mut self, field_number: u32, wire_type: WireType) {
        let tag = (u64::from(field_number) << 3) | u64::from(wire_type.bits());
        encode_varint(tag, &mut self.buf);
    }

    /// Append a varint field.
    pub fn varint(mut self, field_number: u32, value: u64) -> Self {
        self.tag(field_number, WireType::Varint);
        encode_varint(value, &mut self.buf);
        self
    }

    /// Append a length-delimited field.
    pub fn bytes(mut self, field_number: u32, value: &[u8]) -> Self {
        self.tag(field_number, WireType::LengthDelimited);
        encode_varint(value.len() as u64, &mut self.buf);
        self.buf.extend_from_slice(value);
        self
    }

    /// Append a string field.
    pub fn string(self, field_number: u32, value: &str) -> Self {
        self.bytes(field_number, value.as_bytes())
    }

    /// Append a string wrapped one level deep: `{field_number: {1: value}}`.
    pub fn wrapped_string(self, field_number: u32, value: &str) -> Self {
        let inner = MessageWriter::new().string(1, value).finish();
        self.bytes(field_number, &inner)
    }

    /// Append a nested message.
    pub fn message(self, field_number: u32, message: MessageWriter) -> Self {
        self.bytes(field_number, &message.buf)
    }

    /// Append a 64-bit fixed field.
    pub fn fixed64(mut self, field_number: u32, value: u64) -> Self {
        self.tag(field_number, WireType::Fixed64);
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append a 32-bit fixed field.
    pub fn fixed32(mut self, field_number: u32, value: u32) -> Self {
        self.tag(field_number, WireType::Fixed32);
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append pre-encoded bytes verbatim.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
