//! Base-128 varint decoding and encoding.
//!
//! Each byte carries 7 payload bits, least significant group first. The high
//! bit of a byte signals that another byte follows.
//!
//! ```text
//! 300 = 0b1_0010_1100
//!
//! ┌───────────┬───────────┐
//! │ 1010_1100 │ 0000_0010 │
//! │ cont + 44 │  2 << 7   │
//! └───────────┴───────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use agentwire::protocol::{decode_varint, encode_varint};
//!
//! let mut buf = Vec::new();
//! encode_varint(300, &mut buf);
//! assert_eq!(buf, [0xAC, 0x02]);
//! assert_eq!(decode_varint(&buf, 0), (300, 2));
//! ```

/// Maximum number of bytes a 64-bit varint occupies.
pub const MAX_VARINT_LEN: usize = 10;

/// Decode a varint starting at `offset`.
///
/// Returns `(value, new_offset)`. Stops after the first byte with the high bit
/// clear. If the buffer runs out first, returns whatever was accumulated and
/// the end-of-buffer offset; callers must treat that as insufficient data,
/// see [`try_decode_varint`]. Bits beyond the 64th are discarded.
pub fn decode_varint(buf: &[u8], offset: usize) -> (u64, usize) {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut pos = offset;

    while pos < buf.len() {
        let byte = buf[pos];
        pos += 1;
        if shift < 64 {
            value |= u64::from(byte & 0x7F) << shift;
        }
        if byte & 0x80 == 0 {
            return (value, pos);
        }
        shift = shift.saturating_add(7);
    }

    (value, pos)
}

/// Decode a varint, distinguishing a terminated value from an exhausted buffer.
///
/// Returns `None` when the buffer ends before a terminating byte.
pub fn try_decode_varint(buf: &[u8], offset: usize) -> Option<(u64, usize)> {
    let (value, pos) = decode_varint(buf, offset);
    // Terminated iff the last consumed byte has its continuation bit clear.
    match pos.checked_sub(1).and_then(|last| buf.get(last)) {
        Some(byte) if pos > offset && byte & 0x80 == 0 => Some((value, pos)),
        _ => None,
    }
}

/// Append the varint encoding of `value` to `buf`.
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Number of bytes `encode_varint` writes for `value`.
#[inline]
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}
