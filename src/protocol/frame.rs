//! Length-prefixed frames of the chunked transport.
//!
//! ```text
//! ┌───────┬──────────────┬─────────────────┐
//! │ Flags │ Length       │ Payload         │
//! │ 1 byte│ 4 bytes BE   │ Length bytes    │
//! └───────┴──────────────┴─────────────────┘
//! ```
//!
//! Flag bit `0x80` marks a trailer frame carrying end-of-stream metadata.
//!
//! # Example
//!
//! ```
//! use agentwire::protocol::{build_frame, Frame, FrameHeader, FRAME_HEADER_SIZE};
//!
//! let bytes = build_frame(0, b"hello");
//! let header = FrameHeader::decode(&bytes).unwrap();
//! assert_eq!(header.payload_length, 5);
//! assert_eq!(bytes.len(), FRAME_HEADER_SIZE + 5);
//! ```

use bytes::Bytes;

/// Frame header size in bytes (flag byte + u32 length).
pub const FRAME_HEADER_SIZE: usize = 5;

/// Flag bit marking a trailer frame.
pub const TRAILER_FLAG: u8 = 0x80;

/// Flag bit marking a compressed payload.
pub const COMPRESSED_FLAG: u8 = 0x01;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Flags byte.
    pub flags: u8,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl FrameHeader {
    pub fn new(flags: u8, payload_length: u32) -> Self {
        Self {
            flags,
            payload_length,
        }
    }

    /// Encode header to bytes (Big Endian length).
    pub fn encode(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut buf = [0u8; FRAME_HEADER_SIZE];
        buf[0] = self.flags;
        buf[1..5].copy_from_slice(&self.payload_length.to_be_bytes());
        buf
    }

    /// Decode header from bytes.
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < FRAME_HEADER_SIZE {
            return None;
        }
        Some(Self {
            flags: buf[0],
            payload_length: u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]),
        })
    }

    /// Total frame size on the wire, header included.
    #[inline]
    pub fn frame_len(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload_length as usize
    }

    #[inline]
    pub fn is_trailer(&self) -> bool {
        self.flags & TRAILER_FLAG != 0
    }
}

/// A complete frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Flags byte from the header.
    pub flags: u8,
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    pub payload: Bytes,
}

impl Frame {
    pub fn new(flags: u8, payload: Bytes) -> Self {
        Self { flags, payload }
    }

    /// Create a frame from raw bytes (copies data).
    pub fn from_parts(flags: u8, payload: &[u8]) -> Self {
        Self {
            flags,
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Trailer frames carry end-of-stream metadata and are not decoded as messages.
    #[inline]
    pub fn is_trailer(&self) -> bool {
        self.flags & TRAILER_FLAG != 0
    }

    /// Data frames carry one encoded message.
    #[inline]
    pub fn is_data(&self) -> bool {
        !self.is_trailer()
    }

    /// Whether the sender flagged the payload as compressed.
    ///
    /// Compressed payloads are passed through untouched.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.flags & COMPRESSED_FLAG != 0
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Trailer payload as text, replacing invalid UTF-8.
    pub fn trailer_text(&self) -> Option<String> {
        self.is_trailer()
            .then(|| String::from_utf8_lossy(&self.payload).into_owned())
    }
}

/// Build a complete frame as a single byte vector.
pub fn build_frame(flags: u8, payload: &[u8]) -> Vec<u8> {
    let header = FrameHeader::new(flags, payload.len() as u32);
    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}
