//! Incremental frame demultiplexer.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for frames split across chunks:
//! - `WaitingForHeader`: Need at least 5 bytes
//! - `WaitingForPayload`: Header parsed, need N more payload bytes
//!
//! Chunk boundaries are arbitrary. Every byte of an incomplete frame is
//! retained for the next [`FrameDemuxer::feed`] call, and a missing frame is
//! an empty result, never an error.
//!
//! # Example
//!
//! ```
//! use agentwire::protocol::{build_frame, FrameDemuxer};
//!
//! let bytes = build_frame(0, b"payload");
//! let mut demuxer = FrameDemuxer::new();
//!
//! assert!(demuxer.feed(&bytes[..3]).is_empty());
//! let frames = demuxer.feed(&bytes[3..]);
//! assert_eq!(frames[0].payload(), b"payload");
//! ```

use bytes::{Bytes, BytesMut};
use tracing::warn;

use super::frame::{Frame, FrameHeader, FRAME_HEADER_SIZE};

/// Default initial buffer capacity (64 KiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Default soft limit above which a declared payload length is logged.
pub const DEFAULT_MAX_FRAME_PAYLOAD: u32 = 16 * 1024 * 1024;

/// State machine for frame parsing.
#[derive(Debug, Clone)]
enum State {
    /// Waiting for complete header (need 5 bytes).
    WaitingForHeader,
    /// Header parsed, waiting for payload bytes.
    WaitingForPayload { header: FrameHeader },
}

/// Splits a chunked byte stream into frames.
///
/// One instance per logical stream; partial frames are kept between calls.
#[derive(Debug)]
pub struct FrameDemuxer {
    /// Unconsumed bytes, starting at a frame boundary or after a parsed header.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Declared lengths above this are logged, never rejected.
    max_payload_hint: u32,
}

impl FrameDemuxer {
    /// Create a demuxer with default settings.
    pub fn new() -> Self {
        Self::with_capacity_and_limit(DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_FRAME_PAYLOAD)
    }

    /// Create a demuxer with a custom initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_limit(capacity, DEFAULT_MAX_FRAME_PAYLOAD)
    }

    /// Create a demuxer with custom capacity and oversize warning threshold.
    pub fn with_capacity_and_limit(capacity: usize, max_payload_hint: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            state: State::WaitingForHeader,
            max_payload_hint,
        }
    }

    /// Append a chunk and extract every frame it completes.
    ///
    /// Returns frames in stream order; empty if no frame is complete yet.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one() {
            frames.push(frame);
        }
        frames
    }

    fn try_extract_one(&mut self) -> Option<Frame> {
        let header = match self.state {
            State::WaitingForHeader => {
                let header = FrameHeader::decode(&self.buffer)?;
                if header.payload_length > self.max_payload_hint {
                    warn!(
                        declared = header.payload_length,
                        limit = self.max_payload_hint,
                        "frame declares oversized payload, buffering anyway"
                    );
                }
                let _ = self.buffer.split_to(FRAME_HEADER_SIZE);
                self.state = State::WaitingForPayload { header };
                header
            }
            State::WaitingForPayload { header } => header,
        };

        let payload_length = header.payload_length as usize;
        if self.buffer.len() < payload_length {
            return None;
        }

        let payload = if payload_length == 0 {
            Bytes::new()
        } else {
            self.buffer.split_to(payload_length).freeze()
        };
        self.state = State::WaitingForHeader;

        Some(Frame::new(header.flags, payload))
    }

    /// Bytes held for an incomplete frame, header included.
    pub fn len(&self) -> usize {
        match self.state {
            State::WaitingForHeader => self.buffer.len(),
            State::WaitingForPayload { .. } => FRAME_HEADER_SIZE + self.buffer.len(),
        }
    }

    /// True when no partial frame is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard any partial frame.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for FrameDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, TRAILER_FLAG};
    use proptest::prelude::*;

    fn sample_stream() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(build_frame(0, b"first"));
        bytes.extend(build_frame(0, b""));
        bytes.extend(build_frame(0, b"a somewhat longer second payload"));
        bytes.extend(build_frame(TRAILER_FLAG, b"grpc-status: 0"));
        bytes
    }

    #[test]
    fn test_single_complete_frame() {
        let mut demuxer = FrameDemuxer::new();
        let frames = demuxer.feed(&build_frame(0, b"hello"));

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"hello");
        assert!(frames[0].is_data());
        assert!(demuxer.is_empty());
    }

    #[test]
    fn test_multiple_frames_in_one_feed() {
        let mut demuxer = FrameDemuxer::new();
        let frames = demuxer.feed(&sample_stream());

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].payload(), b"first");
        assert!(frames[1].payload().is_empty());
        assert!(frames[3].is_trailer());
        assert!(demuxer.is_empty());
    }

    #[test]
    fn test_fragmented_header() {
        let mut demuxer = FrameDemuxer::new();
        let bytes = build_frame(0, b"test");

        assert!(demuxer.feed(&bytes[..3]).is_empty());
        assert_eq!(demuxer.state_name(), "WaitingForHeader");
        assert_eq!(demuxer.len(), 3);

        let frames = demuxer.feed(&bytes[3..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"test");
        assert!(demuxer.is_empty());
    }

    #[test]
    fn test_fragmented_payload() {
        let mut demuxer = FrameDemuxer::new();
        let payload = b"this is a longer payload that will be fragmented";
        let bytes = build_frame(0, payload);

        let partial_len = FRAME_HEADER_SIZE + 10;
        assert!(demuxer.feed(&bytes[..partial_len]).is_empty());
        assert_eq!(demuxer.state_name(), "WaitingForPayload");
        assert_eq!(demuxer.len(), partial_len);

        let frames = demuxer.feed(&bytes[partial_len..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), payload);
        assert!(demuxer.is_empty());
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut demuxer = FrameDemuxer::new();
        assert!(demuxer.feed(&[]).is_empty());
        assert!(demuxer.is_empty());
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut demuxer = FrameDemuxer::new();
        let stream = sample_stream();

        let mut frames = Vec::new();
        for byte in &stream {
            frames.extend(demuxer.feed(&[*byte]));
        }

        assert_eq!(frames, FrameDemuxer::new().feed(&stream));
    }

    #[test]
    fn test_oversized_declaration_is_buffered_not_dropped() {
        let mut demuxer = FrameDemuxer::with_capacity_and_limit(16, 4);
        let bytes = build_frame(0, b"longer than four");

        assert!(demuxer.feed(&bytes[..8]).is_empty());
        let frames = demuxer.feed(&bytes[8..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"longer than four");
    }

    #[test]
    fn test_clear_resets_state() {
        let mut demuxer = FrameDemuxer::new();
        let bytes = build_frame(0, b"test");
        demuxer.feed(&bytes[..FRAME_HEADER_SIZE + 1]);
        assert_eq!(demuxer.state_name(), "WaitingForPayload");

        demuxer.clear();
        assert_eq!(demuxer.state_name(), "WaitingForHeader");
        assert!(demuxer.is_empty());

        let frames = demuxer.feed(&bytes);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_truncated_stream_retains_remainder() {
        let mut demuxer = FrameDemuxer::new();
        let stream = sample_stream();
        let cut = stream.len() - 3;

        let frames = demuxer.feed(&stream[..cut]);
        assert_eq!(frames.len(), 3);
        assert_eq!(demuxer.len(), build_frame(TRAILER_FLAG, b"grpc-status: 0").len() - 3);
    }

    #[test]
    fn test_every_two_way_split_matches_single_feed() {
        let stream = sample_stream();
        let expected = FrameDemuxer::new().feed(&stream);

        for split in 0..=stream.len() {
            let mut demuxer = FrameDemuxer::new();
            let mut frames = demuxer.feed(&stream[..split]);
            frames.extend(demuxer.feed(&stream[split..]));
            assert_eq!(frames, expected, "split at {split}");
            assert!(demuxer.is_empty());
        }
    }

    proptest! {
        #[test]
        fn prop_chunking_invariance(
            payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..40), 1..6),
            cuts in proptest::collection::vec(any::<usize>(), 0..8),
        ) {
            let mut stream = Vec::new();
            for (i, payload) in payloads.iter().enumerate() {
                let flags = if i + 1 == payloads.len() { TRAILER_FLAG } else { 0 };
                stream.extend(build_frame(flags, payload));
            }
            let expected = FrameDemuxer::new().feed(&stream);

            let mut points: Vec<usize> = cuts.iter().map(|c| c % (stream.len() + 1)).collect();
            points.sort_unstable();

            let mut demuxer = FrameDemuxer::new();
            let mut frames = Vec::new();
            let mut start = 0;
            for point in points {
                frames.extend(demuxer.feed(&stream[start..point]));
                start = point;
            }
            frames.extend(demuxer.feed(&stream[start..]));

            prop_assert_eq!(frames, expected);
            prop_assert!(demuxer.is_empty());
        }
    }
}
