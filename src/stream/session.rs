//! One intercepted exchange, from first chunk to completion summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::accumulator::{PartialArgs, StreamAccumulator};
use crate::config::DecoderConfig;
use crate::decode::{decode_updates_detailed, DecodedUpdate, Update};
use crate::protocol::FrameDemuxer;

/// Everything a session observed, handed back by [`StreamSession::finish`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub bytes: usize,
    pub chunks: usize,
    pub frames: usize,
    pub trailer_frames: usize,
    /// Bytes of an incomplete frame still buffered when the stream ended.
    pub unconsumed_bytes: usize,
    pub counts: BTreeMap<String, usize>,
    pub text: String,
    pub thinking: String,
    pub partial_args: BTreeMap<String, PartialArgs>,
    pub tool_events: Vec<Update>,
    pub trailers: Vec<String>,
}

impl StreamSummary {
    pub fn is_truncated(&self) -> bool {
        self.unconsumed_bytes > 0
    }

    pub fn event_count(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Decoding state of a single stream.
///
/// Sessions are independent; run one per exchange and drop it when the
/// connection goes away.
#[derive(Debug)]
pub struct StreamSession {
    demuxer: FrameDemuxer,
    accumulator: StreamAccumulator,
    capture_raw: bool,
    captured: Vec<DecodedUpdate>,
    bytes: usize,
    chunks: usize,
    frames: usize,
    trailers: Vec<String>,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSession {
    pub fn new() -> Self {
        Self::with_config(&DecoderConfig::default())
    }

    pub fn with_config(config: &DecoderConfig) -> Self {
        Self {
            demuxer: FrameDemuxer::with_capacity_and_limit(
                config.initial_buffer_capacity,
                config.max_frame_payload,
            ),
            accumulator: StreamAccumulator::new(),
            capture_raw: config.capture_raw_tool_calls,
            captured: Vec::new(),
            bytes: 0,
            chunks: 0,
            frames: 0,
            trailers: Vec::new(),
        }
    }

    /// Feed one chunk and return the updates it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Update> {
        self.bytes += chunk.len();
        self.chunks += 1;

        let mut updates = Vec::new();
        for frame in self.demuxer.feed(chunk) {
            self.frames += 1;

            if let Some(text) = frame.trailer_text() {
                trace!(len = frame.payload_len(), "trailer frame");
                self.trailers.push(text);
                continue;
            }

            for decoded in decode_updates_detailed(frame.payload()) {
                self.accumulator.push(&decoded.update);
                if self.capture_raw && decoded.raw.is_some() {
                    self.captured.push(decoded.clone());
                }
                updates.push(decoded.update);
            }
        }
        updates
    }

    /// Decode a fully buffered framed body.
    pub fn decode_body(&mut self, body: &[u8]) -> Vec<Update> {
        self.feed(body)
    }

    pub fn accumulator(&self) -> &StreamAccumulator {
        &self.accumulator
    }

    /// Bytes buffered for an incomplete frame.
    pub fn pending_bytes(&self) -> usize {
        self.demuxer.len()
    }

    pub fn trailers(&self) -> &[String] {
        &self.trailers
    }

    /// Drain tool-call updates captured with their raw bytes.
    ///
    /// Empty unless the session was built with `capture_raw_tool_calls`.
    pub fn take_captured(&mut self) -> Vec<DecodedUpdate> {
        std::mem::take(&mut self.captured)
    }

    pub fn finish(self) -> StreamSummary {
        let unconsumed_bytes = self.demuxer.len();
        if unconsumed_bytes > 0 {
            debug!(unconsumed_bytes, "stream ended inside a frame");
        }
        debug!(
            bytes = self.bytes,
            chunks = self.chunks,
            frames = self.frames,
            "stream finished"
        );

        let trailer_frames = self.trailers.len();
        let parts = self.accumulator.into_parts();
        StreamSummary {
            bytes: self.bytes,
            chunks: self.chunks,
            frames: self.frames,
            trailer_frames,
            unconsumed_bytes,
            counts: parts.counts,
            text: parts.text,
            thinking: parts.thinking,
            partial_args: parts.partials,
            tool_events: parts.tool_events,
            trailers: self.trailers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, MessageWriter, TRAILER_FLAG};

    fn text_message(field: u32, text: &str) -> Vec<u8> {
        MessageWriter::new()
            .message(
                1,
                MessageWriter::new().message(field, MessageWriter::new().string(1, text)),
            )
            .finish()
    }

    fn stream_of(parts: &[&str]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend(build_frame(0, &text_message(1, part)));
        }
        body
    }

    #[test]
    fn test_feed_returns_updates_per_chunk() {
        let body = stream_of(&["Hel", "lo"]);
        let first = build_frame(0, &text_message(1, "Hel")).len();

        let mut session = StreamSession::new();
        let a = session.feed(&body[..first + 2]);
        assert_eq!(
            a,
            vec![Update::TextDelta {
                text: "Hel".to_string()
            }]
        );
        assert!(session.pending_bytes() > 0);

        let b = session.feed(&body[first + 2..]);
        assert_eq!(b.len(), 1);
        assert_eq!(session.accumulator().text(), "Hello");
        assert_eq!(session.pending_bytes(), 0);
    }

    #[test]
    fn test_trailer_frames_are_not_decoded() {
        let mut body = stream_of(&["done"]);
        // trailer payload that would decode as a text update if it were data
        let fake = text_message(1, "nope");
        body.extend(build_frame(TRAILER_FLAG, &fake));
        body.extend(build_frame(TRAILER_FLAG, b"grpc-status: 0\r\n"));

        let mut session = StreamSession::new();
        let updates = session.decode_body(&body);
        assert_eq!(updates.len(), 1);
        assert_eq!(session.trailers().len(), 2);
        assert_eq!(session.trailers()[1], "grpc-status: 0\r\n");

        let summary = session.finish();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.trailer_frames, 2);
        assert_eq!(summary.text, "done");
    }

    #[test]
    fn test_summary_reports_truncation() {
        let body = stream_of(&["cut"]);
        let mut session = StreamSession::new();
        session.feed(&body[..body.len() - 1]);

        let summary = session.finish();
        assert!(summary.is_truncated());
        assert_eq!(summary.unconsumed_bytes, body.len() - 1);
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.bytes, body.len() - 1);
        assert_eq!(summary.event_count(), 0);
    }

    #[test]
    fn test_summary_counts_and_thinking() {
        let mut body = stream_of(&["a", "b"]);
        body.extend(build_frame(0, &text_message(4, "hmm")));

        let mut session = StreamSession::new();
        for chunk in body.chunks(3) {
            session.feed(chunk);
        }
        let summary = session.finish();

        assert_eq!(summary.counts["text_delta"], 2);
        assert_eq!(summary.counts["thinking_delta"], 1);
        assert_eq!(summary.thinking, "hmm");
        assert_eq!(summary.chunks, body.len().div_ceil(3));
        assert!(!summary.is_truncated());
    }

    #[test]
    fn test_capture_raw_tool_calls() {
        let tool_update = MessageWriter::new()
            .string(1, "call_1")
            .message(
                2,
                MessageWriter::new().message(8, MessageWriter::new().string(1, "a.ts")),
            )
            .finish();
        let message = MessageWriter::new()
            .message(
                1,
                MessageWriter::new()
                    .message(1, MessageWriter::new().string(1, "hi"))
                    .bytes(2, &tool_update),
            )
            .finish();
        let body = build_frame(0, &message);

        let mut plain = StreamSession::new();
        plain.feed(&body);
        assert!(plain.take_captured().is_empty());

        let config = DecoderConfig::new().capture_raw_tool_calls(true);
        let mut session = StreamSession::with_config(&config);
        let updates = session.feed(&body);
        assert_eq!(updates.len(), 2);

        let captured = session.take_captured();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].raw.as_deref(), Some(tool_update.as_slice()));
        assert!(session.take_captured().is_empty());
    }
}
