//! Event-stream bodies.
//!
//! Each `data: ` line carries one base64-encoded message (no frame header).
//! The literal `[DONE]` ends the stream.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decode::{decode_updates, Update};

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Result of decoding an event-stream body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SseDecode {
    /// `data:` lines other than the terminator, decodable or not.
    pub messages: usize,
    /// Whether the `[DONE]` terminator was seen.
    pub done: bool,
    pub updates: Vec<Update>,
    /// `data:` lines whose payload was not valid base64.
    pub errors: usize,
}

/// Decode every `data:` line of an event-stream body.
pub fn decode_sse_body(body: &str) -> SseDecode {
    let mut out = SseDecode::default();

    for line in body.lines() {
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            continue;
        };
        let payload = payload.trim();
        if payload == DONE_MARKER {
            out.done = true;
            continue;
        }

        out.messages += 1;
        match LENIENT.decode(payload) {
            Ok(bytes) => out.updates.extend(decode_updates(&bytes)),
            Err(e) => {
                warn!(message = out.messages, error = %e, "undecodable event-stream payload");
                out.errors += 1;
            }
        }
    }

    debug!(
        messages = out.messages,
        updates = out.updates.len(),
        errors = out.errors,
        done = out.done,
        "event-stream body decoded"
    );
    out
}
