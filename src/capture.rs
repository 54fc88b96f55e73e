//! Tool-call capture records.
//!
//! A record pairs the raw bytes of one tool-call update with its parsed form,
//! so decoders can be checked against each other offline. Records are plain
//! serde data; where they get written is up to the caller.

use serde::{Deserialize, Serialize};

use crate::decode::{decode_updates, DecodedUpdate, ToolCallInfo, Update, INTERACTION_UPDATE_FIELD};
use crate::protocol::MessageWriter;
use crate::schema::UpdateKind;

/// One captured tool-call update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Capture time, formatted by the caller.
    pub timestamp: String,
    pub request_id: String,
    pub endpoint: String,
    /// Update kind name, e.g. `tool_call_started`.
    pub event_type: String,
    /// Nested update bytes, lowercase hex.
    pub raw_hex: String,
    pub parsed: ToolCallInfo,
}

impl ToolCallRecord {
    /// Build a record from a decoded update.
    ///
    /// Returns `None` for updates without raw bytes (non tool-call kinds).
    pub fn from_decoded(
        decoded: &DecodedUpdate,
        request_id: impl Into<String>,
        endpoint: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Option<Self> {
        let raw = decoded.raw.as_ref()?;
        let parsed = decoded.update.tool_call()?.clone();
        Some(Self {
            timestamp: timestamp.into(),
            request_id: request_id.into(),
            endpoint: endpoint.into(),
            event_type: decoded.update.kind().name().to_string(),
            raw_hex: hex::encode(raw),
            parsed,
        })
    }

    pub fn raw_bytes(&self) -> Option<Vec<u8>> {
        hex::decode(&self.raw_hex).ok()
    }

    fn kind(&self) -> Option<UpdateKind> {
        UpdateKind::ALL
            .iter()
            .copied()
            .find(|k| k.is_tool_call() && k.name() == self.event_type)
    }

    /// Decode the raw bytes again.
    ///
    /// `None` when the hex or the event type is not recognized.
    pub fn redecode(&self) -> Option<Update> {
        let kind = self.kind()?;
        let raw = self.raw_bytes()?;
        let message = MessageWriter::new()
            .message(
                INTERACTION_UPDATE_FIELD,
                MessageWriter::new().bytes(kind.field_number(), &raw),
            )
            .finish();
        decode_updates(&message).into_iter().next()
    }

    /// Whether decoding the raw bytes again reproduces `parsed`.
    pub fn verify(&self) -> bool {
        self.redecode()
            .as_ref()
            .and_then(Update::tool_call)
            .is_some_and(|info| *info == self.parsed)
    }
}

/// Records for every tool-call update in `decoded` that carries raw bytes.
pub fn records_from(
    decoded: &[DecodedUpdate],
    request_id: &str,
    endpoint: &str,
    timestamp: &str,
) -> Vec<ToolCallRecord> {
    decoded
        .iter()
        .filter_map(|d| ToolCallRecord::from_decoded(d, request_id, endpoint, timestamp))
        .collect()
}
