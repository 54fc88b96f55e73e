//! Top-level message decoding into ordered [`Update`] records.
//!
//! ```text
//! AgentServerMessage
//! └─ 1: InteractionUpdate            (repeatable, each decoded independently)
//!    ├─ 1 | 4 | 8: { 1: text }       text / thinking / token delta
//!    ├─ 2 | 3:     { 1: call_id, 2: ToolCall, 3: model_call_id }
//!    ├─ 7:         { 1: call_id, 2: ToolCall, 3: args_delta, 4: model_call_id }
//!    └─ 13 | 14:   presence only     heartbeat / turn ended
//! ```
//!
//! Updates come out in wire order. Fields this decoder does not map are
//! dropped and logged at `trace` level.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::tool_call::{decode_tool_call, ToolCallInfo};
use crate::protocol::{Fields, WireField, WireType, WireValue};
use crate::schema::UpdateKind;

/// Field number of the `InteractionUpdate` inside the top-level message.
pub const INTERACTION_UPDATE_FIELD: u32 = 1;

/// One incremental agent event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    TextDelta { text: String },
    ThinkingDelta { text: String },
    TokenDelta { text: String },
    ToolCallStarted { info: ToolCallInfo },
    ToolCallCompleted { info: ToolCallInfo },
    PartialToolCall { info: ToolCallInfo },
    Heartbeat,
    TurnEnded,
}

impl Update {
    pub fn kind(&self) -> UpdateKind {
        match self {
            Self::TextDelta { .. } => UpdateKind::TextDelta,
            Self::ThinkingDelta { .. } => UpdateKind::ThinkingDelta,
            Self::TokenDelta { .. } => UpdateKind::TokenDelta,
            Self::ToolCallStarted { .. } => UpdateKind::ToolCallStarted,
            Self::ToolCallCompleted { .. } => UpdateKind::ToolCallCompleted,
            Self::PartialToolCall { .. } => UpdateKind::PartialToolCall,
            Self::Heartbeat => UpdateKind::Heartbeat,
            Self::TurnEnded => UpdateKind::TurnEnded,
        }
    }

    /// Text fragment of a text, thinking or token delta.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::TextDelta { text } | Self::ThinkingDelta { text } | Self::TokenDelta { text } => {
                Some(text)
            }
            _ => None,
        }
    }

    /// Tool information of a tool-call update.
    pub fn tool_call(&self) -> Option<&ToolCallInfo> {
        match self {
            Self::ToolCallStarted { info }
            | Self::ToolCallCompleted { info }
            | Self::PartialToolCall { info } => Some(info),
            _ => None,
        }
    }
}

/// An update together with the raw bytes it was decoded from.
///
/// `raw` is kept for tool-call kinds only, for verification against other
/// decoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedUpdate {
    pub update: Update,
    pub raw: Option<Bytes>,
}

impl DecodedUpdate {
    fn plain(update: Update) -> Self {
        Self { update, raw: None }
    }
}

/// Decode a top-level message into its updates.
pub fn decode_updates(buf: &[u8]) -> Vec<Update> {
    decode_updates_detailed(buf)
        .into_iter()
        .map(|d| d.update)
        .collect()
}

/// Decode a top-level message, keeping raw bytes of tool-call updates.
pub fn decode_updates_detailed(buf: &[u8]) -> Vec<DecodedUpdate> {
    let mut out = Vec::new();
    for field in Fields::new(buf) {
        match (field.field_number, field.value) {
            (INTERACTION_UPDATE_FIELD, WireValue::Bytes(payload)) => {
                decode_interaction_update(payload, &mut out);
            }
            _ => trace!(field = field.field_number, "ignoring top-level field"),
        }
    }
    out
}

fn decode_interaction_update(payload: &[u8], out: &mut Vec<DecodedUpdate>) {
    for field in Fields::new(payload) {
        let Some(kind) = UpdateKind::from_field(field.field_number) else {
            trace!(field = field.field_number, "unmapped interaction update field dropped");
            continue;
        };

        match kind {
            UpdateKind::Heartbeat => out.push(DecodedUpdate::plain(Update::Heartbeat)),
            UpdateKind::TurnEnded => out.push(DecodedUpdate::plain(Update::TurnEnded)),
            _ => match length_delimited(&field) {
                Some(body) => decode_body(kind, body, out),
                None => trace!(kind = kind.name(), "update field is not length-delimited"),
            },
        }
    }
}

fn length_delimited<'a>(field: &WireField<'a>) -> Option<&'a [u8]> {
    match (field.wire_type, field.value) {
        (WireType::LengthDelimited, WireValue::Bytes(body)) => Some(body),
        _ => None,
    }
}

fn decode_body(kind: UpdateKind, body: &[u8], out: &mut Vec<DecodedUpdate>) {
    match kind {
        UpdateKind::TextDelta | UpdateKind::ThinkingDelta | UpdateKind::TokenDelta => {
            for text in wrapped_texts(body) {
                let text = text.to_string();
                let update = match kind {
                    UpdateKind::TextDelta => Update::TextDelta { text },
                    UpdateKind::ThinkingDelta => Update::ThinkingDelta { text },
                    _ => Update::TokenDelta { text },
                };
                out.push(DecodedUpdate::plain(update));
            }
        }
        UpdateKind::ToolCallStarted | UpdateKind::ToolCallCompleted => {
            let info = decode_tool_call_update(body);
            let update = if kind == UpdateKind::ToolCallStarted {
                Update::ToolCallStarted { info }
            } else {
                Update::ToolCallCompleted { info }
            };
            out.push(DecodedUpdate {
                update,
                raw: Some(Bytes::copy_from_slice(body)),
            });
        }
        UpdateKind::PartialToolCall => out.push(DecodedUpdate {
            update: Update::PartialToolCall {
                info: decode_partial_tool_call(body),
            },
            raw: Some(Bytes::copy_from_slice(body)),
        }),
        UpdateKind::Heartbeat | UpdateKind::TurnEnded => {}
    }
}

/// Every non-empty UTF-8 field 1 of a text wrapper.
fn wrapped_texts(body: &[u8]) -> impl Iterator<Item = &str> {
    Fields::new(body)
        .filter(|f| f.field_number == 1)
        .filter_map(|f| length_delimited(&f))
        .filter_map(|b| std::str::from_utf8(b).ok())
        .filter(|s| !s.is_empty())
}

fn utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

/// `{1: call_id, 2: ToolCall, 3: model_call_id}`
fn decode_tool_call_update(body: &[u8]) -> ToolCallInfo {
    let mut info = ToolCallInfo::default();
    for field in Fields::new(body) {
        let Some(bytes) = length_delimited(&field) else {
            continue;
        };
        match field.field_number {
            1 => info.call_id = utf8(bytes).or(info.call_id),
            2 => {
                let call = decode_tool_call(bytes);
                info.tool_name = call.tool_name.map(str::to_string);
                info.args = call.args;
            }
            3 => info.model_call_id = utf8(bytes).or(info.model_call_id),
            _ => {}
        }
    }
    info
}

/// `{1: call_id, 2: ToolCall (name only), 3: args_delta, 4: model_call_id}`
fn decode_partial_tool_call(body: &[u8]) -> ToolCallInfo {
    let mut info = ToolCallInfo::default();
    for field in Fields::new(body) {
        let Some(bytes) = length_delimited(&field) else {
            continue;
        };
        match field.field_number {
            1 => info.call_id = utf8(bytes).or(info.call_id),
            2 => info.tool_name = decode_tool_call(bytes).tool_name.map(str::to_string),
            3 => info.args_delta = utf8(bytes).or(info.args_delta),
            4 => info.model_call_id = utf8(bytes).or(info.model_call_id),
            _ => {}
        }
    }
    info
}
