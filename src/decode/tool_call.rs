//! `ToolCall` sub-message decoding.
//!
//! A `ToolCall` is a oneof encoded by field-number presence: the populated
//! field number names the tool and its bytes hold that tool's arguments.
//!
//! ```text
//! ToolCall { 8: ReadArgs { 1: "a.ts", 3: 200 } }
//!            │           │            └─ "limit" (varint)
//!            │           └─ "filePath" (string)
//!            └─ selector: read
//! ```
//!
//! The first selector field in encoding order wins. A message carrying more
//! than one is logged and otherwise decoded as if only the first were there.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::protocol::{unwrap_string, Fields, WireField, WireType, WireValue};
use crate::schema::{tool_by_field, ToolSchema, BOOLEAN_ARG};

/// Placeholder name for a tool whose selector field was not recognized.
pub const UNKNOWN_TOOL: &str = "unknown";

/// A decoded tool argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Uint(u64),
    Str(String),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Tool name and arguments decoded from one `ToolCall` message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCall {
    /// `None` when no recognized selector field was present.
    pub tool_name: Option<&'static str>,
    pub args: BTreeMap<String, ArgValue>,
}

/// Tool invocation as carried by tool-call updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, ArgValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_call_id: Option<String>,
    /// One fragment of the streamed JSON arguments (partial updates only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args_delta: Option<String>,
}

impl ToolCallInfo {
    /// Tool name, or [`UNKNOWN_TOOL`] when unresolved.
    pub fn tool_name_or_unknown(&self) -> &str {
        self.tool_name.as_deref().unwrap_or(UNKNOWN_TOOL)
    }

    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args.get(name)
    }
}

/// Decode a `ToolCall` message.
///
/// Never fails: an absent selector leaves `tool_name` unset, and an
/// argument that cannot be decoded is left out.
pub fn decode_tool_call(buf: &[u8]) -> ToolCall {
    let mut fields = Fields::new(buf);

    let Some((schema, body)) = fields.by_ref().find_map(selector) else {
        return ToolCall::default();
    };

    let extra: Vec<u32> = fields
        .filter_map(|f| selector(f).map(|(other, _)| other.field_number))
        .collect();
    if !extra.is_empty() {
        warn!(
            selected = schema.name,
            ignored = ?extra,
            "tool call carries more than one selector field, keeping the first"
        );
    }

    ToolCall {
        tool_name: Some(schema.name),
        args: decode_args(schema, body),
    }
}

fn selector(field: WireField<'_>) -> Option<(&'static ToolSchema, &[u8])> {
    let schema = tool_by_field(field.field_number)?;
    match field.value {
        WireValue::Bytes(body) => Some((schema, body)),
        WireValue::Varint(_) => None,
    }
}

fn decode_args(schema: &ToolSchema, body: &[u8]) -> BTreeMap<String, ArgValue> {
    let mut args = BTreeMap::new();
    for field in Fields::new(body) {
        let name = schema.arg_name_or_synthesized(field.field_number);
        if let Some(value) = decode_arg_value(&field, &name) {
            args.insert(name.into_owned(), value);
        }
    }
    args
}

/// Coerce one argument field.
///
/// Strings may arrive wrapped as `{1: string}` or bare; the wrapped form is
/// tried first.
fn decode_arg_value(field: &WireField<'_>, name: &str) -> Option<ArgValue> {
    match (field.wire_type, field.value) {
        (WireType::LengthDelimited, WireValue::Bytes(bytes)) => unwrap_string(bytes)
            .or_else(|| std::str::from_utf8(bytes).ok())
            .map(ArgValue::from),
        (WireType::Varint, WireValue::Varint(v)) if name == BOOLEAN_ARG => Some(ArgValue::Bool(v == 1)),
        (WireType::Varint, WireValue::Varint(v)) => Some(ArgValue::Uint(v)),
        _ => None,
    }
}
