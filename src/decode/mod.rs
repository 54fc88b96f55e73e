//! Semantic decoding of agent messages.
//!
//! - [`decode_updates`] turns one top-level message into ordered [`Update`]s
//! - [`decode_tool_call`] resolves a `ToolCall` oneof into a tool name and arguments
//!
//! Both are total: malformed input yields fewer results, never an error.

mod tool_call;
mod update;

pub use tool_call::{decode_tool_call, ArgValue, ToolCall, ToolCallInfo, UNKNOWN_TOOL};
pub use update::{decode_updates, decode_updates_detailed, DecodedUpdate, Update, INTERACTION_UPDATE_FIELD};
