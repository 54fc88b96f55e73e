//! Field-number tables for the agent service's messages.
//!
//! No schema is published for this protocol. The tables below were
//! reconstructed from observed traffic and must stay byte-exact with the
//! service's encoding: a wrong number silently yields wrong or missing
//! semantics.
//!
//! All tables are `'static` and read-only.

use std::borrow::Cow;

/// Kind of an `InteractionUpdate`, keyed by its field number.
///
/// Field numbers 5, 6 and 9-12 are not mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UpdateKind {
    TextDelta,
    ToolCallStarted,
    ToolCallCompleted,
    ThinkingDelta,
    PartialToolCall,
    TokenDelta,
    Heartbeat,
    TurnEnded,
}

impl UpdateKind {
    pub const ALL: [UpdateKind; 8] = [
        UpdateKind::TextDelta,
        UpdateKind::ToolCallStarted,
        UpdateKind::ToolCallCompleted,
        UpdateKind::ThinkingDelta,
        UpdateKind::PartialToolCall,
        UpdateKind::TokenDelta,
        UpdateKind::Heartbeat,
        UpdateKind::TurnEnded,
    ];

    pub fn from_field(field_number: u32) -> Option<Self> {
        match field_number {
            1 => Some(Self::TextDelta),
            2 => Some(Self::ToolCallStarted),
            3 => Some(Self::ToolCallCompleted),
            4 => Some(Self::ThinkingDelta),
            7 => Some(Self::PartialToolCall),
            8 => Some(Self::TokenDelta),
            13 => Some(Self::Heartbeat),
            14 => Some(Self::TurnEnded),
            _ => None,
        }
    }

    pub fn field_number(self) -> u32 {
        match self {
            Self::TextDelta => 1,
            Self::ToolCallStarted => 2,
            Self::ToolCallCompleted => 3,
            Self::ThinkingDelta => 4,
            Self::PartialToolCall => 7,
            Self::TokenDelta => 8,
            Self::Heartbeat => 13,
            Self::TurnEnded => 14,
        }
    }

    /// Stable snake_case name, as used in serialized updates.
    pub fn name(self) -> &'static str {
        match self {
            Self::TextDelta => "text_delta",
            Self::ToolCallStarted => "tool_call_started",
            Self::ToolCallCompleted => "tool_call_completed",
            Self::ThinkingDelta => "thinking_delta",
            Self::PartialToolCall => "partial_tool_call",
            Self::TokenDelta => "token_delta",
            Self::Heartbeat => "heartbeat",
            Self::TurnEnded => "turn_ended",
        }
    }

    /// Whether this kind carries a wrapped text fragment.
    pub fn is_text(self) -> bool {
        matches!(self, Self::TextDelta | Self::ThinkingDelta | Self::TokenDelta)
    }

    /// Whether this kind carries tool-call information.
    pub fn is_tool_call(self) -> bool {
        matches!(
            self,
            Self::ToolCallStarted | Self::ToolCallCompleted | Self::PartialToolCall
        )
    }
}

/// One entry of the `ToolCall` oneof: selector field, tool name, argument layout.
#[derive(Debug)]
pub struct ToolSchema {
    /// Field number of the tool's sub-message inside `ToolCall`.
    pub field_number: u32,
    pub name: &'static str,
    /// Sub-field number to argument name.
    pub args: &'static [(u32, &'static str)],
}

impl ToolSchema {
    pub fn arg_name(&self, field_number: u32) -> Option<&'static str> {
        self.args
            .iter()
            .find(|(n, _)| *n == field_number)
            .map(|(_, name)| *name)
    }

    /// Schema name, or `field_<n>` for a sub-field this table does not know.
    pub fn arg_name_or_synthesized(&self, field_number: u32) -> Cow<'static, str> {
        match self.arg_name(field_number) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("field_{field_number}")),
        }
    }
}

macro_rules! tool {
    ($field:expr, $name:expr, [$(($n:expr, $arg:expr)),* $(,)?]) => {
        ToolSchema {
            field_number: $field,
            name: $name,
            args: &[$(($n, $arg)),*],
        }
    };
}

/// Tool selector table. Field numbers 2, 6, 7 and 11 are unassigned.
pub static TOOLS: [ToolSchema; 26] = [
    tool!(1, "bash", [(1, "command"), (2, "description"), (3, "working_directory")]),
    tool!(3, "delete", [(1, "filePath")]),
    tool!(4, "glob", [(1, "pattern"), (2, "path")]),
    tool!(5, "grep", [(1, "pattern"), (2, "path"), (3, "include")]),
    tool!(8, "read", [(1, "filePath"), (2, "offset"), (3, "limit")]),
    tool!(9, "todowrite", [(1, "todos")]),
    tool!(10, "todoread", []),
    tool!(12, "edit", [(1, "filePath"), (2, "oldString"), (3, "newString"), (4, "replaceAll")]),
    tool!(13, "list", [(1, "path"), (2, "ignore")]),
    tool!(14, "read_lints", []),
    tool!(15, "mcp", [(1, "provider_identifier"), (2, "tool_name"), (3, "tool_call_id"), (4, "args")]),
    tool!(16, "semantic_search", [(1, "query"), (2, "path")]),
    tool!(17, "create_plan", [(1, "plan")]),
    tool!(18, "web_search", [(1, "query")]),
    tool!(19, "task", [(1, "description"), (2, "prompt"), (3, "subagent_type")]),
    tool!(20, "list_mcp_resources", [(1, "provider_identifier")]),
    tool!(21, "read_mcp_resource", [(1, "provider_identifier"), (2, "uri")]),
    tool!(22, "apply_diff", [(1, "filePath"), (2, "diff")]),
    tool!(23, "ask_question", [(1, "question")]),
    tool!(24, "webfetch", [(1, "url"), (2, "format")]),
    tool!(25, "switch_mode", [(1, "mode")]),
    tool!(26, "exa_search", [(1, "query")]),
    tool!(27, "exa_fetch", [(1, "url")]),
    tool!(28, "generate_image", [(1, "prompt")]),
    tool!(29, "record_screen", [(1, "duration")]),
    tool!(30, "computer_use", [(1, "action"), (2, "text"), (3, "coordinate")]),
];

/// Argument whose varint value is a boolean flag.
pub const BOOLEAN_ARG: &str = "replaceAll";

/// Look up a tool by its selector field number.
pub fn tool_by_field(field_number: u32) -> Option<&'static ToolSchema> {
    TOOLS.iter().find(|t| t.field_number == field_number)
}

/// Look up a tool by name.
pub fn tool_by_name(name: &str) -> Option<&'static ToolSchema> {
    TOOLS.iter().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_update_kind_table() {
        let mapped: Vec<(u32, UpdateKind)> = (1..=20)
            .filter_map(|n| UpdateKind::from_field(n).map(|k| (n, k)))
            .collect();
        assert_eq!(
            mapped,
            vec![
                (1, UpdateKind::TextDelta),
                (2, UpdateKind::ToolCallStarted),
                (3, UpdateKind::ToolCallCompleted),
                (4, UpdateKind::ThinkingDelta),
                (7, UpdateKind::PartialToolCall),
                (8, UpdateKind::TokenDelta),
                (13, UpdateKind::Heartbeat),
                (14, UpdateKind::TurnEnded),
            ]
        );
    }

    #[test]
    fn test_update_kind_gaps() {
        for n in [0, 5, 6, 9, 10, 11, 12, 15] {
            assert!(UpdateKind::from_field(n).is_none(), "field {n}");
        }
    }

    #[test]
    fn test_update_kind_field_number_roundtrip() {
        for kind in UpdateKind::ALL {
            assert_eq!(UpdateKind::from_field(kind.field_number()), Some(kind));
        }
    }

    #[test]
    fn test_tool_table_is_unique() {
        let fields: HashSet<u32> = TOOLS.iter().map(|t| t.field_number).collect();
        let names: HashSet<&str> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(fields.len(), TOOLS.len());
        assert_eq!(names.len(), TOOLS.len());
    }

    #[test]
    fn test_tool_selector_gaps() {
        for n in [0, 2, 6, 7, 11, 31] {
            assert!(tool_by_field(n).is_none(), "field {n}");
        }
    }

    #[test]
    fn test_tool_lookups() {
        assert_eq!(tool_by_field(8).map(|t| t.name), Some("read"));
        assert_eq!(tool_by_field(13).map(|t| t.name), Some("list"));
        assert_eq!(tool_by_field(30).map(|t| t.name), Some("computer_use"));
        assert_eq!(tool_by_name("edit").map(|t| t.field_number), Some(12));
        assert!(tool_by_name("ls").is_none());
    }

    #[test]
    fn test_argument_schema() {
        let edit = tool_by_name("edit").unwrap();
        assert_eq!(edit.arg_name(1), Some("filePath"));
        assert_eq!(edit.arg_name(4), Some(BOOLEAN_ARG));
        assert_eq!(edit.arg_name(5), None);

        let mcp = tool_by_name("mcp").unwrap();
        assert_eq!(mcp.arg_name(3), Some("tool_call_id"));

        assert!(tool_by_name("todoread").unwrap().args.is_empty());
        assert!(tool_by_name("read_lints").unwrap().args.is_empty());
    }

    #[test]
    fn test_synthesized_arg_name() {
        let read = tool_by_name("read").unwrap();
        assert_eq!(read.arg_name_or_synthesized(2), "offset");
        assert_eq!(read.arg_name_or_synthesized(9), "field_9");
    }
}
