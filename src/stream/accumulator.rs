//! Per-stream reassembly of fragmented content.
//!
//! Text, thinking and tool arguments arrive as fragments spread over many
//! updates. Fragments are concatenated in arrival order; partial tool-call
//! arguments are grouped by `call_id` because several calls can be in flight
//! within one stream.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decode::Update;

/// Streamed arguments of one tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialArgs {
    /// Tool name from the first fragment that carried one.
    pub tool_name: Option<String>,
    /// Concatenated `args_delta` fragments.
    pub buffer: String,
    pub fragments: usize,
}

impl PartialArgs {
    /// Parse the buffer as JSON, once it is complete.
    pub fn parsed(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.buffer).ok()
    }
}

/// Accumulates the updates of one stream.
#[derive(Debug, Default, Clone)]
pub struct StreamAccumulator {
    text: String,
    thinking: String,
    partials: BTreeMap<String, PartialArgs>,
    tool_events: Vec<Update>,
    counts: BTreeMap<&'static str, usize>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one update.
    pub fn push(&mut self, update: &Update) {
        *self.counts.entry(update.kind().name()).or_default() += 1;

        match update {
            Update::TextDelta { text } | Update::TokenDelta { text } => self.text.push_str(text),
            Update::ThinkingDelta { text } => self.thinking.push_str(text),
            Update::PartialToolCall { info } => {
                // fragments without an id share the empty key
                let key = info.call_id.clone().unwrap_or_default();
                let entry = self.partials.entry(key).or_default();
                if entry.tool_name.is_none() {
                    entry.tool_name = info.tool_name.clone();
                }
                if let Some(delta) = &info.args_delta {
                    entry.buffer.push_str(delta);
                    entry.fragments += 1;
                }
                self.tool_events.push(update.clone());
            }
            Update::ToolCallStarted { .. } | Update::ToolCallCompleted { .. } => {
                self.tool_events.push(update.clone());
            }
            Update::Heartbeat | Update::TurnEnded => {}
        }
    }

    pub fn extend<'a>(&mut self, updates: impl IntoIterator<Item = &'a Update>) {
        for update in updates {
            self.push(update);
        }
    }

    /// Assistant text so far (text and token deltas).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Reasoning text so far.
    pub fn thinking(&self) -> &str {
        &self.thinking
    }

    pub fn partial(&self, call_id: &str) -> Option<&PartialArgs> {
        self.partials.get(call_id)
    }

    /// Concatenated argument fragments for `call_id`.
    pub fn partial_args(&self, call_id: &str) -> Option<&str> {
        self.partial(call_id).map(|p| p.buffer.as_str())
    }

    /// Argument fragments for `call_id` parsed as JSON, once they form a document.
    pub fn parsed_partial_args(&self, call_id: &str) -> Option<serde_json::Value> {
        self.partial(call_id).and_then(PartialArgs::parsed)
    }

    pub fn partials(&self) -> &BTreeMap<String, PartialArgs> {
        &self.partials
    }

    /// Tool-call updates (started, completed, partial) in arrival order.
    pub fn tool_events(&self) -> &[Update] {
        &self.tool_events
    }

    /// Number of updates seen per kind name.
    pub fn counts(&self) -> &BTreeMap<&'static str, usize> {
        &self.counts
    }

    pub fn count(&self, kind_name: &str) -> usize {
        self.counts.get(kind_name).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub(crate) fn into_parts(self) -> AccumulatedParts {
        AccumulatedParts {
            text: self.text,
            thinking: self.thinking,
            partials: self.partials,
            tool_events: self.tool_events,
            counts: self
                .counts
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

pub(crate) struct AccumulatedParts {
    pub text: String,
    pub thinking: String,
    pub partials: BTreeMap<String, PartialArgs>,
    pub tool_events: Vec<Update>,
    pub counts: BTreeMap<String, usize>,
}
