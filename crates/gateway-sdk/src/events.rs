//! Events produced while a generation streams.

use gateway_core::{FinishReason, Usage};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One observable step of a streaming generation.
///
/// Events arrive in protocol order: `start`, then per step `start-step`,
/// text/reasoning/tool events, `finish-step`; finally `finish`. A failed
/// request ends the sequence with `error` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum StreamEvent {
    /// Generation started.
    Start,
    /// A model round-trip started.
    StartStep {
        /// Zero-based step number.
        step: u32,
    },
    /// A text block opened.
    TextStart {
        /// Block id.
        id: String,
    },
    /// A fragment of generated text.
    TextDelta {
        /// Block id.
        id: String,
        /// Text fragment.
        text: String,
    },
    /// A text block closed.
    TextEnd {
        /// Block id.
        id: String,
    },
    /// A fragment of model reasoning.
    ReasoningDelta {
        /// Reasoning fragment.
        text: String,
    },
    /// The model began emitting arguments for a tool call.
    ToolInputStart {
        /// Tool call id.
        id: String,
        /// Tool name.
        tool_name: String,
    },
    /// A fragment of tool-call arguments.
    ToolInputDelta {
        /// Tool call id.
        id: String,
        /// Raw argument fragment.
        delta: String,
    },
    /// Tool-call arguments are complete.
    ToolInputEnd {
        /// Tool call id.
        id: String,
    },
    /// The model requested a tool call.
    ToolCall {
        /// Tool call id.
        tool_call_id: String,
        /// Tool name.
        tool_name: String,
        /// Parsed arguments.
        input: Value,
    },
    /// A tool call completed.
    ToolResult {
        /// Tool call id.
        tool_call_id: String,
        /// Tool name.
        tool_name: String,
        /// Arguments the tool ran with.
        input: Value,
        /// Tool output.
        output: Value,
    },
    /// A tool call could not be completed.
    ToolError {
        /// Tool call id.
        tool_call_id: String,
        /// Tool name.
        tool_name: String,
        /// Arguments as received.
        input: Value,
        /// Failure description.
        error: String,
    },
    /// A model round-trip finished.
    FinishStep {
        /// Why the step ended.
        finish_reason: FinishReason,
        /// Token usage for the step.
        usage: Usage,
    },
    /// Generation finished.
    Finish {
        /// Why the last step ended.
        finish_reason: FinishReason,
        /// Token usage summed over all steps.
        total_usage: Usage,
    },
    /// A failure observed while streaming.
    Error {
        /// Failure description.
        message: String,
    },
}

impl StreamEvent {
    /// Wire tag of the event, e.g. `text-delta`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::StartStep { .. } => "start-step",
            Self::TextStart { .. } => "text-start",
            Self::TextDelta { .. } => "text-delta",
            Self::TextEnd { .. } => "text-end",
            Self::ReasoningDelta { .. } => "reasoning-delta",
            Self::ToolInputStart { .. } => "tool-input-start",
            Self::ToolInputDelta { .. } => "tool-input-delta",
            Self::ToolInputEnd { .. } => "tool-input-end",
            Self::ToolCall { .. } => "tool-call",
            Self::ToolResult { .. } => "tool-result",
            Self::ToolError { .. } => "tool-error",
            Self::FinishStep { .. } => "finish-step",
            Self::Finish { .. } => "finish",
            Self::Error { .. } => "error",
        }
    }

    /// Check whether this is the terminal event.
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish { .. })
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{{\"type\":\"{}\"}}", self.kind()),
        }
    }
}
