//! Terminal response fields: finish reason and token usage.

use serde::{Deserialize, Serialize};

/// Reason the model stopped generating.
///
/// Parsed from the OpenAI wire names (`tool_calls`, `content_filter`, ...) and
/// displayed in kebab-case (`tool-calls`, `content-filter`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    /// Natural end of the message or a stop sequence
    Stop,
    /// Token limit reached
    Length,
    /// Output withheld by a content filter
    ContentFilter,
    /// The model requested one or more tool calls
    ToolCalls,
    /// Generation stopped because of an error
    Error,
    /// A reason the provider reported that has no dedicated variant
    Other,
    /// The stream ended without reporting a reason
    Unknown,
}

impl FinishReason {
    /// Map an OpenAI-compatible `finish_reason` string.
    #[must_use]
    pub fn from_openai(reason: &str) -> Self {
        match reason {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "content_filter" => Self::ContentFilter,
            "tool_calls" | "function_call" => Self::ToolCalls,
            "error" => Self::Error,
            _ => Self::Other,
        }
    }

    /// Kebab-case name of the reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content-filter",
            Self::ToolCalls => "tool-calls",
            Self::Error => "error",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Number of tokens in the completion.
    #[serde(default)]
    pub completion_tokens: u32,
    /// Total number of tokens.
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    /// Create new usage statistics.
    #[must_use]
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Check if any tokens were used.
    #[must_use]
    pub fn has_usage(&self) -> bool {
        self.total_tokens > 0
    }
}

impl std::ops::Add for Usage {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            prompt_tokens: self.prompt_tokens.saturating_add(other.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(other.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(other.total_tokens),
        }
    }
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
