//! Request types for the Gateway SDK.

use gateway_core::{ChatMessage, ToolChoice, ToolDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Streaming chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use for completion.
    pub model: String,
    /// Messages in the conversation.
    pub messages: Vec<ChatMessage>,
    /// Tools the model may call.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// How the model picks among `tools`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Sampling temperature (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Reasoning effort hint for reasoning models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    /// User identifier for tracking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Stream the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Streaming options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
    /// Provider-specific top-level body fields, such as gateway telemetry.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl ChatRequest {
    /// Create a new chat request.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            temperature: None,
            max_tokens: None,
            reasoning_effort: None,
            user: None,
            stream: None,
            stream_options: None,
            extensions: BTreeMap::new(),
        }
    }

    /// Turn on streaming with a trailing usage chunk.
    pub(crate) fn into_streaming(mut self) -> Self {
        self.stream = Some(true);
        self.stream_options = Some(StreamOptions {
            include_usage: true,
        });
        self
    }

    /// Apply per-call provider options.
    pub fn apply_options(&mut self, options: &ProviderOptions) {
        if options.reasoning_effort.is_some() {
            self.reasoning_effort = options.reasoning_effort;
        }
        if options.user.is_some() {
            self.user.clone_from(&options.user);
        }
    }
}

/// Streaming options sent with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    /// Ask the server to append a usage-only chunk before `[DONE]`.
    pub include_usage: bool,
}

/// Reasoning effort hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Minimal reasoning.
    Minimal,
    /// Low reasoning effort.
    Low,
    /// Medium reasoning effort.
    Medium,
    /// High reasoning effort.
    High,
}

/// Per-call options forwarded to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderOptions {
    /// Reasoning effort hint.
    pub reasoning_effort: Option<ReasoningEffort>,
    /// End-user identifier.
    pub user: Option<String>,
}

impl ProviderOptions {
    /// Set the reasoning effort.
    #[must_use]
    pub fn reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    /// Set the end-user identifier.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Input to a generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// A single user turn.
    Text(String),
    /// An explicit conversation with an optional system instruction.
    Messages {
        /// System instruction placed before the messages.
        system: Option<String>,
        /// Conversation turns.
        messages: Vec<ChatMessage>,
    },
}

impl Prompt {
    /// Build a message-list prompt.
    pub fn messages(system: Option<String>, messages: Vec<ChatMessage>) -> Self {
        Self::Messages { system, messages }
    }

    /// Check whether the prompt carries anything for the model to answer.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Messages { messages, .. } => messages.is_empty(),
        }
    }

    /// Flatten into the wire message list, system instruction first.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            Self::Text(text) => vec![ChatMessage::user(text)],
            Self::Messages { system, messages } => system
                .map(ChatMessage::system)
                .into_iter()
                .chain(messages)
                .collect(),
        }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
