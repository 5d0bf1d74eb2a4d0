//! # Gateway Core
//!
//! Wire-level value types shared by the gateway SDK and the demo programs.
//!
//! This crate provides the foundational types exchanged with an
//! OpenAI-compatible chat-completions endpoint:
//! - Chat messages and roles
//! - Tool definitions and model-issued tool calls
//! - Finish reasons and token usage

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::{
    ChatMessage, FunctionCall, FunctionDefinition, MessageRole, ToolCall, ToolChoice,
    ToolDefinition,
};
pub use response::{FinishReason, Usage};
