//! # Gateway Streaming SDK
//!
//! A small Rust SDK for streaming chat completions through an
//! OpenAI-compatible gateway or proxy.
//!
//! ## Features
//!
//! - Async-first design with full `tokio` support
//! - Server-Sent Events parsing with tool-call reassembly
//! - Automatic retries of the initial request with exponential backoff
//! - Two interchangeable providers behind the [`LanguageModel`] trait
//! - Declarative tools executed as the model requests them
//! - Deferred totals (usage, finish reason) that resolve after the stream ends
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gateway_sdk::{stream_text, Client, GatewayModel, StreamTextOptions};
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gateway_sdk::Error> {
//!     let client = Client::builder()
//!         .base_url(gateway_sdk::GATEWAY_BASE_URL)
//!         .api_key("your-api-key")
//!         .max_retries(5)
//!         .build()?;
//!     let model = Arc::new(GatewayModel::new(client, "gpt-4o-mini"));
//!
//!     let options = StreamTextOptions::builder("Tell me a story").build()?;
//!     let mut result = stream_text(model, options);
//!
//!     while let Some(event) = result.full_stream().next().await {
//!         println!("{event}");
//!     }
//!     println!("Total tokens: {}", result.usage().await?.total_tokens);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod client;
mod config;
mod error;
mod events;
mod provider;
mod request;
mod stream_text;
mod streaming;
mod telemetry;
mod tools;

pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{ApiErrorDetail, ApiErrorResponse, Error, Result};
pub use events::StreamEvent;
pub use provider::{
    DirectModel, GatewayModel, LanguageModel, ProviderKind, DIRECT_BASE_URL, GATEWAY_AUTH_HEADER,
    GATEWAY_BASE_URL,
};
pub use request::{ChatRequest, Prompt, ProviderOptions, ReasoningEffort, StreamOptions};
pub use stream_text::{
    stream_text, EventStream, StreamSummary, StreamTextOptions, StreamTextOptionsBuilder,
    StreamTextResult,
};
pub use streaming::{ChatStream, StreamChoice, StreamChunk, StreamDelta, StreamFunctionCall, StreamToolCall};
pub use telemetry::{TelemetryEnvelope, TELEMETRY_FIELD};
pub use tools::{Tool, ToolError, ToolSet};

pub use gateway_core::{ChatMessage, FinishReason, MessageRole, ToolChoice, Usage};
