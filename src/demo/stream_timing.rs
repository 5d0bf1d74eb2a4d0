//! Streaming demo that times the request: once when the last event
//! arrives and once when the usage totals have resolved.

use super::{execute, DemoOutcome, DemoProfile};
use crate::config::RunConfig;
use crate::report;
use anyhow::Result;
use gateway_sdk::{ChatMessage, Prompt, ProviderOptions, ReasoningEffort, StreamTextOptions};
use std::io::Write;

/// System instruction.
pub const SYSTEM: &str = "You are a concise assistant. Answer in at most three sentences.";

/// User question.
pub const QUESTION: &str = "Explain how server-sent events deliver a streamed response.";

/// Demo settings.
pub const PROFILE: DemoProfile = DemoProfile {
    feature: "streaming",
    model: "o4-mini",
    session_prefix: "stream-timing-demo",
    properties: &[("example", "stream-timing"), ("feature", "streaming")],
    tags: &["streaming", "demo"],
};

/// The prompt: a system instruction and one user message.
pub fn prompt() -> Prompt {
    Prompt::messages(Some(SYSTEM.to_string()), vec![ChatMessage::user(QUESTION)])
}

/// Run the demo and print its report to `out`.
pub async fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<DemoOutcome> {
    let options = StreamTextOptions::builder(prompt())
        .provider_options(ProviderOptions::default().reasoning_effort(ReasoningEffort::Low))
        .max_retries(config.max_retries())
        .build()?;

    let outcome = execute(config, &PROFILE, options, out).await?;
    report::timings(out, &outcome.summary)?;

    Ok(outcome)
}
