//! Tool-calling demo: offers the model a `weather` tool and reports whether
//! it asked to use it.

use super::{execute, DemoOutcome, DemoProfile};
use crate::config::RunConfig;
use crate::report;
use crate::weather;
use anyhow::Result;
use gateway_sdk::StreamTextOptions;
use std::io::Write;

/// Prompt sent to the model.
pub const PROMPT: &str = "What is the weather like in San Francisco?";

/// Demo settings.
pub const PROFILE: DemoProfile = DemoProfile {
    feature: "tool calling",
    model: "gpt-4o-mini",
    session_prefix: "tool-calling-demo",
    properties: &[("example", "tool-calling"), ("feature", "function-tools")],
    tags: &["tools", "demo"],
};

/// Run the demo and print its report to `out`.
pub async fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<DemoOutcome> {
    let options = StreamTextOptions::builder(PROMPT)
        .tools(weather::tools())
        .max_retries(config.max_retries())
        .build()?;

    let outcome = execute(config, &PROFILE, options, out).await?;

    writeln!(out)?;
    if outcome.summary.requested_tools() {
        report::success(
            out,
            "Tool calling works! The model requested to use the defined tools.",
        )?;
        writeln!(out, "Check your Helicone dashboard to see:")?;
        report::bullet(out, "Tool definitions sent to the API")?;
        report::bullet(out, "Tool calls requested by the model")?;
        report::bullet(out, "Session tracking with custom properties and tags")?;
    } else {
        report::success(out, "Request completed successfully!")?;
    }

    Ok(outcome)
}
