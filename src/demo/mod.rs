//! The two demos and the run loop they share.
//!
//! Each demo configures a client, issues one streaming request, prints every
//! event as it arrives and then prints a short report.

pub mod stream_timing;
pub mod tool_calling;

use crate::config::RunConfig;
use crate::factory::create_model;
use crate::report;
use crate::run::{RunPhase, RunSummary};
use anyhow::{Context, Result};
use futures::StreamExt;
use gateway_sdk::{stream_text, StreamEvent, StreamTextOptions, TelemetryEnvelope};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info};

/// Fixed settings of one demo.
#[derive(Debug, Clone, Copy)]
pub struct DemoProfile {
    /// What the banner says is being tested.
    pub feature: &'static str,
    /// Model id.
    pub model: &'static str,
    /// Prefix of the telemetry session id.
    pub session_prefix: &'static str,
    /// Telemetry properties.
    pub properties: &'static [(&'static str, &'static str)],
    /// Telemetry tags.
    pub tags: &'static [&'static str],
}

impl DemoProfile {
    /// Fresh telemetry envelope with a new session id.
    pub fn telemetry(&self) -> TelemetryEnvelope {
        let envelope = self
            .properties
            .iter()
            .fold(TelemetryEnvelope::new_session(self.session_prefix), |env, (key, value)| {
                env.with_property(*key, *value)
            });
        self.tags.iter().fold(envelope, |env, tag| env.with_tag(*tag))
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct DemoOutcome {
    /// Events in arrival order.
    pub events: Vec<StreamEvent>,
    /// Totals and timings.
    pub summary: RunSummary,
    /// Telemetry session id minted for the run.
    pub session_id: String,
}

/// Run one demo: build the client, stream, print events, resolve totals.
///
/// The caller prints the closing report from the returned summary.
pub(crate) async fn execute<W: Write>(
    config: &RunConfig,
    profile: &DemoProfile,
    options: StreamTextOptions,
    out: &mut W,
) -> Result<DemoOutcome> {
    let mut phase = RunPhase::Idle;
    execute_tracked(config, profile, options, out, &mut phase).await
}

/// [`execute`] with the lifecycle held by the caller. Any error moves
/// `phase` to [`RunPhase::Failed`].
async fn execute_tracked<W: Write>(
    config: &RunConfig,
    profile: &DemoProfile,
    options: StreamTextOptions,
    out: &mut W,
    phase: &mut RunPhase,
) -> Result<DemoOutcome> {
    let outcome = drive(config, profile, options, out, phase).await;
    if let Err(e) = &outcome {
        phase.fail();
        debug!(phase = %phase, error = %e, "Demo run stopped");
    }
    outcome
}

async fn drive<W: Write>(
    config: &RunConfig,
    profile: &DemoProfile,
    options: StreamTextOptions,
    out: &mut W,
    phase: &mut RunPhase,
) -> Result<DemoOutcome> {
    phase.advance(RunPhase::Configuring)?;

    let telemetry = profile.telemetry();
    let session_id = telemetry.session_id.clone();
    let model = create_model(config, profile.model, telemetry)
        .context("failed to create model client")?;
    writeln!(out, "Testing {} with {}...", profile.feature, config.provider())?;
    phase.advance(RunPhase::ClientReady)?;

    info!(session_id = %session_id, model = profile.model, "Starting demo run");

    let started = Instant::now();
    let mut result = stream_text(model, options);
    phase.advance(RunPhase::Streaming)?;

    report::section(out, "Response")?;
    let mut events = Vec::new();
    while let Some(event) = result.full_stream().next().await {
        report::event(out, &event).context("failed to write event")?;
        events.push(event);
    }
    let stream_elapsed = started.elapsed();
    phase.advance(RunPhase::Summarizing)?;

    let totals = result.summary().await.context("request failed")?;
    let total_elapsed = started.elapsed();

    let summary = RunSummary {
        total_tokens: totals.usage.total_tokens,
        finish_reason: totals.finish_reason,
        stream_elapsed,
        total_elapsed,
    };

    report::section(out, "Request Info")?;
    report::totals(out, &summary)?;
    phase.advance(RunPhase::Done)?;

    Ok(DemoOutcome {
        events,
        summary,
        session_id,
    })
}
