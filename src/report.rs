//! Console output for the demos.
//!
//! Every function writes to the given writer so the binaries can print to
//! stdout while tests capture into a buffer.

use crate::run::RunSummary;
use colored::Colorize;
use gateway_sdk::StreamEvent;
use std::io::{self, Write};
use std::time::Duration;

/// Print a `=== Title ===` section header preceded by a blank line.
pub fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", format!("=== {title} ===").bold())
}

/// Print one streamed event as a compact JSON line.
pub fn event<W: Write>(out: &mut W, event: &StreamEvent) -> io::Result<()> {
    let line = event.to_string();
    match event {
        StreamEvent::Error { .. } | StreamEvent::ToolError { .. } => writeln!(out, "{}", line.red()),
        _ => writeln!(out, "{line}"),
    }
}

/// Print a success message.
pub fn success<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", "✓".green().bold(), message)
}

/// Print an indented bullet.
pub fn bullet<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "  - {message}")
}

/// Print a `key: value` line.
pub fn key_value<W: Write>(out: &mut W, key: &str, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, "{}: {}", key, value)
}

/// Print token count and finish reason.
pub fn totals<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    key_value(out, "Total tokens", summary.total_tokens)?;
    key_value(out, "Finish reason", summary.finish_reason)
}

/// Print both elapsed times in seconds, with a readable form alongside.
pub fn timings<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    key_value(
        out,
        "Stream duration",
        format_args!(
            "{:.3}s ({})",
            summary.stream_seconds(),
            format_duration(summary.stream_elapsed)
        ),
    )?;
    key_value(
        out,
        "Total duration",
        format_args!(
            "{:.3}s ({})",
            summary.elapsed_seconds(),
            format_duration(summary.total_elapsed)
        ),
    )
}

/// Format a duration as a human-readable string, to the millisecond.
pub fn format_duration(duration: Duration) -> String {
    let millis = Duration::from_millis(duration.as_millis() as u64);
    humantime::format_duration(millis).to_string()
}
