//! Lifecycle of a single demo run.

use gateway_sdk::FinishReason;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Where a run is in its lifecycle.
///
/// ```text
/// Idle -> Configuring -> ClientReady -> Streaming -> Summarizing -> Done
///            |                             |             |
///            +----------> Failed <---------+-------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunPhase {
    /// Nothing has happened yet.
    #[default]
    Idle,
    /// Reading configuration and building the client.
    Configuring,
    /// The client exists; no request has been sent.
    ClientReady,
    /// The request is in flight and events are being drained.
    Streaming,
    /// Events are exhausted; totals are being resolved.
    Summarizing,
    /// The report has been produced.
    Done,
    /// The run stopped on an error.
    Failed,
}

/// An illegal lifecycle transition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal run transition from {from} to {to}")]
pub struct PhaseError {
    /// Phase the run was in.
    pub from: RunPhase,
    /// Phase that was requested.
    pub to: RunPhase,
}

impl RunPhase {
    /// Check whether `next` may follow `self`.
    pub fn can_advance_to(self, next: Self) -> bool {
        use RunPhase::{ClientReady, Configuring, Done, Failed, Idle, Streaming, Summarizing};

        matches!(
            (self, next),
            (Idle, Configuring)
                | (Configuring, ClientReady)
                | (ClientReady, Streaming)
                | (Streaming, Summarizing)
                | (Summarizing, Done)
                | (Configuring | Streaming | Summarizing, Failed)
        )
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn advance(&mut self, next: Self) -> Result<(), PhaseError> {
        if !self.can_advance_to(next) {
            return Err(PhaseError {
                from: *self,
                to: next,
            });
        }
        debug!(from = %self, to = %next, "Run phase changed");
        *self = next;
        Ok(())
    }

    /// Mark the run failed if the current phase allows it.
    pub fn fail(&mut self) {
        if self.advance(Self::Failed).is_err() {
            debug!(phase = %self, "Failure outside a fallible phase");
        }
    }

    /// Check whether the run has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Lowercase phase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Configuring => "configuring",
            Self::ClientReady => "client-ready",
            Self::Streaming => "streaming",
            Self::Summarizing => "summarizing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Tokens used across the whole generation.
    pub total_tokens: u32,
    /// Why the generation ended.
    pub finish_reason: FinishReason,
    /// From just before the request to the last event.
    pub stream_elapsed: Duration,
    /// From just before the request to resolved totals.
    pub total_elapsed: Duration,
}

impl RunSummary {
    /// Seconds until the last event.
    pub fn stream_seconds(&self) -> f64 {
        self.stream_elapsed.as_secs_f64()
    }

    /// Seconds until the totals resolved.
    pub fn elapsed_seconds(&self) -> f64 {
        self.total_elapsed.as_secs_f64()
    }

    /// Check whether the model asked for tools.
    pub fn requested_tools(&self) -> bool {
        self.finish_reason == FinishReason::ToolCalls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut phase = RunPhase::default();
        for next in [
            RunPhase::Configuring,
            RunPhase::ClientReady,
            RunPhase::Streaming,
            RunPhase::Summarizing,
            RunPhase::Done,
        ] {
            phase.advance(next).unwrap();
        }
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut phase = RunPhase::Idle;
        let err = phase.advance(RunPhase::Streaming).unwrap_err();
        assert_eq!(err.from, RunPhase::Idle);
        assert_eq!(err.to, RunPhase::Streaming);
        assert_eq!(phase, RunPhase::Idle);
        assert_eq!(
            err.to_string(),
            "illegal run transition from idle to streaming"
        );

        assert!(!RunPhase::Done.can_advance_to(RunPhase::Failed));
        assert!(!RunPhase::ClientReady.can_advance_to(RunPhase::Failed));
        assert!(!RunPhase::Failed.can_advance_to(RunPhase::Configuring));
    }

    #[test]
    fn test_failure_is_reachable_from_fallible_phases() {
        for start in [RunPhase::Configuring, RunPhase::Streaming, RunPhase::Summarizing] {
            let mut phase = start;
            phase.fail();
            assert_eq!(phase, RunPhase::Failed);
        }

        let mut phase = RunPhase::Done;
        phase.fail();
        assert_eq!(phase, RunPhase::Done);
    }

    #[test]
    fn test_summary_seconds() {
        let summary = RunSummary {
            total_tokens: 42,
            finish_reason: FinishReason::ToolCalls,
            stream_elapsed: Duration::from_millis(1500),
            total_elapsed: Duration::from_millis(1502),
        };
        assert!((summary.stream_seconds() - 1.5).abs() < f64::EPSILON);
        assert!(summary.elapsed_seconds() >= summary.stream_seconds());
        assert!(summary.requested_tools());
    }
}
