//! Stream semantics against a live HTTP endpoint: single-pass events,
//! retries and request failures.

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_providers::MockGateway;
use futures::StreamExt;
use gateway_sdk::{
    stream_text, Error, FinishReason, ProviderKind, StreamEvent, StreamTextOptions,
    StreamTextResult, TelemetryEnvelope,
};
use gateway_stream_demos::create_model;

const MODEL: &str = "gpt-4o-mini";

fn start(mock: &MockGateway, max_retries: u32) -> StreamTextResult {
    let config = run_config(ProviderKind::Gateway, mock);
    let model = create_model(&config, MODEL, TelemetryEnvelope::new_session("stream-test"))
        .unwrap();
    let options = StreamTextOptions::builder("Say hello")
        .max_retries(max_retries)
        .build()
        .unwrap();
    stream_text(model, options)
}

#[tokio::test]
async fn test_events_are_single_pass() {
    init_tracing();
    let mock = MockGateway::new().await;
    mock.mock_stream(text_stream(MODEL, &["Hi"])).await;

    let mut result = start(&mock, 0);
    let first: Vec<StreamEvent> = result.full_stream().collect().await;
    assert!(!first.is_empty());
    assert!(result.full_stream().is_done());

    let second: Vec<StreamEvent> = result.full_stream().collect().await;
    assert!(second.is_empty());

    // Totals stay available after draining.
    assert_eq!(result.finish_reason().await.unwrap(), FinishReason::Stop);
    assert_eq!(result.usage().await.unwrap().total_tokens, 25);
}

#[tokio::test]
async fn test_totals_resolve_without_draining() {
    init_tracing();
    let mock = MockGateway::new().await;
    mock.mock_stream(text_stream(MODEL, &["a", "b"])).await;

    let result = start(&mock, 0);
    let summary = result.summary().await.unwrap();
    assert_eq!(summary.finish_reason, FinishReason::Stop);
    assert_eq!(summary.usage.total_tokens, 26);
    assert_eq!(summary.steps, 1);
}

#[tokio::test]
async fn test_retries_unavailable_then_streams() {
    init_tracing();
    let mock = MockGateway::new().await;
    mock.mock_flaky_stream(503, 2, text_stream(MODEL, &["recovered"]))
        .await;

    let mut result = start(&mock, 5);
    let events: Vec<StreamEvent> = result.full_stream().collect().await;

    assert!(events.iter().all(|event| event.kind() != "error"));
    assert!(events.last().unwrap().is_finish());
    assert_eq!(result.finish_reason().await.unwrap(), FinishReason::Stop);
    assert_eq!(mock.requests().await.len(), 3);
}

#[tokio::test]
async fn test_honours_retry_after_on_rate_limit() {
    init_tracing();
    let mock = MockGateway::new().await;
    mock.mock_flaky_stream(429, 1, text_stream(MODEL, &["ok"])).await;

    let result = start(&mock, 5);
    assert_eq!(result.finish_reason().await.unwrap(), FinishReason::Stop);
    assert_eq!(mock.requests().await.len(), 2);
}

#[tokio::test]
async fn test_gives_up_after_retry_budget() {
    init_tracing();
    let mock = MockGateway::new().await;
    mock.mock_failure(500).await;

    let mut result = start(&mock, 2);
    let events: Vec<StreamEvent> = result.full_stream().collect().await;
    assert!(matches!(events.last(), Some(StreamEvent::Error { .. })));
    assert!(!events.iter().any(StreamEvent::is_finish));

    let err = result.summary().await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(mock.requests().await.len(), 3);
}

#[tokio::test]
async fn test_authentication_failure_surfaces_everywhere() {
    init_tracing();
    let mock = MockGateway::new().await;
    mock.mock_auth_error().await;

    let mut result = start(&mock, 5);
    let events: Vec<StreamEvent> = result.full_stream().collect().await;

    match events.last() {
        Some(StreamEvent::Error { message }) => {
            assert!(message.contains("Incorrect API key provided"));
        }
        other => panic!("expected error event, got {other:?}"),
    }

    let err = result.usage().await.unwrap_err();
    assert!(matches!(err.root(), Error::Authentication { .. }));
    let err = result.finish_reason().await.unwrap_err();
    assert!(matches!(err.root(), Error::Authentication { .. }));

    // 401 is not retried.
    assert_eq!(mock.requests().await.len(), 1);
}
