//! End-to-end integration tests
//!
//! Run each demo exactly as the binaries do, against a mock endpoint, and
//! check both the returned outcome and the printed report.

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_providers::MockGateway;
use gateway_sdk::{Error, FinishReason, ProviderKind, StreamEvent};
use gateway_stream_demos::demo::{stream_timing, tool_calling};
use gateway_stream_demos::weather::TEMPERATURE_RANGE;

/// E2E test: timed stream from a reasoning model
#[tokio::test]
async fn test_e2e_stream_timing() {
    init_tracing();
    disable_colors();
    let mock = MockGateway::new().await;
    mock.mock_stream(text_stream(
        "o4-mini",
        &["Server-sent events ", "push chunks ", "over one response."],
    ))
    .await;

    for provider in [ProviderKind::Gateway, ProviderKind::Openai] {
        let config = run_config(provider, &mock);
        let mut out = Vec::new();
        let outcome = stream_timing::run(&config, &mut out).await.unwrap();

        let summary = &outcome.summary;
        assert_eq!(summary.finish_reason, FinishReason::Stop);
        assert!(summary.total_tokens >= 1);
        assert_eq!(summary.total_tokens, 27);
        assert!(summary.total_elapsed >= summary.stream_elapsed);
        assert!(!summary.requested_tools());

        let output = output_string(out);
        assert!(output.contains(&format!("Testing streaming with {provider}...")));
        assert!(output.contains("=== Response ==="));
        assert!(output.contains("=== Request Info ==="));
        assert!(output.contains("Total tokens: 27"));
        assert!(output.contains("Finish reason: stop"));
        assert!(output.contains("Stream duration:"));
    }

    let bodies: Vec<_> = mock.requests().await.into_iter().map(|r| r.body).collect();
    assert_eq!(bodies.len(), 2);
    for body in &bodies {
        assert_eq!(body["model"], "o4-mini");
        assert_eq!(body["reasoning_effort"], "low");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], stream_timing::QUESTION);
    }
}

/// E2E test: the model asks for the weather tool and the tool runs
#[tokio::test]
async fn test_e2e_tool_calling() {
    init_tracing();
    disable_colors();
    let mock = MockGateway::new().await;
    mock.mock_stream(weather_call_stream("gpt-4o-mini", "call_sf", "San Francisco"))
        .await;

    let config = run_config(ProviderKind::Gateway, &mock);
    let mut out = Vec::new();
    let outcome = tool_calling::run(&config, &mut out).await.unwrap();

    let position = |kind: &str| {
        outcome
            .events
            .iter()
            .position(|event| event.kind() == kind)
            .unwrap_or_else(|| panic!("missing {kind} event"))
    };
    let call = position("tool-call");
    let result = position("tool-result");
    let finish = position("finish");
    assert!(call < result && result < finish);
    assert_eq!(finish, outcome.events.len() - 1);

    let calls = outcome
        .events
        .iter()
        .filter(|event| event.kind() == "tool-call")
        .count();
    assert_eq!(calls, 1);

    match &outcome.events[result] {
        StreamEvent::ToolResult {
            tool_call_id,
            tool_name,
            input,
            output,
        } => {
            assert_eq!(tool_call_id, "call_sf");
            assert_eq!(tool_name, "weather");
            assert_eq!(input["location"], "San Francisco");
            assert_eq!(output["location"], "San Francisco");
            let temperature = output["temperature"].as_i64().unwrap();
            assert!(TEMPERATURE_RANGE.contains(&temperature));
        }
        other => panic!("expected tool result, got {other:?}"),
    }

    assert_eq!(outcome.summary.finish_reason, FinishReason::ToolCalls);
    assert_eq!(outcome.summary.total_tokens, 77);
    assert!(outcome.summary.requested_tools());

    let output = output_string(out);
    assert!(output.contains("Testing tool calling with gateway..."));
    assert!(output.contains("Finish reason: tool-calls"));
    assert!(output.contains("✓ Tool calling works!"));
    assert!(output.contains("Check your Helicone dashboard to see:"));

    // One round-trip only.
    assert_eq!(mock.requests().await.len(), 1);
}

/// E2E test: a plain answer still reports success
#[tokio::test]
async fn test_e2e_tool_calling_without_tool_use() {
    init_tracing();
    disable_colors();
    let mock = MockGateway::new().await;
    mock.mock_stream(text_stream("gpt-4o-mini", &["It is sunny."]))
        .await;

    let config = run_config(ProviderKind::Openai, &mock);
    let mut out = Vec::new();
    let outcome = tool_calling::run(&config, &mut out).await.unwrap();

    assert_eq!(outcome.summary.finish_reason, FinishReason::Stop);
    let output = output_string(out);
    assert!(output.contains("✓ Request completed successfully!"));
    assert!(!output.contains("Tool calling works!"));
}

/// E2E test: a rejected key fails the run
#[tokio::test]
async fn test_e2e_authentication_failure() {
    init_tracing();
    disable_colors();
    let mock = MockGateway::new().await;
    mock.mock_auth_error().await;

    let config = run_config(ProviderKind::Gateway, &mock);
    let mut out = Vec::new();
    let err = tool_calling::run(&config, &mut out).await.unwrap_err();

    let sdk_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .expect("sdk error in chain");
    assert!(matches!(sdk_error.root(), Error::Authentication { .. }));

    let output = output_string(out);
    assert!(output.contains("error"));
    assert!(!output.contains("=== Request Info ==="));
}
