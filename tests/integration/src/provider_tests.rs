//! Provider integration tests
//!
//! Both providers hit the same mock endpoint; these tests check what each
//! one puts on the wire and that the event sequence does not depend on the
//! provider.

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_providers::MockGateway;
use futures::StreamExt;
use gateway_sdk::{stream_text, ProviderKind, StreamEvent, StreamTextOptions, TelemetryEnvelope};
use gateway_stream_demos::create_model;
use gateway_stream_demos::demo::tool_calling;
use pretty_assertions::assert_eq;

const MODEL: &str = "gpt-4o-mini";

async fn collect_events(provider: ProviderKind) -> Vec<StreamEvent> {
    let mock = MockGateway::new().await;
    mock.mock_stream(text_stream(MODEL, &["Hello", ", ", "world"]))
        .await;

    let config = run_config(provider, &mock);
    let model = create_model(&config, MODEL, TelemetryEnvelope::new_session("equivalence"))
        .unwrap();
    let options = StreamTextOptions::builder("Say hello").build().unwrap();

    let mut result = stream_text(model, options);
    let events: Vec<StreamEvent> = result.full_stream().collect().await;
    assert_eq!(result.summary().await.unwrap().usage.total_tokens, 27);
    events
}

#[tokio::test]
async fn test_gateway_sends_bearer_key_and_telemetry() {
    init_tracing();
    let mock = MockGateway::new().await;
    mock.mock_stream(weather_call_stream(MODEL, "call_sf", "San Francisco"))
        .await;

    let config = run_config(ProviderKind::Gateway, &mock);
    let mut out = Vec::new();
    let outcome = tool_calling::run(&config, &mut out).await.unwrap();

    let requests = mock.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(
        request.header("authorization").as_deref(),
        Some(format!("Bearer {TEST_API_KEY}").as_str())
    );
    assert!(request.header("helicone-auth").is_none());

    let body = &request.body;
    assert_eq!(body["model"], MODEL);
    assert_eq!(body["stream"], true);
    assert_eq!(body["tools"][0]["function"]["name"], "weather");

    let telemetry = &body["helicone"];
    assert_eq!(telemetry["sessionId"], outcome.session_id.as_str());
    assert!(outcome.session_id.starts_with("tool-calling-demo-"));
    assert_eq!(telemetry["properties"]["example"], "tool-calling");
    assert_eq!(telemetry["properties"]["feature"], "function-tools");
    assert_eq!(telemetry["tags"], serde_json::json!(["demo", "tools"]));
}

#[tokio::test]
async fn test_direct_sends_both_keys_without_telemetry() {
    init_tracing();
    let mock = MockGateway::new().await;
    mock.mock_stream(weather_call_stream(MODEL, "call_sf", "San Francisco"))
        .await;

    let config = run_config(ProviderKind::Openai, &mock);
    let mut out = Vec::new();
    tool_calling::run(&config, &mut out).await.unwrap();

    let requests = mock.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(
        request.header("authorization").as_deref(),
        Some(format!("Bearer {TEST_OPENAI_API_KEY}").as_str())
    );
    assert_eq!(
        request.header("helicone-auth").as_deref(),
        Some(format!("Bearer {TEST_API_KEY}").as_str())
    );
    assert!(request.body.get("helicone").is_none());
}

#[tokio::test]
async fn test_providers_yield_identical_events() {
    init_tracing();
    let gateway = collect_events(ProviderKind::Gateway).await;
    let direct = collect_events(ProviderKind::Openai).await;

    assert_eq!(gateway, direct);

    let text: String = gateway
        .iter()
        .filter_map(|event| match event {
            StreamEvent::TextDelta { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Hello, world");
    assert!(gateway.last().unwrap().is_finish());
}

#[tokio::test]
async fn test_each_run_gets_a_new_session() {
    init_tracing();
    let mock = MockGateway::new().await;
    mock.mock_stream(weather_call_stream(MODEL, "call_sf", "San Francisco"))
        .await;

    let config = run_config(ProviderKind::Gateway, &mock);
    let first = tool_calling::run(&config, &mut Vec::new()).await.unwrap();
    let second = tool_calling::run(&config, &mut Vec::new()).await.unwrap();
    assert_ne!(first.session_id, second.session_id);

    let sent: Vec<String> = mock
        .requests()
        .await
        .iter()
        .map(|request| request.body["helicone"]["sessionId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(sent, vec![first.session_id, second.session_id]);
}
