//! Mock gateway and proxy endpoints for integration testing.
//!
//! Both providers speak the same OpenAI-compatible protocol, so one
//! wiremock server stands in for either.

use crate::fixtures::error_response;
use serde_json::Value;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path every streaming request is sent to.
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request headers, names lowercased.
    pub headers: Vec<(String, String)>,
    /// Parsed JSON body.
    pub body: Value,
}

impl RecordedRequest {
    /// Header value as a string, if present and printable.
    pub fn header(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
    }
}

/// Mock OpenAI-compatible chat endpoint.
pub struct MockGateway {
    pub server: MockServer,
}

impl MockGateway {
    /// Start a new mock server.
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL including the `/v1` prefix.
    pub fn url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    /// Answer every streaming request with `body`.
    pub async fn mock_stream(&self, body: String) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .and(body_partial_json(serde_json::json!({
                "stream": true,
                "stream_options": {"include_usage": true}
            })))
            .respond_with(sse_response(body))
            .mount(&self.server)
            .await;
    }

    /// Reject every request with 401.
    pub async fn mock_auth_error(&self) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(error_response(
                    "invalid_api_key",
                    "Incorrect API key provided",
                )),
            )
            .mount(&self.server)
            .await;
    }

    /// Fail `fail_count` times with `status`, then stream `body`.
    pub async fn mock_flaky_stream(&self, status: u16, fail_count: u64, body: String) {
        let mut failure = ResponseTemplate::new(status)
            .set_body_json(error_response("server_error", "Temporarily unavailable"));
        if status == 429 {
            failure = failure.append_header("Retry-After", "0");
        }

        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(failure)
            .up_to_n_times(fail_count)
            .expect(fail_count)
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(sse_response(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Always fail with `status`.
    pub async fn mock_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(error_response("server_error", "Upstream failure")),
            )
            .mount(&self.server)
            .await;
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|request| RecordedRequest {
                body: serde_json::from_slice(&request.body).unwrap_or(Value::Null),
                headers: request
                    .headers
                    .iter()
                    .filter_map(|(name, value)| {
                        let value = value.to_str().ok()?;
                        Some((name.as_str().to_ascii_lowercase(), value.to_string()))
                    })
                    .collect(),
            })
            .collect()
    }
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/event-stream")
        .set_body_raw(body, "text/event-stream")
}
