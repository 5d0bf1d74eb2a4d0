//! Streaming support for the Gateway SDK.

use crate::error::{ApiErrorResponse, Error, Result};
use bytes::Bytes;
use futures::stream::Stream;
use gateway_core::{FinishReason, Usage};
use pin_project_lite::pin_project;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};

/// A chunk from a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Unique identifier for this completion.
    #[serde(default)]
    pub id: String,
    /// Object type (always "chat.completion.chunk").
    #[serde(default)]
    pub object: String,
    /// Unix timestamp of when the chunk was created.
    #[serde(default)]
    pub created: i64,
    /// Model used for the completion.
    #[serde(default)]
    pub model: String,
    /// List of completion choices. Empty on the trailing usage chunk.
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    /// Usage information (only in final chunk with stream_options).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl StreamChunk {
    /// Get the content delta from the first choice.
    pub fn content(&self) -> &str {
        self.first_delta()
            .and_then(|d| d.content.as_deref())
            .unwrap_or("")
    }

    /// Get the reasoning delta from the first choice.
    pub fn reasoning(&self) -> &str {
        self.first_delta()
            .and_then(|d| d.reasoning_content.as_deref())
            .unwrap_or("")
    }

    /// Get the tool call fragments from the first choice.
    pub fn tool_calls(&self) -> &[StreamToolCall] {
        self.first_delta()
            .and_then(|d| d.tool_calls.as_deref())
            .unwrap_or(&[])
    }

    /// Get the raw finish reason if present.
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }

    /// Get the finish reason mapped to [`FinishReason`].
    pub fn mapped_finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason().map(FinishReason::from_openai)
    }

    fn first_delta(&self) -> Option<&StreamDelta> {
        self.choices.first().map(|c| &c.delta)
    }
}

/// A choice in a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    /// Index of this choice.
    #[serde(default)]
    pub index: u32,
    /// The delta content.
    #[serde(default)]
    pub delta: StreamDelta,
    /// Reason for completion (only in final chunk).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Delta content in a streaming response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamDelta {
    /// Role of the message (only in first chunk).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Reasoning fragment, for providers that stream it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    /// Tool calls (streaming).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<StreamToolCall>>,
}

/// A tool call in a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamToolCall {
    /// Index of this tool call.
    #[serde(default)]
    pub index: u32,
    /// Tool call ID (only in first chunk for this tool call).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Type of tool.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tool_type: Option<String>,
    /// Function details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<StreamFunctionCall>,
}

/// A function call in a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFunctionCall {
    /// Function name (only in first chunk).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

pin_project! {
    /// A stream of chat completion chunks.
    ///
    /// Single pass: once it has returned `None` or an error it keeps returning
    /// `None`.
    pub struct ChatStream {
        #[pin]
        inner: Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>,
        done: bool,
    }
}

impl ChatStream {
    /// Create a new chat stream from a byte stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + 'static,
    {
        Self {
            inner: Box::pin(parse_sse_stream(stream)),
            done: false,
        }
    }

    /// Check if the stream is done.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream")
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Stream for ChatStream {
    type Item = Result<StreamChunk>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(e))) => {
                *this.done = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                *this.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Outcome of one SSE `data:` payload.
enum SseData {
    Chunk(Box<StreamChunk>),
    Done,
    Failed(Error),
    Skip,
}

fn parse_data(data: &str) -> SseData {
    let data = data.trim();
    if data == "[DONE]" {
        return SseData::Done;
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => SseData::Chunk(Box::new(chunk)),
        Err(e) => {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(data) {
                return SseData::Failed(Error::streaming(api_error.error.message));
            }
            // Log but don't fail on parse errors for individual chunks
            tracing::debug!(error = %e, data = %data, "Failed to parse chunk");
            SseData::Skip
        }
    }
}

/// Split one complete SSE event into its `data:` payload.
fn event_data(event: &str) -> Option<String> {
    let lines: Vec<&str> = event
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|line| line.strip_prefix(' ').unwrap_or(line))
        .collect();

    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Find the end of the next complete event, returning (event end, separator length).
fn next_event_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let crlf = buffer.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Parse an SSE stream into chunks.
///
/// Bytes are buffered until a full event is available so multi-byte
/// characters split across network reads decode correctly.
fn parse_sse_stream<S>(stream: S) -> impl Stream<Item = Result<StreamChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send,
{
    async_stream::stream! {
        use futures::StreamExt;

        let mut stream = std::pin::pin!(stream);
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(result) = stream.next().await {
            let bytes = match result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(Error::Http(e));
                    return;
                }
            };

            buffer.extend_from_slice(&bytes);

            while let Some((event_end, separator)) = next_event_boundary(&buffer) {
                let event: Vec<u8> = buffer.drain(..event_end + separator).collect();
                let event = match std::str::from_utf8(&event[..event_end]) {
                    Ok(text) => text.to_string(),
                    Err(e) => {
                        yield Err(Error::parse_error(format!("Invalid UTF-8: {}", e)));
                        return;
                    }
                };

                let Some(data) = event_data(&event) else { continue };
                match parse_data(&data) {
                    SseData::Chunk(chunk) => yield Ok(*chunk),
                    SseData::Done => return,
                    SseData::Failed(e) => {
                        yield Err(e);
                        return;
                    }
                    SseData::Skip => {}
                }
            }
        }

        // Process any remaining data in buffer
        let rest = String::from_utf8_lossy(&buffer).to_string();
        if let Some(data) = event_data(&rest) {
            match parse_data(&data) {
                SseData::Chunk(chunk) => yield Ok(*chunk),
                SseData::Failed(e) => yield Err(e),
                SseData::Done | SseData::Skip => {}
            }
        }
    }
}
