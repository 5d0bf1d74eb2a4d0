//! Streamed response bodies in the OpenAI chunk format.

use serde_json::{json, Value};

/// Chunk carrying a text fragment.
pub fn text_chunk(model: &str, content: &str) -> Value {
    chunk(model, json!({"content": content}), None)
}

/// Chunk carrying the finish reason, wire spelling (`stop`, `tool_calls`).
pub fn finish_chunk(model: &str, reason: &str) -> Value {
    chunk(model, json!({}), Some(reason))
}

/// Trailing usage-only chunk.
pub fn usage_chunk(model: &str, prompt_tokens: u32, completion_tokens: u32) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": model,
        "choices": [],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

/// First fragment of a tool call: id and name, no arguments.
pub fn tool_call_start_chunk(model: &str, index: u32, id: &str, name: &str) -> Value {
    chunk(
        model,
        json!({
            "role": "assistant",
            "tool_calls": [{
                "index": index,
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": ""}
            }]
        }),
        None,
    )
}

/// A later fragment of tool-call arguments.
pub fn tool_call_args_chunk(model: &str, index: u32, arguments: &str) -> Value {
    chunk(
        model,
        json!({"tool_calls": [{"index": index, "function": {"arguments": arguments}}]}),
        None,
    )
}

/// Encode chunks as an SSE body terminated by `[DONE]`.
pub fn sse_body(chunks: &[Value]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

/// A plain text answer ending with `stop`.
pub fn text_stream(model: &str, parts: &[&str]) -> String {
    let mut chunks: Vec<Value> = parts.iter().map(|part| text_chunk(model, part)).collect();
    chunks.push(finish_chunk(model, "stop"));
    chunks.push(usage_chunk(model, 24, parts.len() as u32));
    sse_body(&chunks)
}

/// A single `weather` tool call for `location`, arguments split in two.
pub fn weather_call_stream(model: &str, call_id: &str, location: &str) -> String {
    let arguments = json!({"location": location}).to_string();
    let (head, tail) = arguments.split_at(arguments.len() / 2);
    sse_body(&[
        tool_call_start_chunk(model, 0, call_id, "weather"),
        tool_call_args_chunk(model, 0, head),
        tool_call_args_chunk(model, 0, tail),
        finish_chunk(model, "tool_calls"),
        usage_chunk(model, 61, 16),
    ])
}

/// OpenAI-style error body.
pub fn error_response(error_type: &str, message: &str) -> Value {
    json!({
        "error": {
            "type": error_type,
            "message": message,
            "param": null,
            "code": error_type
        }
    })
}

fn chunk(model: &str, delta: Value, finish_reason: Option<&str>) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": model,
        "choices": [{
            "index": 0,
            "delta": delta,
            "finish_reason": finish_reason
        }]
    })
}
