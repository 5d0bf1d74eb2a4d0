//! Streaming text generation.
//!
//! [`stream_text`] starts a generation in a background task and returns at
//! once. The caller drains [`StreamTextResult::full_stream`] for live events
//! and awaits [`StreamTextResult::usage`] or
//! [`StreamTextResult::finish_reason`] for totals, which resolve only after
//! the exchange has completed. Draining the events is not required for the
//! totals to resolve.

use crate::error::{Error, Result};
use crate::events::StreamEvent;
use crate::provider::LanguageModel;
use crate::request::{ChatRequest, Prompt, ProviderOptions};
use crate::streaming::StreamToolCall;
use crate::tools::ToolSet;
use futures::stream::{Stream, StreamExt};
use gateway_core::{ChatMessage, FinishReason, ToolCall, ToolChoice, Usage};
use serde_json::Value;
use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info_span, trace, warn, Instrument};

/// Options for a single [`stream_text`] call.
#[derive(Debug, Clone)]
pub struct StreamTextOptions {
    prompt: Prompt,
    tools: ToolSet,
    tool_choice: Option<ToolChoice>,
    provider_options: ProviderOptions,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_retries: Option<u32>,
    max_steps: u32,
}

impl StreamTextOptions {
    /// Start building options for the given prompt.
    pub fn builder(prompt: impl Into<Prompt>) -> StreamTextOptionsBuilder {
        StreamTextOptionsBuilder::new(prompt.into())
    }

    /// The prompt.
    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// Declared tools.
    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Retry budget for the initial request; `None` uses the client default.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// Maximum number of model round-trips.
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        // The model id is filled in by the provider.
        let mut request = ChatRequest::new(String::new(), messages);
        request.tools = self.tools.definitions();
        if !self.tools.is_empty() {
            request.tool_choice.clone_from(&self.tool_choice);
        }
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        request.apply_options(&self.provider_options);
        request
    }
}

/// Builder for [`StreamTextOptions`].
#[derive(Debug, Clone)]
pub struct StreamTextOptionsBuilder {
    options: StreamTextOptions,
}

impl StreamTextOptionsBuilder {
    fn new(prompt: Prompt) -> Self {
        Self {
            options: StreamTextOptions {
                prompt,
                tools: ToolSet::new(),
                tool_choice: None,
                provider_options: ProviderOptions::default(),
                temperature: None,
                max_tokens: None,
                max_retries: None,
                max_steps: 1,
            },
        }
    }

    /// Declare tools the model may call.
    pub fn tools(mut self, tools: ToolSet) -> Self {
        self.options.tools = tools;
        self
    }

    /// Control how the model picks among the tools.
    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.options.tool_choice = Some(choice);
        self
    }

    /// Set provider-specific options.
    pub fn provider_options(mut self, options: ProviderOptions) -> Self {
        self.options.provider_options = options;
        self
    }

    /// Set the sampling temperature (0.0 to 2.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens to generate per step.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    /// Set the retry budget for the initial request of each step.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.options.max_retries = Some(max_retries);
        self
    }

    /// Allow tool results to be fed back for up to `max_steps` round-trips.
    pub fn max_steps(mut self, max_steps: u32) -> Self {
        self.options.max_steps = max_steps;
        self
    }

    /// Validate and build the options.
    pub fn build(self) -> Result<StreamTextOptions> {
        let options = self.options;

        if options.prompt.is_empty() {
            return Err(Error::invalid_request("prompt must not be empty"));
        }
        if options.max_steps == 0 {
            return Err(Error::invalid_request("max_steps must be at least 1"));
        }
        if let Some(temperature) = options.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::invalid_request(
                    "temperature must be between 0.0 and 2.0",
                ));
            }
        }
        if let Some(ToolChoice::Tool { function, .. }) = &options.tool_choice {
            if options.tools.get(&function.name).is_none() {
                return Err(Error::invalid_request(format!(
                    "tool_choice names undeclared tool '{}'",
                    function.name
                )));
            }
        }

        Ok(options)
    }
}

/// Totals of a completed generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSummary {
    /// Why the last step ended.
    pub finish_reason: FinishReason,
    /// Token usage summed over all steps.
    pub usage: Usage,
    /// Number of model round-trips made.
    pub steps: u32,
}

type Outcome = Option<std::result::Result<StreamSummary, Arc<Error>>>;

/// Handle to a running generation.
///
/// Dropping the handle cancels the generation: the request is closed and no
/// further tool handlers run.
#[derive(Debug)]
pub struct StreamTextResult {
    events: EventStream,
    outcome: watch::Receiver<Outcome>,
    producer: AbortHandle,
}

impl StreamTextResult {
    /// The live event sequence.
    ///
    /// Single pass: once drained, draining again yields nothing.
    pub fn full_stream(&mut self) -> &mut EventStream {
        &mut self.events
    }

    /// Token usage summed over all steps.
    pub async fn usage(&self) -> Result<Usage> {
        self.summary().await.map(|s| s.usage)
    }

    /// Why the generation ended.
    pub async fn finish_reason(&self) -> Result<FinishReason> {
        self.summary().await.map(|s| s.finish_reason)
    }

    /// All totals at once. Waits for the generation to complete.
    pub async fn summary(&self) -> Result<StreamSummary> {
        let mut outcome = self.outcome.clone();
        let resolved = outcome
            .wait_for(Option::is_some)
            .await
            .map_err(|_| Error::internal("generation task ended without a result"))?;

        match &*resolved {
            Some(Ok(summary)) => Ok(*summary),
            Some(Err(error)) => Err(Error::Generation(Arc::clone(error))),
            None => Err(Error::internal("generation result missing")),
        }
    }
}

impl Drop for StreamTextResult {
    fn drop(&mut self) {
        // No-op once the producer has finished.
        self.producer.abort();
    }
}

/// Events of a running generation, in arrival order.
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<StreamEvent>,
    done: bool,
}

impl EventStream {
    /// Check whether the stream has been drained.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl Stream for EventStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(event)) => Poll::Ready(Some(event)),
            Poll::Ready(None) => {
                self.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Start a streaming generation.
///
/// Must be called from within a tokio runtime. Returns immediately; the
/// request is issued by a background task.
pub fn stream_text(model: Arc<dyn LanguageModel>, options: StreamTextOptions) -> StreamTextResult {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = watch::channel(None);

    let span = info_span!(
        "stream_text",
        model = %model.model_id(),
        provider = %model.provider(),
    );

    let producer = tokio::spawn(
        async move {
            let producer = Producer {
                model,
                options,
                events: event_tx,
            };
            let outcome = producer.run().await.map_err(Arc::new);
            outcome_tx.send_replace(Some(outcome));
        }
        .instrument(span),
    );

    StreamTextResult {
        events: EventStream {
            receiver: event_rx,
            done: false,
        },
        outcome: outcome_rx,
        producer: producer.abort_handle(),
    }
}

/// What one model round-trip produced.
struct StepOutcome {
    finish_reason: FinishReason,
    usage: Usage,
    text: String,
    tool_calls: Vec<ExecutedCall>,
}

/// A tool call after its handler ran.
struct ExecutedCall {
    id: String,
    name: String,
    arguments: String,
    /// Output or error payload returned to the model on the next step.
    reply: Value,
}

struct Producer {
    model: Arc<dyn LanguageModel>,
    options: StreamTextOptions,
    events: mpsc::UnboundedSender<StreamEvent>,
}

impl Producer {
    async fn run(self) -> Result<StreamSummary> {
        self.emit(StreamEvent::Start);

        let mut messages = self.options.prompt.clone().into_messages();
        let mut total = Usage::default();
        let mut step = 0;

        loop {
            self.emit(StreamEvent::StartStep { step });

            let outcome = match self.step(step, messages.clone()).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(step, error = %error, "Generation failed");
                    self.emit(StreamEvent::Error {
                        message: error.to_string(),
                    });
                    return Err(error);
                }
            };

            total += outcome.usage;
            self.emit(StreamEvent::FinishStep {
                finish_reason: outcome.finish_reason,
                usage: outcome.usage,
            });
            step += 1;

            let continue_with_tools = outcome.finish_reason == FinishReason::ToolCalls
                && !outcome.tool_calls.is_empty()
                && step < self.options.max_steps;

            if !continue_with_tools {
                debug!(steps = step, finish_reason = %outcome.finish_reason, "Generation finished");
                self.emit(StreamEvent::Finish {
                    finish_reason: outcome.finish_reason,
                    total_usage: total,
                });
                return Ok(StreamSummary {
                    finish_reason: outcome.finish_reason,
                    usage: total,
                    steps: step,
                });
            }

            let calls = outcome
                .tool_calls
                .iter()
                .map(|call| ToolCall::function(&call.id, &call.name, &call.arguments))
                .collect();
            messages.push(ChatMessage::assistant_tool_calls(outcome.text, calls));
            for call in outcome.tool_calls {
                messages.push(ChatMessage::tool(call.id, call.reply.to_string()));
            }
        }
    }

    async fn step(&self, step: u32, messages: Vec<ChatMessage>) -> Result<StepOutcome> {
        let request = self.options.request(messages);
        let mut chunks = self.model.stream(request, self.options.max_retries).await?;

        let text_id = step.to_string();
        let mut text = String::new();
        let mut text_open = false;
        let mut tool_calls = ToolCallAccumulator::default();
        let mut finish_reason = None;
        let mut usage = Usage::default();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            trace!(chunk_id = %chunk.id, "Received chunk");

            let reasoning = chunk.reasoning();
            if !reasoning.is_empty() {
                self.emit(StreamEvent::ReasoningDelta {
                    text: reasoning.to_string(),
                });
            }

            let content = chunk.content();
            if !content.is_empty() {
                if !text_open {
                    self.emit(StreamEvent::TextStart {
                        id: text_id.clone(),
                    });
                    text_open = true;
                }
                text.push_str(content);
                self.emit(StreamEvent::TextDelta {
                    id: text_id.clone(),
                    text: content.to_string(),
                });
            }

            for fragment in chunk.tool_calls() {
                for event in tool_calls.push(fragment) {
                    self.emit(event);
                }
            }

            if let Some(reason) = chunk.mapped_finish_reason() {
                finish_reason = Some(reason);
            }
            if let Some(chunk_usage) = chunk.usage {
                usage = chunk_usage;
            }
        }

        if text_open {
            self.emit(StreamEvent::TextEnd { id: text_id });
        }

        let finish_reason = finish_reason.unwrap_or_else(|| {
            debug!(step, "Stream ended without a finish reason");
            FinishReason::Unknown
        });

        let tool_calls = tool_calls
            .finish()
            .into_iter()
            .map(|call| {
                self.emit(StreamEvent::ToolInputEnd {
                    id: call.id.clone(),
                });
                self.execute(call)
            })
            .collect();

        Ok(StepOutcome {
            finish_reason,
            usage,
            text,
            tool_calls,
        })
    }

    fn execute(&self, call: PendingCall) -> ExecutedCall {
        let PendingCall {
            id,
            name,
            arguments,
        } = call;

        let input = if arguments.trim().is_empty() {
            Ok(Value::Object(serde_json::Map::new()))
        } else {
            serde_json::from_str::<Value>(&arguments)
        };

        let input = match input {
            Ok(input) => input,
            Err(e) => {
                let error = format!("invalid tool arguments: {e}");
                return self.tool_error(id, name, Value::String(arguments), error);
            }
        };

        self.emit(StreamEvent::ToolCall {
            tool_call_id: id.clone(),
            tool_name: name.clone(),
            input: input.clone(),
        });

        let Some(tool) = self.options.tools.get(&name) else {
            let error = format!("unknown tool '{name}'");
            return self.tool_error(id, name, input, error);
        };

        match tool.execute(input.clone()) {
            Ok(output) => {
                debug!(tool = %name, tool_call_id = %id, "Tool call completed");
                self.emit(StreamEvent::ToolResult {
                    tool_call_id: id.clone(),
                    tool_name: name.clone(),
                    input,
                    output: output.clone(),
                });
                ExecutedCall {
                    id,
                    name,
                    arguments,
                    reply: output,
                }
            }
            Err(e) => self.tool_error(id, name, input, e.to_string()),
        }
    }

    fn tool_error(&self, id: String, name: String, input: Value, error: String) -> ExecutedCall {
        warn!(tool = %name, tool_call_id = %id, %error, "Tool call failed");
        self.emit(StreamEvent::ToolError {
            tool_call_id: id.clone(),
            tool_name: name.clone(),
            input: input.clone(),
            error: error.clone(),
        });
        ExecutedCall {
            id,
            name,
            arguments: match input {
                Value::String(raw) => raw,
                other => other.to_string(),
            },
            reply: serde_json::json!({ "error": error }),
        }
    }

    fn emit(&self, event: StreamEvent) {
        // A dropped receiver only means nobody is watching the events.
        if self.events.send(event).is_err() {
            trace!("Event receiver dropped");
        }
    }
}

/// A tool call whose arguments have fully arrived.
#[derive(Debug, Clone, PartialEq)]
struct PendingCall {
    id: String,
    name: String,
    arguments: String,
}

/// Reassembles tool calls from streamed fragments, keyed by index.
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    calls: BTreeMap<u32, PendingCall>,
}

impl ToolCallAccumulator {
    /// Fold in one fragment and return the events it produces.
    fn push(&mut self, fragment: &StreamToolCall) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let function = fragment.function.as_ref();

        let call = self.calls.entry(fragment.index).or_insert_with(|| {
            let call = PendingCall {
                id: fragment
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("call_{}", fragment.index)),
                name: function
                    .and_then(|f| f.name.clone())
                    .unwrap_or_default(),
                arguments: String::new(),
            };
            events.push(StreamEvent::ToolInputStart {
                id: call.id.clone(),
                tool_name: call.name.clone(),
            });
            call
        });

        if call.name.is_empty() {
            if let Some(name) = function.and_then(|f| f.name.as_deref()) {
                call.name = name.to_string();
            }
        }

        if let Some(delta) = function.and_then(|f| f.arguments.as_deref()) {
            if !delta.is_empty() {
                call.arguments.push_str(delta);
                events.push(StreamEvent::ToolInputDelta {
                    id: call.id.clone(),
                    delta: delta.to_string(),
                });
            }
        }

        events
    }

    /// Completed calls in index order.
    fn finish(self) -> Vec<PendingCall> {
        self.calls.into_values().collect()
    }
}
