//! Tools the model may ask the caller to execute.

use gateway_core::ToolDefinition;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Failure while executing a tool call.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The arguments produced by the model did not match the tool's input type.
    #[error("invalid tool input: {0}")]
    InvalidInput(#[source] serde_json::Error),

    /// The tool output could not be encoded as JSON.
    #[error("invalid tool output: {0}")]
    InvalidOutput(#[source] serde_json::Error),

    /// The handler itself failed.
    #[error("{0}")]
    Execution(String),
}

type Handler = dyn Fn(Value) -> Result<Value, ToolError> + Send + Sync;

/// A declared function the model may call.
///
/// The handler runs synchronously inside the producer of the event stream,
/// once per tool call the model requests.
#[derive(Clone)]
pub struct Tool {
    description: String,
    input_schema: Value,
    handler: Arc<Handler>,
}

impl Tool {
    /// Create a tool from a JSON-in, JSON-out handler.
    pub fn new<F>(description: impl Into<String>, input_schema: Value, handler: F) -> Self
    where
        F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            input_schema,
            handler: Arc::new(handler),
        }
    }

    /// Create a tool whose handler takes and returns typed values.
    ///
    /// Input is deserialized from the model's arguments; output is
    /// serialized back to JSON for the tool-result event.
    pub fn typed<I, O, F>(description: impl Into<String>, input_schema: Value, handler: F) -> Self
    where
        I: DeserializeOwned,
        O: Serialize,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        Self::new(description, input_schema, move |input| {
            let input = serde_json::from_value(input).map_err(ToolError::InvalidInput)?;
            serde_json::to_value(handler(input)).map_err(ToolError::InvalidOutput)
        })
    }

    /// Tool description shown to the model.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// JSON Schema of the tool input.
    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Run the handler.
    pub fn execute(&self, input: Value) -> Result<Value, ToolError> {
        (self.handler)(input)
    }

    /// Wire definition under the given name.
    pub fn definition(&self, name: &str) -> ToolDefinition {
        ToolDefinition::function(
            name,
            Some(self.description.clone()),
            self.input_schema.clone(),
        )
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// Tools keyed by the name the model uses to call them.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: BTreeMap<String, Tool>,
}

impl ToolSet {
    /// Create an empty tool set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool under `name`, replacing any tool already registered there.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, tool: Tool) -> Self {
        self.tools.insert(name.into(), tool);
        self
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check whether no tools are declared.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Wire definitions for every tool, in name order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|(name, tool)| tool.definition(name))
            .collect()
    }
}
