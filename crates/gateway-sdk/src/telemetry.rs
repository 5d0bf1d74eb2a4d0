//! Gateway telemetry envelope.
//!
//! The gateway accepts an extra `helicone` object in the request body and
//! attaches it to the logged request: a session id groups related requests,
//! properties are free-form key/value filters, and tags are labels. None of
//! it changes how the model answers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Body field the gateway reads telemetry from.
pub const TELEMETRY_FIELD: &str = "helicone";

/// Observability metadata forwarded to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEnvelope {
    /// Session identifier, unique per run.
    pub session_id: String,
    /// Free-form scalar properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_json::Value>,
    /// Labels.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl TelemetryEnvelope {
    /// Start a new session named `<prefix>-<uuid>`.
    pub fn new_session(prefix: &str) -> Self {
        Self {
            session_id: format!("{prefix}-{}", Uuid::new_v4()),
            properties: BTreeMap::new(),
            tags: BTreeSet::new(),
        }
    }

    /// Add a scalar property. Non-scalar values are ignored and logged.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if value.is_object() || value.is_array() {
            tracing::warn!(property = %key, "Ignoring non-scalar telemetry property");
        } else {
            self.properties.insert(key, value);
        }
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// JSON value placed under [`TELEMETRY_FIELD`].
    pub fn to_body_value(&self) -> serde_json::Value {
        serde_json::json!({
            "sessionId": self.session_id,
            "properties": self.properties,
            "tags": self.tags,
        })
    }
}
