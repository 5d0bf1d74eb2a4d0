//! Language model providers.
//!
//! Two ways to reach the same model: directly through the OpenAI-compatible
//! proxy, or through the unified AI gateway. Both produce the same chunk
//! stream, so everything above [`LanguageModel`] is provider agnostic.

use crate::client::Client;
use crate::error::Result;
use crate::request::ChatRequest;
use crate::streaming::ChatStream;
use crate::telemetry::{TelemetryEnvelope, TELEMETRY_FIELD};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Base URL of the OpenAI-compatible proxy.
pub const DIRECT_BASE_URL: &str = "https://oai.helicone.ai/v1";

/// Base URL of the unified AI gateway.
pub const GATEWAY_BASE_URL: &str = "https://ai-gateway.helicone.ai/v1";

/// Header carrying the gateway key on direct requests.
pub const GATEWAY_AUTH_HEADER: &str = "Helicone-Auth";

/// Provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    /// OpenAI-compatible proxy; the gateway key travels in a header.
    Openai,
    /// Unified AI gateway; telemetry travels in the request body.
    #[default]
    Gateway,
}

impl ProviderKind {
    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Gateway => "gateway",
        }
    }

    /// Default base URL for this provider.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Openai => DIRECT_BASE_URL,
            Self::Gateway => GATEWAY_BASE_URL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "direct" => Ok(Self::Openai),
            "gateway" => Ok(Self::Gateway),
            other => Err(format!(
                "unknown provider '{other}' (expected 'openai' or 'gateway')"
            )),
        }
    }
}

/// A model that can stream a chat completion.
#[async_trait]
pub trait LanguageModel: Send + Sync + fmt::Debug {
    /// Model identifier sent on the wire.
    fn model_id(&self) -> &str;

    /// Which provider this model talks to.
    fn provider(&self) -> ProviderKind;

    /// Start streaming a completion. `request.model` is overwritten with
    /// [`LanguageModel::model_id`].
    async fn stream(&self, request: ChatRequest, max_retries: Option<u32>) -> Result<ChatStream>;
}

/// Model reached through the OpenAI-compatible proxy.
///
/// The client is expected to carry the `Helicone-Auth` header and, when
/// available, the upstream key as its bearer token.
#[derive(Debug, Clone)]
pub struct DirectModel {
    client: Client,
    model_id: String,
}

impl DirectModel {
    /// Create a direct model.
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for DirectModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Openai
    }

    async fn stream(&self, mut request: ChatRequest, max_retries: Option<u32>) -> Result<ChatStream> {
        request.model.clone_from(&self.model_id);
        debug!(provider = "openai", model = %self.model_id, "Opening stream");
        self.client.chat_completion_stream(&request, max_retries).await
    }
}

/// Model reached through the unified gateway.
///
/// Every request carries the telemetry envelope under [`TELEMETRY_FIELD`].
#[derive(Debug, Clone)]
pub struct GatewayModel {
    client: Client,
    model_id: String,
    telemetry: Option<TelemetryEnvelope>,
}

impl GatewayModel {
    /// Create a gateway model.
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            telemetry: None,
        }
    }

    /// Attach a telemetry envelope to every request.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: TelemetryEnvelope) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// The attached telemetry envelope, if any.
    pub fn telemetry(&self) -> Option<&TelemetryEnvelope> {
        self.telemetry.as_ref()
    }
}

#[async_trait]
impl LanguageModel for GatewayModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Gateway
    }

    async fn stream(&self, mut request: ChatRequest, max_retries: Option<u32>) -> Result<ChatStream> {
        request.model.clone_from(&self.model_id);
        if let Some(telemetry) = &self.telemetry {
            request
                .extensions
                .insert(TELEMETRY_FIELD.to_string(), telemetry.to_body_value());
        }
        debug!(
            provider = "gateway",
            model = %self.model_id,
            session_id = self.telemetry.as_ref().map(|t| t.session_id.as_str()),
            "Opening stream"
        );
        self.client.chat_completion_stream(&request, max_retries).await
    }
}
