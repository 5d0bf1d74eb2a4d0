//! Builds the model handle for the selected provider.

use crate::config::RunConfig;
use gateway_sdk::{
    Client, ClientBuilder, DirectModel, GatewayModel, LanguageModel, ProviderKind,
    TelemetryEnvelope, GATEWAY_AUTH_HEADER,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("gateway-stream-demos/", env!("CARGO_PKG_VERSION"));

/// Create the model handle for `config.provider()`.
///
/// The direct variant authenticates to the proxy with `Helicone-Auth` and to
/// the upstream provider with `OPENAI_API_KEY`. The gateway variant uses the
/// gateway key as its bearer token and carries `telemetry` in every request
/// body. The direct variant does not send telemetry.
pub fn create_model(
    config: &RunConfig,
    model_id: &str,
    telemetry: TelemetryEnvelope,
) -> gateway_sdk::Result<Arc<dyn LanguageModel>> {
    let builder = base_builder(config);

    let model: Arc<dyn LanguageModel> = match config.provider() {
        ProviderKind::Openai => {
            let mut builder = builder;
            if let Some(key) = config.api_key() {
                builder = builder.header(
                    GATEWAY_AUTH_HEADER,
                    format!("Bearer {}", key.expose_secret()),
                );
            }
            if let Some(key) = config.openai_api_key() {
                builder = builder.api_key_secret(key.clone());
            }
            debug!(session_id = %telemetry.session_id, "Telemetry is not sent by the direct provider");
            Arc::new(DirectModel::new(builder.build()?, model_id))
        }
        ProviderKind::Gateway => {
            let mut builder = builder;
            if let Some(key) = config.api_key() {
                builder = builder.api_key_secret(key.clone());
            }
            Arc::new(GatewayModel::new(builder.build()?, model_id).with_telemetry(telemetry))
        }
    };

    info!(
        provider = %model.provider(),
        model = model.model_id(),
        base_url = config.base_url(),
        "Model client ready"
    );
    Ok(model)
}

fn base_builder(config: &RunConfig) -> ClientBuilder {
    Client::builder()
        .base_url(config.base_url())
        .timeout(config.timeout())
        .max_retries(config.max_retries())
        .retry_initial_delay(config.retry_initial_delay())
        .user_agent(USER_AGENT)
}
