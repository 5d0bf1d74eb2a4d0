//! Run configuration loaded from the environment.
//!
//! A missing gateway key is not an error here. The remote service rejects
//! the request and that failure surfaces through the normal error path.

use gateway_sdk::ProviderKind;
use secrecy::Secret;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

/// Gateway key, sent as `Helicone-Auth` (direct) or bearer token (gateway).
pub const API_KEY_VAR: &str = "HELICONE_API_KEY";

/// Upstream key used as the bearer token of the direct provider.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Override for the gateway base URL.
pub const GATEWAY_URL_VAR: &str = "HELICONE_GATEWAY_URL";

/// Override for the direct proxy base URL.
pub const PROXY_URL_VAR: &str = "HELICONE_PROXY_URL";

/// Retry budget used by both demos.
pub const DEMO_MAX_RETRIES: u32 = 5;

/// Request timeout used by both demos.
pub const DEMO_TIMEOUT: Duration = Duration::from_secs(120);

/// Immutable settings for one demo run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    provider: ProviderKind,
    api_key: Option<Secret<String>>,
    openai_api_key: Option<Secret<String>>,
    gateway_url: Option<String>,
    proxy_url: Option<String>,
    max_retries: u32,
    timeout: Duration,
    retry_initial_delay: Duration,
}

impl RunConfig {
    /// Create a configuration with no credentials and default endpoints.
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            api_key: None,
            openai_api_key: None,
            gateway_url: None,
            proxy_url: None,
            max_retries: DEMO_MAX_RETRIES,
            timeout: DEMO_TIMEOUT,
            retry_initial_delay: Duration::from_secs(1),
        }
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env(provider: ProviderKind) -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "Failed to read .env file"),
        }

        Self::from_lookup(provider, |name| env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(provider: ProviderKind, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = var(API_KEY_VAR).map(Secret::new);
        if api_key.is_none() {
            warn!(
                "{} is not set; the {} provider will reject the request",
                API_KEY_VAR, provider
            );
        }

        Self {
            api_key,
            openai_api_key: var(OPENAI_API_KEY_VAR).map(Secret::new),
            gateway_url: var(GATEWAY_URL_VAR),
            proxy_url: var(PROXY_URL_VAR),
            ..Self::new(provider)
        }
    }

    /// Set the gateway key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(key.into()));
        self
    }

    /// Set the upstream key for the direct provider.
    #[must_use]
    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(Secret::new(key.into()));
        self
    }

    /// Point the selected provider at a different base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = Some(url.into());
        match self.provider {
            ProviderKind::Openai => self.proxy_url = url,
            ProviderKind::Gateway => self.gateway_url = url,
        }
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the first retry backoff.
    #[must_use]
    pub fn with_retry_initial_delay(mut self, delay: Duration) -> Self {
        self.retry_initial_delay = delay;
        self
    }

    /// Selected provider.
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Gateway key, if configured.
    pub fn api_key(&self) -> Option<&Secret<String>> {
        self.api_key.as_ref()
    }

    /// Upstream key, if configured.
    pub fn openai_api_key(&self) -> Option<&Secret<String>> {
        self.openai_api_key.as_ref()
    }

    /// Base URL for the selected provider, override first.
    pub fn base_url(&self) -> &str {
        let url = match self.provider {
            ProviderKind::Openai => self.proxy_url.as_deref(),
            ProviderKind::Gateway => self.gateway_url.as_deref(),
        };
        url.unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Retry budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// First retry backoff.
    pub fn retry_initial_delay(&self) -> Duration {
        self.retry_initial_delay
    }
}
