//! Client configuration for the Gateway SDK.

use secrecy::{ExposeSecret, Secret};
use std::time::Duration;
use url::Url;

/// Configuration for the Gateway SDK client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the OpenAI-compatible API, always ending in `/`.
    pub(crate) base_url: Url,
    /// API key sent as a bearer token.
    pub(crate) api_key: Option<Secret<String>>,
    /// Request timeout duration.
    pub(crate) timeout: Duration,
    /// Connection timeout duration.
    pub(crate) connect_timeout: Duration,
    /// Maximum number of retry attempts.
    pub(crate) max_retries: u32,
    /// Initial retry delay.
    pub(crate) retry_initial_delay: Duration,
    /// Maximum retry delay.
    pub(crate) retry_max_delay: Duration,
    /// User agent string.
    pub(crate) user_agent: String,
    /// Custom headers to include in requests.
    pub(crate) custom_headers: Vec<(String, Secret<String>)>,
}

impl ClientConfig {
    /// Default base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1/";
    /// Default request timeout (120 seconds).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
    /// Default connection timeout (10 seconds).
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default maximum retries.
    pub const DEFAULT_MAX_RETRIES: u32 = 2;
    /// Default initial retry delay (1 second).
    pub const DEFAULT_RETRY_INITIAL_DELAY: Duration = Duration::from_secs(1);
    /// Default maximum retry delay (30 seconds).
    pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(30);
    /// Default user agent.
    pub const DEFAULT_USER_AGENT: &'static str = concat!(
        "gateway-sdk-rust/",
        env!("CARGO_PKG_VERSION")
    );

    /// Create a new configuration with default values.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            api_key: None,
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            retry_initial_delay: Self::DEFAULT_RETRY_INITIAL_DELAY,
            retry_max_delay: Self::DEFAULT_RETRY_MAX_DELAY,
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
            custom_headers: Vec::new(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get the API key (exposed for use in requests).
    pub(crate) fn api_key_value(&self) -> Option<&str> {
        self.api_key.as_ref().map(|s| s.expose_secret().as_str())
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the connection timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Get the maximum number of retries.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the initial retry delay.
    pub fn retry_initial_delay(&self) -> Duration {
        self.retry_initial_delay
    }

    /// Get the user agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Names of the custom headers. Values stay secret.
    pub fn custom_header_names(&self) -> impl Iterator<Item = &str> {
        self.custom_headers.iter().map(|(name, _)| name.as_str())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        #[allow(clippy::expect_used)]
        Self::new(Url::parse(Self::DEFAULT_BASE_URL).expect("valid default URL"))
    }
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url.as_str(), "https://api.openai.com/v1/");
        assert!(!config.has_api_key());
        assert_eq!(config.timeout(), ClientConfig::DEFAULT_TIMEOUT);
        assert_eq!(config.max_retries(), ClientConfig::DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_config_adds_trailing_slash() {
        let url = Url::parse("https://oai.helicone.ai/v1").unwrap();
        let config = ClientConfig::new(url);
        assert_eq!(config.base_url().as_str(), "https://oai.helicone.ai/v1/");
        assert_eq!(
            config.base_url().join("chat/completions").unwrap().as_str(),
            "https://oai.helicone.ai/v1/chat/completions"
        );
    }
}
