//! HTTP client for the Gateway SDK.

use crate::config::{with_trailing_slash, ClientConfig};
use crate::error::{should_retry_status, ApiErrorResponse, Error, Result};
use crate::request::ChatRequest;
use crate::streaming::ChatStream;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER,
    USER_AGENT,
};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use gateway_sdk::{ChatMessage, ChatRequest, Client};
/// use futures::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), gateway_sdk::Error> {
///     let client = Client::builder()
///         .base_url("https://oai.helicone.ai/v1")
///         .api_key("your-api-key")
///         .build()?;
///
///     let request = ChatRequest::new("gpt-4o-mini", vec![ChatMessage::user("Hello!")]);
///     let mut stream = client.chat_completion_stream(&request, None).await?;
///     while let Some(chunk) = stream.next().await {
///         print!("{}", chunk?.content());
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    /// HTTP client.
    http: reqwest::Client,
    /// Client configuration.
    config: Arc<ClientConfig>,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::configuration(format!("Invalid user agent: {}", e)))?,
        );

        // Add API key header if present
        if let Some(api_key) = config.api_key_value() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| Error::configuration(format!("Invalid API key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        // Add custom headers
        for (name, value) in &config.custom_headers {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|e| Error::configuration(format!("Invalid header name '{}': {}", name, e)))?;
            let mut header_value = HeaderValue::from_str(value.expose_secret())
                .map_err(|e| Error::configuration(format!("Invalid header value for '{}': {}", name, e)))?;
            header_value.set_sensitive(true);
            headers.insert(header_name, header_value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a streaming chat completion request.
    ///
    /// The initial request is retried on transient failures up to
    /// `max_retries` times (the configured default when `None`). Once the
    /// server starts streaming, failures are reported through the stream and
    /// never retried.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn chat_completion_stream(
        &self,
        request: &ChatRequest,
        max_retries: Option<u32>,
    ) -> Result<ChatStream> {
        let url = self.url("chat/completions")?;
        let request = request.clone().into_streaming();
        let max_retries = max_retries.unwrap_or(self.config.max_retries);

        debug!("Sending streaming chat completion request to {}", url);

        let response = self
            .execute_with_retry(max_retries, || async {
                self.http.post(url.clone()).json(&request).send().await
            })
            .await?;

        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }

        Ok(ChatStream::new(response.bytes_stream()))
    }

    /// Build a URL for the given path relative to the base URL.
    fn url(&self, path: &str) -> Result<Url> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| Error::configuration(format!("Invalid URL path '{}': {}", path, e)))
    }

    /// Execute a request with retry logic.
    async fn execute_with_retry<F, Fut>(&self, max_retries: u32, f: F) -> Result<reqwest::Response>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_initial_delay;

        loop {
            attempts += 1;

            match f().await {
                Ok(response) => {
                    // Check if we should retry based on status code
                    let status = response.status().as_u16();
                    if should_retry_status(status) && attempts <= max_retries {
                        let wait = retry_wait(response.headers(), delay, self.config.retry_max_delay);
                        debug!(
                            "Received status {} on attempt {}, retrying after {:?}",
                            status, attempts, wait
                        );

                        tokio::time::sleep(wait).await;
                        delay = std::cmp::min(delay * 2, self.config.retry_max_delay);
                        continue;
                    }
                    if attempts > 1 && should_retry_status(status) {
                        warn!(attempts, status, "Retries exhausted");
                    }
                    return Ok(response);
                }
                Err(e) => {
                    let error = self.map_reqwest_error(e);

                    if error.is_retryable() && attempts <= max_retries {
                        debug!(
                            "Request failed on attempt {}: {}, retrying after {:?}",
                            attempts, error, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay = std::cmp::min(delay * 2, self.config.retry_max_delay);
                        continue;
                    }

                    if attempts > 1 {
                        return Err(Error::retry_exhausted(attempts, error));
                    }
                    return Err(error);
                }
            }
        }
    }

    /// Handle an error response.
    async fn handle_error_response(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let headers = response.headers();
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let retry_after_secs = retry_after(headers).map(|d| d.as_secs());

        let body = response.text().await.unwrap_or_default();
        let api_error = serde_json::from_str::<ApiErrorResponse>(&body).ok();
        let message = api_error
            .as_ref()
            .map(|e| e.error.message.clone())
            .unwrap_or_else(|| body.clone());

        match status {
            401 | 403 => Error::Authentication { message },
            429 => Error::RateLimited {
                retry_after: retry_after_secs,
                request_id,
            },
            503 if api_error.is_none() => Error::Unavailable { message },
            _ => match api_error {
                Some(api_error) => Error::Api {
                    status,
                    message: api_error.error.message,
                    error_type: api_error.error.error_type.or(api_error.error.code),
                    request_id,
                },
                None => Error::Api {
                    status,
                    message: if body.is_empty() {
                        format!("HTTP {}", status)
                    } else {
                        body
                    },
                    error_type: None,
                    request_id,
                },
            },
        }
    }

    /// Map a reqwest error to an SDK error.
    fn map_reqwest_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout {
                duration_ms: self.config.timeout.as_millis() as u64,
            }
        } else if error.is_connect() {
            Error::Connection {
                message: error.to_string(),
            }
        } else {
            Error::Http(error)
        }
    }
}

/// Parse a `Retry-After` header given in seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Delay before the next attempt: the server's `Retry-After` if given,
/// else the backoff delay. Never longer than `max`.
fn retry_wait(headers: &HeaderMap, delay: Duration, max: Duration) -> Duration {
    retry_after(headers).unwrap_or(delay).min(max)
}

/// Builder for creating a Client.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<Secret<String>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_initial_delay: Option<Duration>,
    retry_max_delay: Option<Duration>,
    user_agent: Option<String>,
    custom_headers: Vec<(String, Secret<String>)>,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: None,
            connect_timeout: None,
            max_retries: None,
            retry_initial_delay: None,
            retry_max_delay: None,
            user_agent: None,
            custom_headers: Vec::new(),
        }
    }

    /// Set the base URL, including any version prefix such as `/v1`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key sent as `Authorization: Bearer <key>`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(key.into()));
        self
    }

    /// Set the API key from an already-secret value.
    pub fn api_key_secret(mut self, key: Secret<String>) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum number of retries.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the initial retry delay.
    pub fn retry_initial_delay(mut self, delay: Duration) -> Self {
        self.retry_initial_delay = Some(delay);
        self
    }

    /// Set the maximum retry delay.
    pub fn retry_max_delay(mut self, delay: Duration) -> Self {
        self.retry_max_delay = Some(delay);
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a custom header. The value is treated as sensitive.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), Secret::new(value.into())));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let base_url = match self.base_url {
            Some(url) => Url::parse(&url)
                .map_err(|e| Error::configuration(format!("Invalid base URL '{}': {}", url, e)))?,
            None => ClientConfig::default().base_url,
        };

        let config = ClientConfig {
            base_url: with_trailing_slash(base_url),
            api_key: self.api_key,
            timeout: self.timeout.unwrap_or(ClientConfig::DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(ClientConfig::DEFAULT_CONNECT_TIMEOUT),
            max_retries: self.max_retries.unwrap_or(ClientConfig::DEFAULT_MAX_RETRIES),
            retry_initial_delay: self.retry_initial_delay.unwrap_or(ClientConfig::DEFAULT_RETRY_INITIAL_DELAY),
            retry_max_delay: self.retry_max_delay.unwrap_or(ClientConfig::DEFAULT_RETRY_MAX_DELAY),
            user_agent: self.user_agent.unwrap_or_else(|| ClientConfig::DEFAULT_USER_AGENT.to_string()),
            custom_headers: self.custom_headers,
        };

        Client::new(config)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .field("has_api_key", &self.config.has_api_key())
            .finish()
    }
}
