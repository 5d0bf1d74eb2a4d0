//! Test helper utilities for integration tests

use crate::mock_providers::MockGateway;
use gateway_sdk::ProviderKind;
use gateway_stream_demos::RunConfig;
use once_cell::sync::Lazy;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Gateway key used by every test configuration.
pub const TEST_API_KEY: &str = "test-helicone-key";

/// Upstream key used by the direct provider in tests.
pub const TEST_OPENAI_API_KEY: &str = "test-openai-key";

/// Initialize tracing for tests (only once)
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
});

/// Initialize tracing for tests
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Strip ANSI colors so captured output can be compared as plain text.
pub fn disable_colors() {
    colored::control::set_override(false);
}

/// Configuration pointing `provider` at `mock`, with short retry delays.
pub fn run_config(provider: ProviderKind, mock: &MockGateway) -> RunConfig {
    RunConfig::new(provider)
        .with_api_key(TEST_API_KEY)
        .with_openai_api_key(TEST_OPENAI_API_KEY)
        .with_base_url(mock.url())
        .with_timeout(Duration::from_secs(10))
        .with_retry_initial_delay(Duration::from_millis(10))
}

/// Captured demo output as text.
pub fn output_string(out: Vec<u8>) -> String {
    String::from_utf8(out).expect("demo output is UTF-8")
}
