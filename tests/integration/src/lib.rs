//! Integration tests for the gateway stream demos
//!
//! Every test runs against a wiremock server speaking the OpenAI streaming
//! protocol. Coverage:
//! - Provider wiring (headers, telemetry body field)
//! - Stream semantics (single pass, retries, failures)
//! - Both demos end to end

pub mod fixtures;
pub mod helpers;
pub mod mock_providers;

// Re-export commonly used items
pub use fixtures::*;
pub use helpers::*;
pub use mock_providers::*;

#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod provider_tests;
#[cfg(test)]
mod stream_tests;
