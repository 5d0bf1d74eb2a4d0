//! # Gateway Stream Demos
//!
//! Two small programs that stream a chat completion through an
//! OpenAI-compatible gateway:
//!
//! - `tool-calling` offers the model a `weather` tool and reports whether the
//!   model asked to call it.
//! - `stream-timing` streams a short answer from a reasoning model and reports
//!   how long the stream and the usage totals took.
//!
//! ## Usage
//!
//! ```bash
//! # Through the unified gateway (default)
//! HELICONE_API_KEY=... tool-calling
//!
//! # Directly through the OpenAI-compatible proxy
//! HELICONE_API_KEY=... OPENAI_API_KEY=... stream-timing openai
//! ```

pub mod config;
pub mod demo;
pub mod factory;
pub mod logging;
pub mod report;
pub mod run;
pub mod weather;

pub use config::RunConfig;
pub use demo::DemoOutcome;
pub use factory::create_model;
pub use run::{RunPhase, RunSummary};
