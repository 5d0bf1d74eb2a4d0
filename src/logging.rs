//! Tracing setup for the demo binaries.
//!
//! Logs go to stderr so they never interleave with the event lines the demos
//! print on stdout.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for a verbosity count (`-v`, `-vv`, `-vvv`).
pub fn filter_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the filter: `RUST_LOG` wins when set, otherwise the verbosity count.
pub fn env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for_verbosity(verbose)))
}

/// Initialize tracing/logging based on verbosity and format.
pub fn init_tracing(verbose: u8, json: bool) {
    let subscriber = tracing_subscriber::registry().with(env_filter(verbose));

    let result = if json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbose > 1),
            )
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
