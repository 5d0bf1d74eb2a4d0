//! Streaming-with-timing demo.
//!
//! Streams a short answer from a reasoning model, prints every event and
//! reports how long the stream and the usage totals took.

use anyhow::Result;
use clap::Parser;
use gateway_sdk::ProviderKind;
use gateway_stream_demos::{demo, logging, RunConfig};
use tracing::error;

/// Stream a timed request through the gateway or the direct proxy
#[derive(Parser, Debug)]
#[command(name = "stream-timing")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Provider to use: `openai` (direct proxy) or `gateway`
    #[arg(default_value = "gateway")]
    provider: ProviderKind,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_json);

    if let Err(e) = run(cli.provider).await {
        error!(error = %e, "Demo failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(provider: ProviderKind) -> Result<()> {
    let config = RunConfig::from_env(provider);
    let mut stdout = std::io::stdout();
    demo::stream_timing::run(&config, &mut stdout).await?;
    Ok(())
}
