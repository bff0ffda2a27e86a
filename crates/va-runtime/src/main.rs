//! # Voice-Assistant Runtime
//!
//! Entry point for the assistant backend.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line
//! 2. Install the tracing subscriber
//! 3. Load configuration (file, then environment)
//! 4. Validate it; an expected application identifier is mandatory
//! 5. Load trust anchors and build the gateway
//! 6. Serve until Ctrl+C, then drain in-flight requests

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use va_02_assistant_gateway::AssistantGatewayService;

/// Voice-assistant skill backend
#[derive(Parser, Debug)]
#[command(name = "va-runtime")]
#[command(version, about = "Voice-assistant skill backend with signed request verification")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    if json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install JSON subscriber: {e}"))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {e}"))
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json)?;

    let config = config::load_config(args.config.as_deref())?;
    config.validate().context("Invalid configuration")?;

    info!(
        addr = %config.http_addr(),
        trust_mode = ?config.verification.trust_mode,
        tolerance_secs = config.verification.timestamp_tolerance.as_secs(),
        "Starting voice-assistant runtime v{}",
        env!("CARGO_PKG_VERSION")
    );

    let service =
        AssistantGatewayService::from_config(config).context("Failed to build assistant gateway")?;
    service
        .serve(shutdown_signal())
        .await
        .context("Assistant gateway failed")?;

    info!("Shutdown complete");
    Ok(())
}
