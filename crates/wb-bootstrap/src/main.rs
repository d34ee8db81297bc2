//! Workbench proxy bootstrap
//!
//! Registers this VM on its regional inverting proxy, restarts the proxy
//! agent container with the new backend id and publishes the routing
//! hostname on the instance metadata. Run once on boot; re-run to retry.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wb_bootstrap::{adapters, Bootstrap};
use wb_core::config;
use wb_core::traits::TracingReporter;

#[derive(Parser)]
#[command(name = "register-on-proxy")]
#[command(about = "Register a Workbench VM on the inverting proxy and start the proxy agent")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Verbose output (forces debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Metadata server base URL (overrides the config file)
    #[arg(long, env = "WB_METADATA_URL")]
    metadata_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config =
        config::resolve_config(args.config.as_deref(), &config::default_config_path())
            .context("Failed to load config")?;
    if let Some(url) = args.metadata_url {
        config.metadata_url = url;
    }

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let reporter = Arc::new(TracingReporter);
    let collaborators = adapters::production(&config, client.clone(), reporter);

    let outcome = Bootstrap::new(&config, client, collaborators)
        .run()
        .await
        .context("Proxy bootstrap failed")?;

    tracing::info!(
        "VM '{}' reachable through '{}' (agent container '{}')",
        outcome.identity.instance_name,
        outcome.registration.hostname,
        outcome.agent
    );
    Ok(())
}
