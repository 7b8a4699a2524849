//! Arbor daemon binary
//!
//! Serves the app-deployment mutation surface and the persisted-document
//! resolution endpoints.

use anyhow::Context;
use arbor_daemon::config::DaemonConfig;
use arbor_daemon::server::Server;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Arbor daemon CLI
#[derive(Parser)]
#[command(name = "arbord")]
#[command(about = "Arbor daemon - persisted-document registry and resolver", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ARBOR_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "ARBOR_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "ARBOR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "ARBOR_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DaemonConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .with_context(|| format!("invalid listen address: {listen}"))?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let server = Server::new(config)?;
    server.run().await?;

    Ok(())
}
