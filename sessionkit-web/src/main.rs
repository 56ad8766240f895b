//! SessionKit web server binary

use anyhow::Context;
use clap::Parser;
use sessionkit_core::{init_logging, LogFormat, LoggingConfig};
use sessionkit_web::{SessionKitServerBuilder, WebConfig};
use std::path::PathBuf;
use tracing::info;

/// SessionKit web server - session credential issuing and renewal
#[derive(Parser)]
#[command(name = "sessionkit-web")]
#[command(about = "Session-token lifecycle server")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to ./sessionkit.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Database URL for user storage (in-memory when omitted)
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load .env before the configuration reads the environment
    dotenvy::dotenv().ok();

    let logging = LoggingConfig {
        level: args.log_level.clone(),
        format: if args.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Compact
        },
        ..LoggingConfig::default()
    };
    init_logging(&logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config =
        WebConfig::load_from(args.config.as_deref()).context("Failed to load configuration")?;

    let mut builder = SessionKitServerBuilder::from_config(config).dev_mode(args.dev);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    if let Some(database_url) = args.database_url {
        builder = builder.database_url(database_url);
    }

    let server = builder.build().await.context("Failed to build server")?;
    info!("Server built successfully");

    server.start().await.context("Server failed")?;
    Ok(())
}
