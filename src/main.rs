//! API server entry point.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ metrics ─▶ recover ─▶ cors ─▶ rate_limit ─▶ authenticate ─▶ routes
//!                                                        │               │
//!                                                 ClientRegistry   TokenVerifier
//!                                                 (reaper task)    IdentityResolver
//!                                                                  (UserDirectory)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use request_pipeline::auth::InMemoryDirectory;
use request_pipeline::config::{self, AppConfig, CliOverrides, ConfigError};
use request_pipeline::lifecycle::{wait_for_signal, Shutdown};
use request_pipeline::observability::{logging, metrics};
use request_pipeline::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "request-pipeline", version, about = "HTTP API request pipeline server")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: CliOverrides,
}

fn load(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::loader::read_config(path)?,
        None => AppConfig::default(),
    };
    cli.overrides.apply(&mut config);
    config::validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "request-pipeline starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.environment,
        rate_limit_enabled = config.limiter.enabled,
        requests_per_second = config.limiter.requests_per_second,
        burst = config.limiter.burst,
        trusted_origins = ?config.cors.trusted_origins,
        users = config.users.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address was checked by validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let directory = Arc::new(InMemoryDirectory::from_seeds(config.users.clone()));
    let server = HttpServer::new(&config, directory);

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
