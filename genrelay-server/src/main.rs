use anyhow::{Context, Result};
use clap::Parser;
use genrelay_core::config::{self, RelayConfig};
use genrelay_core::{GeminiBackend, Relay};
use genrelay_server::{build_router, init_logging};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Chat relay in front of the Gemini API
#[derive(Parser, Debug)]
#[command(name = "genrelay", version, about, long_about = None)]
struct Args {
    /// YAML or JSON configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind, overrides the configuration
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    let config = resolve_config(&args)?;

    let backend = GeminiBackend::new(config.backend.clone())
        .context("Failed to create Gemini backend")?;
    let relay = Relay::new(Arc::new(backend), config.defaults.clone());
    let app = build_router(relay, &config.server.route);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(
        address = %address,
        route = %config.server.route,
        model = %config.backend.model,
        "genrelay {} listening",
        genrelay_core::version()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Load the configuration file (if any) and apply command-line overrides
fn resolve_config(args: &Args) -> Result<RelayConfig> {
    let mut config = match &args.config {
        Some(path) => config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => RelayConfig::default(),
    };

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
