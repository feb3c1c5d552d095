//! Chefito backend server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ request id / trace / timeout
//!                 │
//!                 ├── /health
//!                 ├── /api/recipes*  ──▶ admission guard "recipes" ──▶ catalog + entitlements
//!                 └── /api/speech    ──▶ admission guard "speech"  ──▶ speech synthesizer
//!
//!   Background: admission sweeper, metrics exporter, admin API (optional)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use chefito::config::{load_config, ChefitoConfig};
use chefito::observability::{logging, metrics};
use chefito::{lifecycle, HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "chefito")]
#[command(about = "Chefito recipe backend")]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ChefitoConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), config = ?args.config, "chefito starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        recipes_limit = config.admission.routes.recipes.limit,
        recipes_window_ms = config.admission.routes.recipes.window_ms,
        speech_limit = config.admission.routes.speech.limit,
        speech_window_ms = config.admission.routes.speech.window_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Validates the config, including the defaults used without `--config`.
    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        lifecycle::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
