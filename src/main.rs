//! PEV backend server binary.
//!
//! Bootstraps the admission pipeline: load and validate configuration,
//! initialize logging and metrics, then hand control to the startup
//! sequencer, which refuses to open the listener until the session
//! store confirms connectivity. Any startup failure exits non-zero.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use pev_backend::auth::SessionPrincipal;
use pev_backend::config::{load_config, ServerConfig};
use pev_backend::lifecycle::{signals, startup, Shutdown};
use pev_backend::observability::{logging, metrics};
use pev_backend::session::MemoryStore;

#[derive(Parser)]
#[command(
    name = "pev-backend",
    about = "HTTP request admission and session bootstrap server"
)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("configuration error: {e}");
                std::process::exit(1);
            }
        },
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_origins = config.origins.allowed.len(),
        session_ttl_secs = config.session.ttl_secs,
        tls = config.tls_enabled(),
        "pev-backend starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(MemoryStore::new(Duration::from_secs(config.session.ttl_secs)));
    let identity = Arc::new(SessionPrincipal::default());

    let shutdown = Shutdown::new();
    signals::spawn_handler(shutdown.clone());

    if let Err(e) = startup::run(config, store, identity, shutdown).await {
        tracing::error!(error = %e, "startup failed");
        std::process::exit(1);
    }

    tracing::info!("shutdown complete");
}
