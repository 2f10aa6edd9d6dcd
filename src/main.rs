//! Ad mediation endpoint.
//!
//! Accepts a single ad request on `POST /mediate` and answers with a canned
//! mediation result.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ net::listener ──▶ net::connection ──▶ http::server (middleware)
//!                (bounded accept)   (deadlines, drain)       │
//!                                                            ▼
//!     Client ◀──────────────── http::error ◀──────── http::handlers::mediate
//!                                                    (decode, validate url,
//!                                                     canned MediationResponse)
//! ```

use std::path::PathBuf;

use ad_mediator::lifecycle::{signals::shutdown_signal, startup, Shutdown};
use ad_mediator::net::Listener;
use ad_mediator::observability::metrics;
use ad_mediator::MediatorServer;
use clap::Parser;

#[derive(Parser)]
#[command(name = "ad-mediator")]
#[command(about = "Canned-response ad mediation endpoint", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address` (e.g. 127.0.0.1:8080).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = startup::init(cli.config.as_deref(), cli.bind.as_deref())?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ad-mediator starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        max_body_bytes = config.limits.max_body_bytes,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses when metrics are enabled.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = match Listener::bind(&config.listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Server exited with error");
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let server = MediatorServer::new(config);
    let server_shutdown = shutdown.subscribe();
    let mut server_task = tokio::spawn(server.run(listener, server_shutdown));

    let finished_early = tokio::select! {
        result = &mut server_task => Some(result),
        _ = shutdown_signal() => None,
    };
    match finished_early {
        Some(result) => result??,
        None => {
            shutdown.trigger();
            server_task.await??;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
