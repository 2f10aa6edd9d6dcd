//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeouts, body limits, metrics)
//! - Run the bounded accept loop and hand connections to `net::connection`
//! - Drain open connections on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::MediatorConfig;
use crate::http::handlers::{health, mediate, method_not_allowed};
use crate::http::middleware::track_metrics;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::mediation::MediationResponse;
use crate::net::{serve_connection, ConnectionSettings, ConnectionTracker, Listener, ListenerError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup and never mutated.
    pub canned: Arc<MediationResponse>,
}

impl AppState {
    pub fn from_config(config: &MediatorConfig) -> Self {
        Self {
            canned: Arc::new(MediationResponse::from(&config.response)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the mediation endpoint.
pub struct MediatorServer {
    router: Router,
    config: MediatorConfig,
}

impl MediatorServer {
    pub fn new(config: MediatorConfig) -> Self {
        let state = AppState::from_config(&config);
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Accept connections until `shutdown` fires, then drain.
    ///
    /// Connections still open after `timeouts.shutdown_grace_secs` are
    /// abandoned.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let settings = ConnectionSettings {
            header_read_timeout: Duration::from_secs(self.config.timeouts.header_read_secs),
            max_lifetime: Duration::from_secs(self.config.timeouts.connection_secs),
        };
        let tracker = ConnectionTracker::new();
        let (stop_tx, stop_rx) = watch::channel(false);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr, permit)) => {
                        let guard = tracker.track();
                        let router = self.router.clone();
                        let stop = stop_rx.clone();
                        tokio::spawn(async move {
                            serve_connection(stream, peer_addr, router, settings, stop, guard).await;
                            drop(permit);
                        });
                    }
                    Err(ListenerError::Accept(e)) => {
                        // Usually fd exhaustion; back off instead of spinning.
                        tracing::error!(error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                    Err(e) => return Err(e.into()),
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        drop(listener);
        let _ = stop_tx.send(true);

        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        if tokio::time::timeout(grace, tracker.wait_for_drain()).await.is_err() {
            tracing::warn!(
                open_connections = tracker.active_count(),
                "Grace period elapsed with connections still open"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router this server dispatches to.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &MediatorConfig, state: AppState) -> Router {
    Router::new()
        .route(
            "/mediate",
            post(mediate)
                // Only the POST route: other methods must reach the 405 fallback.
                .route_layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
                .fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(middleware::from_fn(track_metrics))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}
