//! Connection lifecycle: tracking and per-connection serving.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Count open connections so shutdown can wait for them to drain
//! - Serve one HTTP/1.1 connection with header-read and lifetime deadlines

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tokio::sync::{watch, Notify};

use crate::observability::metrics;

/// Only uniqueness matters, so increments are relaxed.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct TrackerInner {
    active: AtomicU64,
    drained: Notify,
}

/// Tracks open connections for graceful shutdown.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    inner: Arc<TrackerInner>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new open connection. The returned guard closes it on drop.
    pub fn track(&self) -> ConnectionGuard {
        let count = self.inner.active.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_active_connections(count);
        ConnectionGuard {
            inner: Arc::clone(&self.inner),
            id: ConnectionId::new(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Wait until every tracked connection has closed.
    pub async fn wait_for_drain(&self) {
        loop {
            let drained = self.inner.drained.notified();
            if self.active_count() == 0 {
                return;
            }
            drained.await;
        }
    }
}

/// Guard for one connection's lifetime.
#[derive(Debug)]
pub struct ConnectionGuard {
    inner: Arc<TrackerInner>,
    id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let remaining = self.inner.active.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_active_connections(remaining);
        if remaining == 0 {
            self.inner.drained.notify_waiters();
        }
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}

/// Resolve once `stop` is true or its sender is gone.
async fn stopped(stop: &mut watch::Receiver<bool>) {
    loop {
        if *stop.borrow_and_update() {
            return;
        }
        if stop.changed().await.is_err() {
            return;
        }
    }
}

/// Deadlines applied to every connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Time a client has to finish sending request headers.
    pub header_read_timeout: Duration,
    /// Hard cap on how long a connection may stay open.
    pub max_lifetime: Duration,
}

/// Serve HTTP/1.1 on one accepted stream until the client leaves, a deadline
/// passes, or `stop` flips to true.
///
/// On stop, in-flight requests finish and keep-alive is disabled. Errors are
/// logged; nothing is returned to the caller.
pub async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    router: Router,
    settings: ConnectionSettings,
    mut stop: watch::Receiver<bool>,
    guard: ConnectionGuard,
) {
    let connection_id = guard.id();
    let io = TokioIo::new(stream);
    let service = TowerToHyperService::new(router);

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(settings.header_read_timeout)
        .keep_alive(true);

    let conn = builder.serve_connection(io, service);
    tokio::pin!(conn);

    let serve = async {
        let finished = tokio::select! {
            result = conn.as_mut() => Some(result),
            _ = stopped(&mut stop) => None,
        };
        match finished {
            Some(result) => result,
            None => {
                tracing::debug!(connection_id = %connection_id, "Draining connection");
                conn.as_mut().graceful_shutdown();
                conn.as_mut().await
            }
        }
    };

    match tokio::time::timeout(settings.max_lifetime, serve).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::debug!(
                connection_id = %connection_id,
                peer_addr = %peer_addr,
                error = %e,
                "Connection error"
            );
        }
        Err(_) => {
            tracing::warn!(
                connection_id = %connection_id,
                peer_addr = %peer_addr,
                max_lifetime_secs = settings.max_lifetime.as_secs(),
                "Connection exceeded its lifetime, closing"
            );
        }
    }

    drop(guard);
}
