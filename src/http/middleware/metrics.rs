//! Per-request metrics recording.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::http::request::request_id;
use crate::observability::metrics;

/// Record status and latency for every request that reaches the router.
pub async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let id = request_id(&request).to_string();

    let response = next.run(request).await;
    let status = response.status().as_u16();

    tracing::debug!(
        request_id = %id,
        method = %method,
        status,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request finished"
    );
    metrics::record_request(&method, status, start_time);

    response
}
