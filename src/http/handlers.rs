//! Route handlers.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::error::MediationError;
use crate::http::server::AppState;
use crate::mediation::AdRequest;

/// `POST /mediate`: validate one [`AdRequest`] and answer with the canned result.
///
/// Each failure returns before the canned payload is touched, so a rejected
/// request never carries mediation output.
pub async fn mediate(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, MediationError> {
    let body = body?;

    let ad_request: AdRequest =
        serde_json::from_slice(&body).map_err(MediationError::MalformedJson)?;

    if !ad_request.has_url() {
        return Err(MediationError::MissingUrl);
    }

    tracing::debug!(
        adnet_id = ad_request.adnet_id,
        url = %ad_request.url,
        "Serving canned mediation response"
    );

    let encoded = serde_json::to_vec(state.canned.as_ref()).map_err(MediationError::Encode)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        encoded,
    )
        .into_response())
}

/// Any method other than POST on `/mediate`. Empty body.
pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST")])
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
