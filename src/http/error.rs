//! Handler error taxonomy and its mapping to HTTP responses.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Everything that can stop a mediation request short of the canned payload.
#[derive(Debug, Error)]
pub enum MediationError {
    /// The body could not be read, or exceeded the size cap.
    #[error("failed to read request body: {0}")]
    Body(#[from] BytesRejection),

    /// The body was not a valid `AdRequest` document.
    #[error("malformed request body: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("missing request URL")]
    MissingUrl,

    /// The canned response failed to serialize.
    #[error("failed to encode mediation response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl MediationError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            MediationError::Body(rejection) => rejection.status(),
            MediationError::MalformedJson(_) | MediationError::MissingUrl => {
                StatusCode::BAD_REQUEST
            }
            MediationError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MediationError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Mediation failed");
            (status, "internal server error").into_response()
        } else {
            tracing::warn!(error = %self, status = %status, "Rejected mediation request");
            (status, self.to_string()).into_response()
        }
    }
}
