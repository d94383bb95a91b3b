//! Error types for the proxy.
//!
//! Every handler returns [`Result`]; the [`IntoResponse`] impl maps each
//! variant to its status code and a `{"error": ...}` JSON body. Upstream
//! internals are never forwarded to callers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the proxy layer.
#[derive(Error, Debug)]
pub enum LoungeError {
    /// Request input failed validation — rejected before any cache or
    /// upstream access.
    #[error("{0}")]
    InvalidInput(String),

    /// Upstream has no record for the requested resource.
    #[error("{0}")]
    NotFound(String),

    /// Upstream answered with an error status worth passing through.
    #[error("{message}")]
    UpstreamStatus { status: u16, message: String },

    /// Network-level failure (connect, timeout) or anything unexpected.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for LoungeError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            LoungeError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
            LoungeError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            LoungeError::UpstreamStatus { status, message } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message,
            ),
            LoungeError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Convenience Result alias used by handlers.
pub type Result<T> = std::result::Result<T, LoungeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_400() {
        let resp = LoungeError::InvalidInput("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = LoungeError::NotFound("missing".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_status_passes_through() {
        let resp = LoungeError::UpstreamStatus {
            status: 503,
            message: "unavailable".to_string(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn bogus_upstream_status_falls_back_to_500() {
        let resp = LoungeError::UpstreamStatus {
            status: 42,
            message: "weird".to_string(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_maps_to_500() {
        let resp = LoungeError::Internal("boom".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
