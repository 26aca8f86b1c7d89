//! Error types for the oracle service.
//!
//! [`OracleError`] unifies all failure modes into a single enum that can
//! be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Message returned to clients that exceed the rate limit.
pub const COOLDOWN_MESSAGE: &str = "Cosmic cooldown: your oracle is overheating.";

/// Errors that can occur in the oracle API layer.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The client exceeded its request budget for the current window.
    #[error("Cosmic cooldown: your oracle is overheating.")]
    RateLimited,

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for OracleError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, COOLDOWN_MESSAGE.to_owned()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[tokio::test]
    async fn rate_limited_maps_to_cooldown_body() {
        let response = OracleError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], COOLDOWN_MESSAGE);
        assert_eq!(json["status"], 429);
    }

    #[test]
    fn serialization_failure_is_a_server_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let response = OracleError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
