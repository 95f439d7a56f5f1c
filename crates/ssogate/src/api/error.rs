//! Structured error responses.

use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Build a JSON error response and log it at the level its status class
/// warrants.
pub fn error_response(status: StatusCode, code: &'static str, message: impl Display) -> Response {
    let message = message.to_string();

    if status.is_server_error() {
        error!(error_code = code, status = status.as_u16(), message = %message, "request failed");
    } else {
        debug!(error_code = code, status = status.as_u16(), message = %message, "client error");
    }

    let body = ErrorResponse {
        error: message,
        code: code.to_string(),
    };

    (status, Json(body)).into_response()
}

/// Fallback for routes that do not exist.
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "resource not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_error_response_body() {
        let response = error_response(StatusCode::BAD_REQUEST, "MISSING_CODE", "no code");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "no code");
        assert_eq!(body.code, "MISSING_CODE");
    }
}
