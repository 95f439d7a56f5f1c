//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use super::ENTRY_PATH;
use crate::api::error::error_response;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `auth` cookie, or an empty one.
    #[error("no session")]
    NoSession,

    /// Token failed signature, audience or format checks.
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    /// Token expired.
    #[error("session expired")]
    TokenExpired,

    /// The Cookie header could not be read.
    #[error("unreadable cookie header: {0}")]
    CookieRead(String),

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::NoSession | AuthError::InvalidToken(_) | AuthError::TokenExpired => {
                Redirect::temporary(ENTRY_PATH).into_response()
            }
            AuthError::CookieRead(_) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "COOKIE_READ_FAILED",
                self.to_string(),
            ),
            AuthError::Internal(_) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
            ),
        }
    }
}
