//! Login flow errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::error::error_response;
use crate::identity::NormalizationError;
use crate::provider::UnknownProvider;

/// Everything that can end a login attempt early.
///
/// Each step of the callback has its own variant so logs and responses say
/// exactly where an attempt stopped.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0}")]
    UnsupportedProvider(#[from] UnknownProvider),

    #[error("auth action {0} not supported")]
    UnsupportedAction(String),

    #[error("malformed callback query: {0}")]
    BadCallback(String),

    #[error("missing authorization code")]
    MissingCode,

    #[error("provider denied the login: {0}")]
    ProviderDenied(String),

    #[error("login state mismatch: {0}")]
    StateMismatch(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("provider returned an unusable access token: {0}")]
    InvalidToken(String),

    #[error("profile request failed: {0}")]
    ProfileFetch(String),

    #[error("failed to read profile body: {0}")]
    ProfileRead(String),

    #[error("failed to parse profile: {0}")]
    ProfileParse(String),

    #[error("{0}")]
    Normalization(#[from] NormalizationError),

    #[error("failed to issue session: {0}")]
    Session(String),
}

impl FlowError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedProvider(_)
            | Self::BadCallback(_)
            | Self::MissingCode
            | Self::ProviderDenied(_)
            | Self::StateMismatch(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedAction(_) => StatusCode::NOT_FOUND,
            Self::TokenExchange(_)
            | Self::InvalidToken(_)
            | Self::ProfileFetch(_)
            | Self::ProfileRead(_)
            | Self::ProfileParse(_)
            | Self::Normalization(_)
            | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            Self::UnsupportedAction(_) => "UNSUPPORTED_ACTION",
            Self::BadCallback(_) => "BAD_CALLBACK",
            Self::MissingCode => "MISSING_CODE",
            Self::ProviderDenied(_) => "PROVIDER_DENIED",
            Self::StateMismatch(_) => "STATE_MISMATCH",
            Self::TokenExchange(_) => "TOKEN_EXCHANGE_FAILED",
            Self::InvalidToken(_) => "INVALID_PROVIDER_TOKEN",
            Self::ProfileFetch(_) => "PROFILE_FETCH_FAILED",
            Self::ProfileRead(_) => "PROFILE_READ_FAILED",
            Self::ProfileParse(_) => "PROFILE_PARSE_FAILED",
            Self::Normalization(_) => "NORMALIZATION_FAILED",
            Self::Session(_) => "SESSION_ISSUE_FAILED",
        }
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.error_code(), &self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        let err = FlowError::from(UnknownProvider("github".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "UNSUPPORTED_PROVIDER");
        assert_eq!(err.to_string(), "provider github is not supported");

        assert_eq!(FlowError::MissingCode.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            FlowError::BadCallback("duplicate field `code`".into()).error_code(),
            "BAD_CALLBACK"
        );
        assert_eq!(
            FlowError::StateMismatch("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unsupported_action() {
        let err = FlowError::UnsupportedAction("logout".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "auth action logout not supported");
    }

    #[test]
    fn test_provider_failures_are_server_errors() {
        let normalization = FlowError::from(NormalizationError::MissingField {
            provider: "eve".to_string(),
            field: "CharacterID",
        });
        for err in [
            FlowError::TokenExchange("timeout".into()),
            FlowError::InvalidToken("expired".into()),
            FlowError::ProfileFetch("502".into()),
            FlowError::ProfileRead("eof".into()),
            FlowError::ProfileParse("json".into()),
            normalization,
            FlowError::Session("sign".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_response_has_no_location() {
        let response = FlowError::MissingCode.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get("location").is_none());
        assert!(response.headers().get("set-cookie").is_none());
    }
}
