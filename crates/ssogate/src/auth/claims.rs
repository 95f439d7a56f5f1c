//! Token claims.

use serde::{Deserialize, Serialize};

/// Audience of session tokens carried in the `auth` cookie.
pub const SESSION_AUDIENCE: &str = "ssogate-session";

/// Audience of login-attempt state tokens carried in the `oauth_state` cookie.
pub const STATE_AUDIENCE: &str = "ssogate-oauth-state";

/// Claims of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject id of the authenticated account.
    pub sub: String,

    /// Display name at login time.
    #[serde(default)]
    pub name: String,

    /// Provider that authenticated the subject.
    pub provider: String,

    pub aud: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    /// Get the display name, falling back to the subject id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.sub
        } else {
            &self.name
        }
    }
}

/// Claims of the signed state cookie set when a login starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateClaims {
    /// Random value echoed back by the provider as `state`.
    pub state: String,
    /// Provider the login attempt was started for.
    pub provider: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let mut claims = SessionClaims {
            sub: "alice#1234".to_string(),
            name: String::new(),
            provider: "discord".to_string(),
            aud: SESSION_AUDIENCE.to_string(),
            iat: 0,
            exp: 0,
        };
        assert_eq!(claims.display_name(), "alice#1234");

        claims.name = "Alice".to_string();
        assert_eq!(claims.display_name(), "Alice");
    }
}
