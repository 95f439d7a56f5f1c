//! Session authentication.
//!
//! Provides the session codec (signed, expiring cookie tokens) and the gate
//! middleware that protects routes with it.

mod claims;
mod codec;
mod error;
mod middleware;

pub use claims::{SESSION_AUDIENCE, STATE_AUDIENCE, SessionClaims, StateClaims};
pub use codec::SessionCodec;
pub use error::AuthError;
pub use middleware::{CurrentUser, cookie_value, protect, require_session};

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth";

/// Where unauthenticated requests are sent.
pub const ENTRY_PATH: &str = "/";

/// Build the `Set-Cookie` value for a session token.
pub fn session_cookie(token: &str, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!("{AUTH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax{secure_flag}")
}
