//! Session gate for protected routes.

use axum::{
    Router,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::COOKIE, request::Parts},
    middleware::{self, Next},
    response::Response,
};
use tracing::debug;

use super::{AUTH_COOKIE, AuthError, SessionClaims, SessionCodec};

/// Find a cookie value in a single Cookie header.
fn cookie_from_header<'a>(cookie_header: &'a str, cookie_name: &str) -> Option<&'a str> {
    cookie_header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() == cookie_name {
            Some(value.trim())
        } else {
            None
        }
    })
}

/// Read a cookie from the request headers.
///
/// `Ok(None)` when the cookie is absent; an error only when a Cookie header
/// is not readable as text.
pub fn cookie_value<'a>(
    headers: &'a HeaderMap,
    cookie_name: &str,
) -> Result<Option<&'a str>, AuthError> {
    for header in headers.get_all(COOKIE) {
        let text = header
            .to_str()
            .map_err(|e| AuthError::CookieRead(e.to_string()))?;
        if let Some(value) = cookie_from_header(text, cookie_name) {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub claims: SessionClaims,
}

impl CurrentUser {
    /// Get the subject id.
    pub fn id(&self) -> &str {
        &self.claims.sub
    }

    pub fn provider(&self) -> &str {
        &self.claims.provider
    }

    pub fn display_name(&self) -> &str {
        self.claims.display_name()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::NoSession)
    }
}

/// Session gate middleware.
///
/// Requests without an `auth` cookie, with an empty one, or with a token the
/// codec rejects are redirected to the entry page and never reach the inner
/// handler. Valid requests continue unchanged with `CurrentUser` in their
/// extensions.
pub async fn require_session(
    State(codec): State<SessionCodec>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = {
        let token = cookie_value(req.headers(), AUTH_COOKIE)?
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::NoSession)?;
        codec.verify_session(token)?
    };

    debug!(subject = %claims.sub, provider = %claims.provider, "session accepted");
    req.extensions_mut().insert(CurrentUser { claims });

    Ok(next.run(req).await)
}

/// Put every route of `router` behind the session gate.
pub fn protect<S>(router: Router<S>, codec: SessionCodec) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(codec, require_session))
}
