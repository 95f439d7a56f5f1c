//! Per-attempt login state (CSRF protection for the callback).

use nanoid::nanoid;
use tracing::debug;

use super::FlowError;
use crate::auth::SessionCodec;

/// Cookie carrying the signed state token between login and callback.
pub const STATE_COOKIE: &str = "oauth_state";

const STATE_LEN: usize = 32;

/// Fresh random state value for one login attempt.
pub fn new_state() -> String {
    nanoid!(STATE_LEN)
}

/// Path the state cookie is scoped to.
pub fn callback_path(provider_id: &str) -> String {
    format!("/auth/callback/{provider_id}")
}

/// `Set-Cookie` value for the state token.
pub fn state_cookie(token: &str, provider_id: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{STATE_COOKIE}={token}; Path={}; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}{secure_flag}",
        callback_path(provider_id)
    )
}

/// Check the state returned by the provider against the state cookie.
pub fn verify_state(
    codec: &SessionCodec,
    cookie: Option<&str>,
    provider_id: &str,
    returned_state: Option<&str>,
) -> Result<(), FlowError> {
    let cookie = cookie
        .filter(|value| !value.is_empty())
        .ok_or_else(|| FlowError::StateMismatch("no login in progress".to_string()))?;
    let returned = returned_state
        .filter(|value| !value.is_empty())
        .ok_or_else(|| FlowError::StateMismatch("callback carries no state".to_string()))?;

    let claims = codec.decode_state(cookie).map_err(|e| {
        debug!(error = %e, "state cookie rejected");
        FlowError::StateMismatch("login attempt expired or invalid".to_string())
    })?;

    if claims.provider != provider_id {
        return Err(FlowError::StateMismatch(format!(
            "login was started for provider {}",
            claims.provider
        )));
    }
    if claims.state != returned {
        return Err(FlowError::StateMismatch(
            "state does not match login attempt".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> SessionCodec {
        SessionCodec::new("test-secret-for-unit-tests-minimum-32-chars-long", 3600, 600)
    }

    #[test]
    fn test_new_state_is_random() {
        let a = new_state();
        let b = new_state();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_state_cookie_attributes() {
        assert_eq!(
            state_cookie("tok", "eve", 600, false),
            "oauth_state=tok; Path=/auth/callback/eve; HttpOnly; SameSite=Lax; Max-Age=600"
        );
        assert!(state_cookie("tok", "eve", 600, true).ends_with("; Secure"));
    }

    #[test]
    fn test_matching_state_verifies() {
        let codec = codec();
        let token = codec.encode_state("abc", "eve").unwrap();
        assert!(verify_state(&codec, Some(&token), "eve", Some("abc")).is_ok());
    }

    #[test]
    fn test_mismatches() {
        let codec = codec();
        let token = codec.encode_state("abc", "eve").unwrap();

        for (cookie, provider, state) in [
            (None, "eve", Some("abc")),
            (Some(token.as_str()), "eve", None),
            (Some(token.as_str()), "eve", Some("")),
            (Some(token.as_str()), "eve", Some("xyz")),
            (Some(token.as_str()), "discord", Some("abc")),
            (Some("garbage"), "eve", Some("abc")),
        ] {
            assert!(
                matches!(
                    verify_state(&codec, cookie, provider, state),
                    Err(FlowError::StateMismatch(_))
                ),
                "expected mismatch for {provider} {state:?}"
            );
        }
    }

    #[test]
    fn test_expired_state_is_rejected() {
        let codec =
            SessionCodec::new("test-secret-for-unit-tests-minimum-32-chars-long", 3600, -3600);
        let token = codec.encode_state("abc", "eve").unwrap();
        assert!(verify_state(&codec, Some(&token), "eve", Some("abc")).is_err());
    }
}
