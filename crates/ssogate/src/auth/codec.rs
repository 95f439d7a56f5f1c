//! Stateless session tokens.
//!
//! Tokens are HS256 JWTs. Session and login-state tokens share the key but
//! use different audiences, so one can never be accepted as the other.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::claims::{SESSION_AUDIENCE, STATE_AUDIENCE, SessionClaims, StateClaims};
use super::AuthError;
use crate::config::{ConfigurationError, SessionConfig};
use crate::identity::Identity;

/// Encodes identities into session tokens and verifies them.
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl_secs: i64,
    state_ttl_secs: i64,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("state_ttl_secs", &self.state_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    pub fn new(secret: &str, session_ttl_secs: i64, state_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl_secs,
            state_ttl_secs,
        }
    }

    /// Build the codec from config, generating a secret when none is set.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigurationError> {
        config.validate_ttls()?;
        let secret = match config.resolve_secret()? {
            Some(secret) => secret,
            None => {
                warn!("no session secret configured, generated a random one; sessions will not survive a restart");
                SessionConfig::generate_secret()
            }
        };
        Ok(Self::new(&secret, config.ttl_secs, config.state_ttl_secs))
    }

    pub fn state_ttl_secs(&self) -> i64 {
        self.state_ttl_secs
    }

    /// Issue a session token for an identity.
    pub fn encode(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: identity.subject_id.clone(),
            name: identity.display_name.clone(),
            provider: identity.provider_id.clone(),
            aud: SESSION_AUDIENCE.to_string(),
            iat: now,
            exp: now.saturating_add(self.session_ttl_secs),
        };
        self.sign(&claims)
    }

    /// Decode a session token. Any failure yields `None`.
    pub fn decode(&self, token: &str) -> Option<SessionClaims> {
        self.verify_session(token).ok()
    }

    /// Decode a session token, keeping the reason for a rejection.
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.verify(token, SESSION_AUDIENCE)
    }

    /// Issue the state token for one login attempt.
    pub fn encode_state(&self, state: &str, provider_id: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = StateClaims {
            state: state.to_string(),
            provider: provider_id.to_string(),
            aud: STATE_AUDIENCE.to_string(),
            iat: now,
            exp: now.saturating_add(self.state_ttl_secs),
        };
        self.sign(&claims)
    }

    pub fn decode_state(&self, token: &str) -> Result<StateClaims, AuthError> {
        self.verify(token, STATE_AUDIENCE)
    }

    fn sign<C: Serialize>(&self, claims: &C) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    fn verify<C: DeserializeOwned>(&self, token: &str, audience: &str) -> Result<C, AuthError> {
        if token.is_empty() {
            return Err(AuthError::NoSession);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "aud"]);

        decode::<C>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(audience, error = %e, "token rejected");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })
    }
}
