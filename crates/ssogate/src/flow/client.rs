//! Outbound calls to identity providers.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::FlowError;
use crate::config::HttpClientConfig;
use crate::provider::ProviderConfig;

/// Tokens expiring within this many seconds are treated as already expired.
pub const EXPIRY_DELTA_SECS: i64 = 10;

/// Token endpoint response.
#[derive(Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds. Absent or zero means the provider gave none.
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .finish()
    }
}

impl TokenResponse {
    /// Check the token is usable and take the access token out of it.
    pub fn into_access_token(self) -> Result<AccessToken, FlowError> {
        if self.access_token.is_empty() {
            return Err(FlowError::InvalidToken("empty access token".to_string()));
        }
        match self.expires_in {
            Some(secs) if secs != 0 && secs < EXPIRY_DELTA_SECS => Err(FlowError::InvalidToken(
                format!("token expires in {secs}s"),
            )),
            _ => Ok(AccessToken(self.access_token)),
        }
    }
}

/// Provider access token. Only ever used to fetch the profile.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// HTTP client for token exchange and profile fetch.
///
/// Wraps one pooled `reqwest::Client`; clones share the pool.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: Client,
}

impl ProviderClient {
    pub fn new(config: &HttpClientConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("ssogate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Exchange an authorization code at the provider's token endpoint.
    pub async fn exchange_code(
        &self,
        provider: &ProviderConfig,
        code: &str,
    ) -> Result<TokenResponse, FlowError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", provider.redirect_url.as_str()),
            ("client_id", provider.client_id.as_str()),
        ];

        let response = self
            .http
            .post(provider.token_endpoint.clone())
            .basic_auth(&provider.client_id, Some(&provider.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| FlowError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(
                provider = %provider.id,
                %status,
                body = %truncate(&body),
                "token endpoint rejected code"
            );
            return Err(FlowError::TokenExchange(format!(
                "token endpoint returned {status}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| FlowError::TokenExchange(format!("unreadable token response: {e}")))
    }

    /// Fetch the raw profile body with the access token.
    pub async fn fetch_profile(
        &self,
        provider: &ProviderConfig,
        token: &AccessToken,
    ) -> Result<Vec<u8>, FlowError> {
        let response = self
            .http
            .get(provider.profile_endpoint.clone())
            .bearer_auth(token.secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FlowError::ProfileFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FlowError::ProfileFetch(format!(
                "profile endpoint returned {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FlowError::ProfileRead(e.to_string()))?;
        Ok(body.to_vec())
    }
}

fn truncate(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
