//! Login initiation and callback handling.

use std::str::FromStr;

use axum::{
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::FlowError;
use super::client::ProviderClient;
use super::state::{new_state, state_cookie, verify_state};
use crate::auth::{SessionCodec, session_cookie};
use crate::config::SessionConfig;
use crate::identity::{RawProfile, normalize};
use crate::provider::{ProviderConfig, ProviderRegistry};

/// Second path segment of `/auth/{action}/{provider}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Callback,
}

impl FromStr for AuthAction {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(AuthAction::Login),
            "callback" => Ok(AuthAction::Callback),
            other => Err(FlowError::UnsupportedAction(other.to_string())),
        }
    }
}

/// Query parameters the provider sends back to the callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Redirect to the provider, with the state cookie for this attempt.
#[derive(Debug)]
pub struct LoginRedirect {
    pub location: String,
    pub state_cookie: String,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        (
            AppendHeaders([(SET_COOKIE, self.state_cookie)]),
            Redirect::temporary(&self.location),
        )
            .into_response()
    }
}

/// Successful callback: the session cookie and where to go next.
#[derive(Debug)]
pub struct CompletedLogin {
    pub location: String,
    pub session_cookie: String,
}

impl IntoResponse for CompletedLogin {
    fn into_response(self) -> Response {
        (
            AppendHeaders([(SET_COOKIE, self.session_cookie)]),
            Redirect::temporary(&self.location),
        )
            .into_response()
    }
}

/// Drives the authorization-code flow for every registered provider.
///
/// Only the profile format differs between providers; the exchange, the
/// validity check and session issuance are shared.
#[derive(Debug, Clone)]
pub struct AuthFlowController {
    registry: ProviderRegistry,
    codec: SessionCodec,
    client: ProviderClient,
    cookie_secure: bool,
    landing_path: String,
}

impl AuthFlowController {
    pub fn new(
        registry: ProviderRegistry,
        codec: SessionCodec,
        client: ProviderClient,
        session: &SessionConfig,
    ) -> Self {
        Self {
            registry,
            codec,
            client,
            cookie_secure: session.cookie_secure,
            landing_path: session.landing_path.clone(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Authorization URL for one attempt.
    pub fn authorization_url(&self, provider: &ProviderConfig, state: &str) -> Url {
        let mut url = provider.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("access_type", provider.consent.access_type())
            .append_pair("client_id", &provider.client_id)
            .append_pair("redirect_uri", provider.redirect_url.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &provider.scopes.join(" "))
            .append_pair("state", state);
        url
    }

    /// Start a login: redirect to the provider and remember the state.
    #[instrument(skip(self))]
    pub fn initiate_login(&self, provider_id: &str) -> Result<LoginRedirect, FlowError> {
        let provider = self.registry.lookup(provider_id)?;

        let state = new_state();
        let token = self
            .codec
            .encode_state(&state, &provider.id)
            .map_err(|e| FlowError::Session(e.to_string()))?;
        let url = self.authorization_url(provider, &state);

        debug!(endpoint = %provider.authorization_endpoint, "redirecting to provider");
        Ok(LoginRedirect {
            location: url.into(),
            state_cookie: state_cookie(
                &token,
                &provider.id,
                self.codec.state_ttl_secs(),
                self.cookie_secure,
            ),
        })
    }

    /// Finish a login from the provider's callback.
    #[instrument(skip(self, params, state_cookie))]
    pub async fn complete_login(
        &self,
        provider_id: &str,
        params: &CallbackParams,
        state_cookie: Option<&str>,
    ) -> Result<CompletedLogin, FlowError> {
        let provider = self.registry.lookup(provider_id)?;

        if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
            let reason = match params.error_description.as_deref() {
                Some(description) if !description.is_empty() => format!("{error}: {description}"),
                _ => error.to_string(),
            };
            return Err(FlowError::ProviderDenied(reason));
        }

        let code = params
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or(FlowError::MissingCode)?;

        verify_state(&self.codec, state_cookie, &provider.id, params.state.as_deref())?;

        let token = self.client.exchange_code(provider, code).await?;
        let access_token = token.into_access_token()?;

        let body = self.client.fetch_profile(provider, &access_token).await?;
        let raw = RawProfile::parse(provider.profile, &body)
            .map_err(|e| FlowError::ProfileParse(e.to_string()))?;
        let identity = normalize(&provider.id, raw)?;

        let session = self
            .codec
            .encode(&identity)
            .map_err(|e| FlowError::Session(e.to_string()))?;

        info!(subject = %identity.subject_id, "login completed");
        Ok(CompletedLogin {
            location: self.landing_path.clone(),
            session_cookie: session_cookie(&session, self.cookie_secure),
        })
    }
}
