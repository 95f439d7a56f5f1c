//! Identity provider configuration.
//!
//! `ProviderSettings` is what the config file holds (secrets possibly as
//! `env:` references). `ProviderConfig` is the resolved, validated record the
//! flow works with; the registry owns all of them for the process lifetime.

mod registry;

pub use registry::{ProviderRegistry, UnknownProvider};

use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigurationError, resolve_env_value};

/// Whether the authorization request asks for a one-time or renewable grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentMode {
    /// No refresh capability requested.
    Online,
    /// Long-lived grant requested.
    Offline,
}

impl ConsentMode {
    /// Value of the `access_type` authorization parameter.
    pub fn access_type(self) -> &'static str {
        match self {
            ConsentMode::Online => "online",
            ConsentMode::Offline => "offline",
        }
    }
}

/// Shape of the provider's profile payload and the rule that normalizes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileFormat {
    /// Numeric character id plus character name.
    Eve,
    /// Username plus discriminator.
    Discord,
}

impl fmt::Display for ProfileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileFormat::Eve => write!(f, "eve"),
            ProfileFormat::Discord => write!(f, "discord"),
        }
    }
}

/// Provider entry as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Path segment identifying the provider (`/auth/login/{id}`).
    pub id: String,
    /// Human readable name for the landing page.
    #[serde(default)]
    pub name: Option<String>,
    /// OAuth2 client id. Supports `env:VAR_NAME`.
    pub client_id: String,
    /// OAuth2 client secret. Supports `env:VAR_NAME`.
    pub client_secret: String,
    pub redirect_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub profile_endpoint: String,
    pub consent: ConsentMode,
    pub profile: ProfileFormat,
}

impl ProviderSettings {
    /// Built-in providers: EVE Online SSO and Discord.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                id: "eve".to_string(),
                name: Some("EVE Online".to_string()),
                client_id: "env:EVE_CLIENT_ID".to_string(),
                client_secret: "env:EVE_CLIENT_SECRET".to_string(),
                redirect_url: "http://localhost:4000/auth/callback/eve".to_string(),
                scopes: vec!["publicData".to_string()],
                authorization_endpoint: "https://login.eveonline.com/oauth/authorize/".to_string(),
                token_endpoint: "https://login.eveonline.com/oauth/token".to_string(),
                profile_endpoint: "https://login.eveonline.com/oauth/verify".to_string(),
                consent: ConsentMode::Offline,
                profile: ProfileFormat::Eve,
            },
            Self {
                id: "discord".to_string(),
                name: Some("Discord".to_string()),
                client_id: "env:DISCORD_CLIENT_ID".to_string(),
                client_secret: "env:DISCORD_CLIENT_SECRET".to_string(),
                redirect_url: "http://localhost:4000/auth/callback/discord".to_string(),
                scopes: vec!["identify".to_string()],
                authorization_endpoint: "https://discordapp.com/api/oauth2/authorize".to_string(),
                token_endpoint: "https://discordapp.com/api/oauth2/token".to_string(),
                profile_endpoint: "https://discordapp.com/api/v6/users/@me".to_string(),
                consent: ConsentMode::Online,
                profile: ProfileFormat::Discord,
            },
        ]
    }

    /// Resolve secrets and parse endpoints.
    ///
    /// An empty or unresolvable client id/secret is a configuration error,
    /// never something to discover on the first login attempt.
    pub fn resolve(&self) -> Result<ProviderConfig, ConfigurationError> {
        let client_id = resolve_credential(&self.client_id).map_err(|detail| {
            ConfigurationError::MissingClientId {
                provider: self.id.clone(),
                detail,
            }
        })?;
        let client_secret = resolve_credential(&self.client_secret).map_err(|detail| {
            ConfigurationError::MissingClientSecret {
                provider: self.id.clone(),
                detail,
            }
        })?;

        Ok(ProviderConfig {
            id: self.id.clone(),
            display_name: self.name.clone().unwrap_or_else(|| self.id.clone()),
            client_id,
            client_secret,
            redirect_url: self.parse_url("redirect_url", &self.redirect_url)?,
            scopes: self.scopes.clone(),
            authorization_endpoint: self
                .parse_url("authorization_endpoint", &self.authorization_endpoint)?,
            token_endpoint: self.parse_url("token_endpoint", &self.token_endpoint)?,
            profile_endpoint: self.parse_url("profile_endpoint", &self.profile_endpoint)?,
            consent: self.consent,
            profile: self.profile,
        })
    }

    fn parse_url(&self, field: &'static str, value: &str) -> Result<Url, ConfigurationError> {
        Url::parse(value).map_err(|_| ConfigurationError::InvalidUrl {
            provider: self.id.clone(),
            field,
            value: value.to_string(),
        })
    }
}

fn resolve_credential(value: &str) -> Result<String, String> {
    match resolve_env_value(value) {
        Ok(resolved) if resolved.trim().is_empty() => Err("empty value".to_string()),
        Ok(resolved) => Ok(resolved),
        Err(ConfigurationError::EnvVarNotFound(var) | ConfigurationError::EnvVarEmpty(var)) => {
            Err(format!("set {var}"))
        }
        Err(other) => Err(other.to_string()),
    }
}

/// Resolved provider configuration. Immutable once built.
#[derive(Clone)]
pub struct ProviderConfig {
    pub id: String,
    pub display_name: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: Url,
    pub scopes: Vec<String>,
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    pub profile_endpoint: Url,
    pub consent: ConsentMode,
    pub profile: ProfileFormat,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url.as_str())
            .field("scopes", &self.scopes)
            .field("authorization_endpoint", &self.authorization_endpoint.as_str())
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("profile_endpoint", &self.profile_endpoint.as_str())
            .field("consent", &self.consent)
            .field("profile", &self.profile)
            .finish()
    }
}
