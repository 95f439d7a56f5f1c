//! Gateway configuration.
//!
//! Every section deserializes with defaults so a partial TOML file (or an
//! empty one) yields a runnable configuration. Secrets may be given literally
//! or as `env:VAR_NAME` references that are resolved once at startup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ProviderSettings;

/// Minimum length for a configured session secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Upper bound for any token lifetime (one year).
pub const MAX_TTL_SECS: i64 = 60 * 60 * 24 * 365;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub http: HttpClientConfig,
    pub providers: Vec<ProviderSettings>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            http: HttpClientConfig::default(),
            providers: ProviderSettings::defaults(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

/// Session cookie and token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HMAC secret for session and state tokens. Supports `env:VAR_NAME`.
    /// When unset a random secret is generated per process.
    pub secret: Option<String>,
    /// Session token lifetime in seconds.
    pub ttl_secs: i64,
    /// Lifetime of the login-attempt state cookie in seconds.
    pub state_ttl_secs: i64,
    /// Add the `Secure` attribute to cookies (requires https).
    pub cookie_secure: bool,
    /// Where a successful login lands.
    pub landing_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_secs: 60 * 60 * 24,
            state_ttl_secs: 60 * 10,
            cookie_secure: false,
            landing_path: "/user".to_string(),
        }
    }
}

impl SessionConfig {
    /// Check the token lifetimes are positive and bounded.
    pub fn validate_ttls(&self) -> Result<(), ConfigurationError> {
        for (field, value) in [
            ("session.ttl_secs", self.ttl_secs),
            ("session.state_ttl_secs", self.state_ttl_secs),
        ] {
            if !(1..=MAX_TTL_SECS).contains(&value) {
                return Err(ConfigurationError::InvalidTtl { field, value });
            }
        }
        Ok(())
    }

    /// Resolve the session secret.
    ///
    /// Returns `Ok(None)` when no secret is configured; the caller decides
    /// whether to fall back to a generated one.
    pub fn resolve_secret(&self) -> Result<Option<String>, ConfigurationError> {
        let Some(ref value) = self.secret else {
            return Ok(None);
        };

        let secret = resolve_env_value(value)?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigurationError::SessionSecretTooShort);
        }
        Ok(Some(secret))
    }

    /// Generate a random alphanumeric secret suitable for HS256.
    pub fn generate_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Outbound HTTP client settings for provider calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Total timeout for a single provider request, in seconds.
    pub timeout_secs: u64,
    /// TCP connect timeout, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            connect_timeout_secs: 3,
        }
    }
}

/// Errors that make the gateway refuse to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no identity providers configured")]
    NoProviders,

    #[error("provider '{0}' is configured more than once")]
    DuplicateProvider(String),

    #[error("provider '{provider}' has no client id ({detail}). Did you remember to set environment variables?")]
    MissingClientId { provider: String, detail: String },

    #[error("provider '{provider}' has no client secret ({detail}). Did you remember to set environment variables?")]
    MissingClientSecret { provider: String, detail: String },

    #[error("provider '{provider}' has an invalid {field}: '{value}'")]
    InvalidUrl {
        provider: String,
        field: &'static str,
        value: String,
    },

    #[error("session secret must be at least 32 characters long")]
    SessionSecretTooShort,

    #[error("environment variable '{0}' not found (referenced via env:{0} in config)")]
    EnvVarNotFound(String),

    #[error("environment variable '{0}' is empty (referenced via env:{0} in config)")]
    EnvVarEmpty(String),

    #[error("{field} must be between 1 and 31536000 seconds, got {value}")]
    InvalidTtl { field: &'static str, value: i64 },

    #[error("failed to build provider HTTP client: {0}")]
    HttpClient(String),
}

/// Resolve a config value, expanding `env:VAR_NAME` references.
pub fn resolve_env_value(value: &str) -> Result<String, ConfigurationError> {
    match value.strip_prefix("env:") {
        Some(var_name) => match std::env::var(var_name) {
            Ok(resolved) if !resolved.is_empty() => Ok(resolved),
            Ok(_) => Err(ConfigurationError::EnvVarEmpty(var_name.to_string())),
            Err(_) => Err(ConfigurationError::EnvVarNotFound(var_name.to_string())),
        },
        None => Ok(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_both_providers() {
        let config = GatewayConfig::default();
        let ids: Vec<_> = config.providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["eve", "discord"]);
        assert_eq!(config.server.port, 4000);
        assert!(config.session.secret.is_none());
    }

    #[test]
    fn test_default_config_survives_toml_round_trip() {
        let config = GatewayConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: GatewayConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.providers.len(), 2);
        assert_eq!(parsed.session.landing_path, "/user");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: GatewayConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.http.timeout_secs, 5);
    }

    #[test]
    fn test_resolve_literal_value() {
        assert_eq!(resolve_env_value("plain").unwrap(), "plain");
    }

    #[test]
    fn test_resolve_env_value() {
        // SAFETY: test-only variable with a unique name
        unsafe {
            std::env::set_var("SSOGATE_TEST_RESOLVE_VALUE", "from-env");
        }
        assert_eq!(
            resolve_env_value("env:SSOGATE_TEST_RESOLVE_VALUE").unwrap(),
            "from-env"
        );
        // SAFETY: cleaning up the variable set above
        unsafe {
            std::env::remove_var("SSOGATE_TEST_RESOLVE_VALUE");
        }
    }

    #[test]
    fn test_resolve_env_value_missing() {
        assert_eq!(
            resolve_env_value("env:SSOGATE_TEST_DOES_NOT_EXIST").unwrap_err(),
            ConfigurationError::EnvVarNotFound("SSOGATE_TEST_DOES_NOT_EXIST".to_string())
        );
    }

    #[test]
    fn test_session_secret_too_short() {
        let config = SessionConfig {
            secret: Some("short".to_string()),
            ..SessionConfig::default()
        };
        assert_eq!(
            config.resolve_secret().unwrap_err(),
            ConfigurationError::SessionSecretTooShort
        );
    }

    #[test]
    fn test_default_ttls_are_valid() {
        assert!(SessionConfig::default().validate_ttls().is_ok());
    }

    #[test]
    fn test_invalid_ttls_rejected() {
        for (ttl_secs, state_ttl_secs, field, value) in [
            (0, 600, "session.ttl_secs", 0),
            (-60, 600, "session.ttl_secs", -60),
            (i64::MAX, 600, "session.ttl_secs", i64::MAX),
            (3600, 0, "session.state_ttl_secs", 0),
            (3600, MAX_TTL_SECS + 1, "session.state_ttl_secs", MAX_TTL_SECS + 1),
        ] {
            let config = SessionConfig {
                ttl_secs,
                state_ttl_secs,
                ..SessionConfig::default()
            };
            assert_eq!(
                config.validate_ttls().unwrap_err(),
                ConfigurationError::InvalidTtl { field, value }
            );
        }
    }

    #[test]
    fn test_session_secret_unset() {
        assert_eq!(SessionConfig::default().resolve_secret().unwrap(), None);
    }

    #[test]
    fn test_generated_secret_passes_validation() {
        let secret = SessionConfig::generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));

        let config = SessionConfig {
            secret: Some(secret.clone()),
            ..SessionConfig::default()
        };
        assert_eq!(config.resolve_secret().unwrap(), Some(secret));
    }
}
