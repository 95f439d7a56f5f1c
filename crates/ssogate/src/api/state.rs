//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::SessionCodec;
use crate::config::{ConfigurationError, GatewayConfig};
use crate::flow::{AuthFlowController, ProviderClient};
use crate::provider::ProviderRegistry;

/// Application state shared across handlers.
///
/// Built once before the listener is bound; everything in it is read-only.
#[derive(Clone)]
pub struct AppState {
    /// Login flow for all providers.
    pub flow: Arc<AuthFlowController>,
    /// Codec used by the session gate.
    pub codec: SessionCodec,
    /// Registered providers.
    pub registry: ProviderRegistry,
}

impl AppState {
    pub fn new(registry: ProviderRegistry, codec: SessionCodec, flow: AuthFlowController) -> Self {
        Self {
            flow: Arc::new(flow),
            codec,
            registry,
        }
    }

    /// Build the state from configuration.
    ///
    /// Fails on any provider or session misconfiguration, so a broken setup
    /// never reaches the point of accepting connections.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigurationError> {
        let registry = ProviderRegistry::from_settings(&config.providers)?;
        let codec = SessionCodec::from_config(&config.session)?;
        let client = ProviderClient::new(&config.http)
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;
        let flow =
            AuthFlowController::new(registry.clone(), codec.clone(), client, &config.session);
        Ok(Self::new(registry, codec, flow))
    }
}
