//! Provider registry.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::{ProviderConfig, ProviderSettings};
use crate::config::ConfigurationError;

/// Lookup of a provider id that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider {0} is not supported")]
pub struct UnknownProvider(pub String);

/// Immutable set of configured providers.
///
/// Built once before the server starts; clones share the same map.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Arc<HashMap<String, ProviderConfig>>,
    order: Arc<Vec<String>>,
}

impl ProviderRegistry {
    /// Resolve and validate every provider entry from the config file.
    pub fn from_settings(settings: &[ProviderSettings]) -> Result<Self, ConfigurationError> {
        let configs = settings
            .iter()
            .map(ProviderSettings::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(configs)
    }

    /// Build a registry from already resolved providers.
    pub fn new(configs: Vec<ProviderConfig>) -> Result<Self, ConfigurationError> {
        if configs.is_empty() {
            return Err(ConfigurationError::NoProviders);
        }

        let mut providers = HashMap::with_capacity(configs.len());
        let mut order = Vec::with_capacity(configs.len());
        for config in configs {
            if config.client_id.trim().is_empty() {
                return Err(ConfigurationError::MissingClientId {
                    provider: config.id,
                    detail: "empty value".to_string(),
                });
            }
            if config.client_secret.trim().is_empty() {
                return Err(ConfigurationError::MissingClientSecret {
                    provider: config.id,
                    detail: "empty value".to_string(),
                });
            }
            if providers.contains_key(&config.id) {
                return Err(ConfigurationError::DuplicateProvider(config.id));
            }

            info!(
                provider = %config.id,
                consent = config.consent.access_type(),
                profile = %config.profile,
                "registered identity provider"
            );
            order.push(config.id.clone());
            providers.insert(config.id.clone(), config);
        }

        Ok(Self {
            providers: Arc::new(providers),
            order: Arc::new(order),
        })
    }

    /// Find a provider by id.
    pub fn lookup(&self, provider_id: &str) -> Result<&ProviderConfig, UnknownProvider> {
        self.providers
            .get(provider_id)
            .ok_or_else(|| UnknownProvider(provider_id.to_string()))
    }

    /// Providers in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.order.iter().filter_map(|id| self.providers.get(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
