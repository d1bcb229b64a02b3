//! # Web API Application State

use crate::cache::{CacheClient, CacheLayer};
use crate::config::GoaltrackConfig;
use crate::services::Services;
use crate::store::DocumentStore;
use std::sync::Arc;
use tracing::info;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub services: Services,
    pub cache: Arc<CacheClient>,
    pub config: Arc<GoaltrackConfig>,
}

impl AppState {
    pub fn new(services: Services, cache: Arc<CacheClient>, config: Arc<GoaltrackConfig>) -> Self {
        Self {
            services,
            cache,
            config,
        }
    }

    /// Build the cache client from configuration and wire the services
    pub async fn from_config(config: GoaltrackConfig, store: Arc<dyn DocumentStore>) -> Self {
        let cache = Arc::new(CacheClient::from_config_graceful(&config.cache).await);
        let layer = CacheLayer::new(cache.clone(), config.cache.ttl.clone());
        let services = Services::new(store, layer);
        info!(
            cache_provider = cache.provider_name(),
            bind_address = %config.web.bind_address,
            "Application state initialized"
        );
        Self::new(services, cache, Arc::new(config))
    }
}
