//! Cache client: the one owner of the backend connection.
//!
//! Uses enum dispatch over the concrete providers. Callers pass logical keys
//! (`goal:g1`); the client maps them into the current generation's physical
//! key space (`goaltrack:v1:goal:g1`).
//!
//! Every operation returns a [`CacheResult`]. Nothing here logs at error
//! level or swallows failures: the read-through and invalidation helpers
//! decide how to degrade.

use super::connection::ConnectionState;
use super::errors::{CacheError, CacheResult};
use super::keys::user_registry_key;
use super::providers::{InMemoryCacheService, NoOpCacheService, RedisCacheService};
use super::traits::{CacheService, KeyFilter};
use crate::config::CacheConfig;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[cfg(test)]
use super::providers::FailingCacheService;

#[derive(Debug, Clone)]
enum CacheBackend {
    /// Redis or Dragonfly (boxed to reduce enum size)
    Redis(Box<RedisCacheService>),
    Memory(InMemoryCacheService),
    NoOp(NoOpCacheService),
    #[cfg(test)]
    Failing(FailingCacheService),
}

macro_rules! dispatch {
    ($backend:expr, $service:ident => $call:expr) => {
        match $backend {
            CacheBackend::Redis($service) => $call,
            CacheBackend::Memory($service) => $call,
            CacheBackend::NoOp($service) => $call,
            #[cfg(test)]
            CacheBackend::Failing($service) => $call,
        }
    };
}

impl CacheBackend {
    fn provider_name(&self) -> &'static str {
        dispatch!(self, s => s.provider_name())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        dispatch!(self, s => s.get(key).await)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        dispatch!(self, s => s.set(key, value, ttl).await)
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        dispatch!(self, s => s.delete(keys).await)
    }

    async fn delete_pattern(&self, pattern: &str, filter: KeyFilter<'_>) -> CacheResult<u64> {
        dispatch!(self, s => s.delete_pattern(pattern, filter).await)
    }

    async fn add_to_set(&self, set_key: &str, member: &str) -> CacheResult<()> {
        dispatch!(self, s => s.add_to_set(set_key, member).await)
    }

    async fn drain_set(&self, set_key: &str) -> CacheResult<u64> {
        dispatch!(self, s => s.drain_set(set_key).await)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        dispatch!(self, s => s.health_check().await)
    }
}

/// Shared cache client
///
/// Construct once at startup and hand clones to every service; clones share
/// the backend connection. Call [`CacheClient::shutdown`] when the process
/// stops.
#[derive(Debug, Clone)]
pub struct CacheClient {
    backend: CacheBackend,
    prefix: String,
    delete_timeout: Duration,
}

impl CacheClient {
    /// Create a client from configuration with graceful degradation
    ///
    /// A disabled cache, an unknown backend name or an unusable Redis URL all
    /// produce a no-op client. Startup never fails because of the cache.
    /// When the key generation was bumped, older generations are swept in the
    /// background.
    pub async fn from_config_graceful(config: &CacheConfig) -> Self {
        let backend = Self::create_backend(config).await;
        let client = Self {
            backend,
            prefix: config.key_prefix(),
            delete_timeout: config.delete_timeout(),
        };

        if config.purge_previous_versions && config.version > 1 && client.is_enabled() {
            let current = config.clone();
            // Detached: the sweep logs its own outcome
            drop(client.scan_and_purge(&config.generation_sweep_pattern(), move |key| {
                current.is_previous_generation(key)
            }));
        }

        info!(
            provider = client.provider_name(),
            prefix = %client.prefix,
            "Cache client initialized"
        );
        client
    }

    async fn create_backend(config: &CacheConfig) -> CacheBackend {
        if !config.enabled {
            info!("Cache disabled by configuration");
            return CacheBackend::NoOp(NoOpCacheService::new());
        }

        match config.backend.as_str() {
            // Dragonfly speaks the Redis protocol
            "redis" | "dragonfly" => Self::create_redis_backend(config).await,
            "memory" | "in-memory" => {
                CacheBackend::Memory(InMemoryCacheService::from_config(config))
            }
            other => {
                warn!(backend = other, "Unknown cache backend, falling back to NoOp");
                CacheBackend::NoOp(NoOpCacheService::new())
            }
        }
    }

    async fn create_redis_backend(config: &CacheConfig) -> CacheBackend {
        let Some(redis_config) = &config.redis else {
            warn!("Redis cache enabled but no [cache.redis] config found, falling back to NoOp");
            return CacheBackend::NoOp(NoOpCacheService::new());
        };

        match RedisCacheService::from_config(redis_config).await {
            Ok(service) => CacheBackend::Redis(Box::new(service)),
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to create Redis client, falling back to NoOp cache (graceful degradation)"
                );
                CacheBackend::NoOp(NoOpCacheService::new())
            }
        }
    }

    fn with_backend(backend: CacheBackend, config: &CacheConfig) -> Self {
        Self {
            backend,
            prefix: config.key_prefix(),
            delete_timeout: config.delete_timeout(),
        }
    }

    /// Client over a fresh in-process backend
    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::with_backend(
            CacheBackend::Memory(InMemoryCacheService::from_config(config)),
            config,
        )
    }

    /// Always-miss client
    pub fn noop() -> Self {
        Self::with_backend(
            CacheBackend::NoOp(NoOpCacheService::new()),
            &CacheConfig::default(),
        )
    }

    #[cfg(test)]
    pub(crate) fn failing(config: &CacheConfig, service: FailingCacheService) -> Self {
        Self::with_backend(CacheBackend::Failing(service), config)
    }

    /// The in-process backend, when this client uses one
    pub fn memory_backend(&self) -> Option<&InMemoryCacheService> {
        match &self.backend {
            CacheBackend::Memory(service) => Some(service),
            _ => None,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    /// False for the no-op backend
    pub fn is_enabled(&self) -> bool {
        !matches!(self.backend, CacheBackend::NoOp(_))
    }

    /// Connection state of a networked backend; `None` for in-process ones
    pub fn connection_state(&self) -> Option<ConnectionState> {
        match &self.backend {
            CacheBackend::Redis(service) => Some(service.connection_state()),
            _ => None,
        }
    }

    /// Physical key for a logical key in the current generation
    pub fn physical_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.backend.get(&self.physical_key(key)).await
    }

    pub async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.backend.set(&self.physical_key(key), value, ttl).await
    }

    /// Delete keys, bounded by the delete ceiling
    ///
    /// Deleting an absent key is not an error; it just does not count.
    pub async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let physical: Vec<String> = keys.iter().map(|k| self.physical_key(k)).collect();
        self.bounded("DEL", self.backend.delete(&physical)).await
    }

    /// Sweep physical keys matching a glob pattern in a background task
    ///
    /// Only keys for which `filter` returns true are deleted. Used at startup
    /// to clear older key generations in one pass. Failures are logged by the
    /// task and reported as zero deletions.
    pub fn scan_and_purge<F>(&self, pattern: &str, filter: F) -> JoinHandle<u64>
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let backend = self.backend.clone();
        let pattern = pattern.to_string();
        tokio::spawn(async move {
            match backend.delete_pattern(&pattern, &filter).await {
                Ok(deleted) => {
                    info!(pattern = %pattern, deleted, "Purged previous cache generation");
                    deleted
                }
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "Cache generation purge failed");
                    0
                }
            }
        })
    }

    /// Record `key` in the registry of `user_id`
    pub async fn track_key(&self, user_id: &str, key: &str) -> CacheResult<()> {
        let registry = self.physical_key(&user_registry_key(user_id));
        self.backend
            .add_to_set(&registry, &self.physical_key(key))
            .await
    }

    /// Delete every key tracked for `user_id`, then the registry itself
    ///
    /// Returns the number of keys removed including the registry set.
    pub async fn invalidate_user(&self, user_id: &str) -> CacheResult<u64> {
        let registry = self.physical_key(&user_registry_key(user_id));
        let removed = self.bounded("DRAIN", self.backend.drain_set(&registry)).await?;
        debug!(user_id = %user_id, removed, "Invalidated user registry");
        Ok(removed)
    }

    /// Probe the backend; any failure reads as unhealthy
    pub async fn health_check(&self) -> bool {
        match self.backend.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                debug!(error = %e, "Cache health check failed");
                false
            }
        }
    }

    /// Stop background reconnects and release the connection
    pub fn shutdown(&self) {
        if let CacheBackend::Redis(service) = &self.backend {
            service.shutdown();
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        future: impl std::future::Future<Output = CacheResult<T>>,
    ) -> CacheResult<T> {
        tokio::time::timeout(self.delete_timeout, future)
            .await
            .map_err(|_| {
                CacheError::Timeout(format!(
                    "{operation} exceeded {}ms",
                    self.delete_timeout.as_millis()
                ))
            })?
    }
}
