//! No-op cache provider
//!
//! Selected when `cache.enabled` is false, when the backend name is not
//! recognised, or when a Redis client cannot be built. Every read misses,
//! so the services fall through to the store.

use crate::cache::errors::CacheResult;
use crate::cache::traits::{CacheService, KeyFilter};
use std::time::Duration;

/// Backend that stores nothing; registries are always empty
#[derive(Debug, Clone, Default)]
pub struct NoOpCacheService;

impl NoOpCacheService {
    pub fn new() -> Self {
        Self
    }
}

impl CacheService for NoOpCacheService {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _keys: &[String]) -> CacheResult<u64> {
        Ok(0)
    }

    async fn delete_pattern(&self, _pattern: &str, _filter: KeyFilter<'_>) -> CacheResult<u64> {
        Ok(0)
    }

    async fn add_to_set(&self, _set_key: &str, _member: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn drain_set(&self, _set_key: &str) -> CacheResult<u64> {
        Ok(0)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
