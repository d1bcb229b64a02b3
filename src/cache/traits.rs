//! Cache service trait definition

use super::errors::CacheResult;
use std::time::Duration;

/// Predicate over physical keys, applied after glob matching
pub type KeyFilter<'a> = &'a (dyn Fn(&str) -> bool + Sync);

/// Trait defining raw cache backend operations
///
/// Implemented by concrete cache providers (Redis, in-memory, NoOp).
/// Keys passed here are physical keys: the namespace/version prefix has
/// already been applied by `CacheClient`.
pub trait CacheService: Send + Sync {
    /// Get a value from the cache by key
    ///
    /// Returns `Ok(Some(value))` on cache hit, `Ok(None)` on cache miss.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = CacheResult<Option<String>>> + Send;

    /// Set a value in the cache with a TTL
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Delete keys, returning how many existed
    fn delete(
        &self,
        keys: &[String],
    ) -> impl std::future::Future<Output = CacheResult<u64>> + Send;

    /// Delete keys matching a glob pattern for which `filter` returns true
    ///
    /// Networked backends iterate with SCAN so the server is never blocked.
    fn delete_pattern(
        &self,
        pattern: &str,
        filter: KeyFilter<'_>,
    ) -> impl std::future::Future<Output = CacheResult<u64>> + Send;

    /// Add a member to the set stored at `set_key`
    fn add_to_set(
        &self,
        set_key: &str,
        member: &str,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Delete every key named in the set at `set_key`, then the set itself
    ///
    /// A member added while the drain runs is either deleted with the rest
    /// or left in a fresh set; it is never dropped from tracking while its
    /// key survives.
    /// Returns the number of keys removed, the set included.
    fn drain_set(
        &self,
        set_key: &str,
    ) -> impl std::future::Future<Output = CacheResult<u64>> + Send;

    /// Check if the cache backend is healthy
    fn health_check(&self) -> impl std::future::Future<Output = CacheResult<bool>> + Send;

    /// Get the name of the cache provider
    fn provider_name(&self) -> &'static str;
}
