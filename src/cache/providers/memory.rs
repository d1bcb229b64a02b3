//! In-memory cache provider using Moka
//!
//! In-process cache for single-instance runs and tests. String values live in
//! a size-bounded `moka` cache with a per-entry expiry, so expired entries are
//! evicted by the cache's own maintenance instead of piling up.
//!
//! Registry sets carry no TTL, matching Redis. They are kept beside the
//! bounded cache so capacity eviction can never drop a registry while the
//! keys it tracks are still live.
//!
//! **Important**: This cache is NOT distributed. Each process keeps its own
//! entries, so invalidations in one instance are invisible to others.

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::traits::{CacheService, KeyFilter};
use crate::config::CacheConfig;
use dashmap::DashMap;
use globset::Glob;
use moka::Expiry;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct TextEntry {
    value: String,
    ttl: Duration,
}

/// Expire each entry after the TTL it was written with
struct PerEntryTtl;

impl Expiry<String, TextEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &TextEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &TextEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory cache service using Moka
#[derive(Clone)]
pub struct InMemoryCacheService {
    cache: moka::future::Cache<String, TextEntry>,
    registries: Arc<DashMap<String, HashSet<String>>>,
}

impl std::fmt::Debug for InMemoryCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCacheService")
            .field("max_capacity", &self.cache.policy().max_capacity())
            .field("entry_count", &self.cache.entry_count())
            .field("registries", &self.registries.len())
            .finish()
    }
}

impl InMemoryCacheService {
    /// Create an in-memory cache service from configuration
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.memory_max_capacity)
    }

    pub fn new(max_capacity: u64) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        debug!(max_capacity, "In-memory cache service created");

        Self {
            cache,
            registries: Arc::new(DashMap::new()),
        }
    }

    /// Number of live keys, registry sets included
    pub fn len(&self) -> usize {
        self.cache.iter().count() + self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a live key exists (any value type)
    pub fn contains_key(&self, key: &str) -> bool {
        self.cache.contains_key(key) || self.registries.contains_key(key)
    }

    /// Members of the set stored at `set_key`, empty when absent
    pub fn set_members(&self, set_key: &str) -> HashSet<String> {
        self.registries
            .get(set_key)
            .map(|members| members.value().clone())
            .unwrap_or_default()
    }

    /// Entries currently held by the bounded cache, expired ones not yet
    /// collected included
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Apply pending evictions and expirations
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    async fn remove_live(&self, key: &str) -> bool {
        let text = self.cache.remove(key).await.is_some();
        let set = self.registries.remove(key).is_some();
        text || set
    }
}

impl CacheService for InMemoryCacheService {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let result = self.cache.get(key).await.map(|entry| entry.value);

        if result.is_some() {
            debug!(key = key, "Cache HIT (memory)");
        } else if self.registries.contains_key(key) {
            return Err(CacheError::BackendError(format!(
                "key {key} holds a set, not a string"
            )));
        } else {
            debug!(key = key, "Cache MISS (memory)");
        }

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        if self.registries.contains_key(key) {
            return Err(CacheError::BackendError(format!(
                "key {key} holds a set, not a string"
            )));
        }

        self.cache
            .insert(
                key.to_string(),
                TextEntry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;

        debug!(key = key, ttl_ms = ttl.as_millis() as u64, "Cache SET (memory)");
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        let mut deleted = 0u64;
        for key in keys {
            if self.remove_live(key).await {
                deleted += 1;
            }
        }
        debug!(requested = keys.len(), deleted = deleted, "Cache DEL (memory)");
        Ok(deleted)
    }

    async fn delete_pattern(&self, pattern: &str, filter: KeyFilter<'_>) -> CacheResult<u64> {
        let matcher = Glob::new(pattern)
            .map_err(|e| CacheError::BackendError(format!("invalid key pattern {pattern}: {e}")))?
            .compile_matcher();

        let mut matching: Vec<String> = self
            .cache
            .iter()
            .map(|(key, _)| key.as_str().to_string())
            .filter(|key| matcher.is_match(key) && filter(key.as_str()))
            .collect();
        matching.extend(
            self.registries
                .iter()
                .map(|entry| entry.key().clone())
                .filter(|key| matcher.is_match(key) && filter(key.as_str())),
        );

        let mut deleted = 0u64;
        for key in &matching {
            if self.remove_live(key).await {
                deleted += 1;
            }
        }
        debug!(pattern = pattern, deleted = deleted, "Cache pattern DEL (memory)");
        Ok(deleted)
    }

    async fn add_to_set(&self, set_key: &str, member: &str) -> CacheResult<()> {
        if self.cache.contains_key(set_key) {
            return Err(CacheError::BackendError(format!(
                "key {set_key} holds a string, not a set"
            )));
        }

        self.registries
            .entry(set_key.to_string())
            .or_default()
            .insert(member.to_string());

        debug!(set_key = set_key, member = member, "Cache key tracked (memory)");
        Ok(())
    }

    async fn drain_set(&self, set_key: &str) -> CacheResult<u64> {
        // Removing the set first means a member added from here on starts a new one
        let Some((_, members)) = self.registries.remove(set_key) else {
            if self.cache.contains_key(set_key) {
                return Err(CacheError::BackendError(format!(
                    "key {set_key} holds a string, not a set"
                )));
            }
            return Ok(0);
        };

        let mut deleted = 0u64;
        for member in &members {
            if self.cache.remove(member.as_str()).await.is_some() {
                deleted += 1;
            }
        }
        debug!(set_key = set_key, deleted = deleted, "Cache set drained (memory)");
        Ok(deleted + 1)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
