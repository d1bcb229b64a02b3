//! Read-through accessor
//!
//! 1. look the key up; a decodable hit returns without touching the store
//! 2. on a miss, an undecodable value or a cache failure, run the loader
//! 3. register query keys with the user's registry, then store the value
//!
//! Only loader errors reach the caller.

use super::layer::CacheLayer;
use crate::logging::log_cache_degradation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Whether a response came from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub status: CacheStatus,
}

impl<T> Cached<T> {
    pub fn hit(value: T) -> Self {
        Self {
            value,
            status: CacheStatus::Hit,
        }
    }

    pub fn miss(value: T) -> Self {
        Self {
            value,
            status: CacheStatus::Miss,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.status == CacheStatus::Hit
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            value: f(self.value),
            status: self.status,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl CacheLayer {
    /// Serve `key` from the cache or from `loader`
    ///
    /// With `track_user` set, the key is a query key: it is added to that
    /// user's registry before it is written, and not written at all if the
    /// registry update fails, so every cached query key stays reachable by
    /// `invalidate_user`.
    pub async fn read_through<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        track_user: Option<&str>,
        loader: F,
    ) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.client().get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    debug!(key = %key, "Cache HIT");
                    return Ok(Cached::hit(value));
                }
                // Left in place; the TTL or the next invalidation removes it
                Err(e) => warn!(key = %key, error = %e, "Undecodable cached value, treating as miss"),
            },
            Ok(None) => debug!(key = %key, "Cache MISS"),
            Err(e) => log_cache_degradation("get", key, &e),
        }

        let value = loader().await?;
        self.populate(key, &value, ttl, track_user).await;
        Ok(Cached::miss(value))
    }

    async fn populate<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        track_user: Option<&str>,
    ) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize value for cache");
                return;
            }
        };

        if let Some(user_id) = track_user {
            if let Err(e) = self.client().track_key(user_id, key).await {
                log_cache_degradation("track_key", key, &e);
                return;
            }
        }

        match self.client().set(key, &payload, ttl).await {
            Ok(()) => debug!(key = %key, ttl_seconds = ttl.as_secs(), "Cache SET"),
            Err(e) => log_cache_degradation("set", key, &e),
        }
    }
}
