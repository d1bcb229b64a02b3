//! Cache provider that fails every call, for degradation tests

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::traits::{CacheService, KeyFilter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureMode {
    /// Every call returns a backend error
    Error,
    /// Every call hangs until the caller's timeout fires
    Hang,
    /// Reads return a payload that is not valid JSON; writes succeed
    Garbage,
}

#[derive(Debug, Clone)]
pub(crate) struct FailingCacheService {
    mode: FailureMode,
    calls: Arc<AtomicU64>,
}

impl FailingCacheService {
    pub(crate) fn new(mode: FailureMode) -> Self {
        Self {
            mode,
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    async fn fail<T>(&self, operation: &str) -> CacheResult<T> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.mode == FailureMode::Hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Err(CacheError::BackendError(format!("injected {operation} failure")))
    }
}

impl CacheService for FailingCacheService {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        if self.mode == FailureMode::Garbage {
            self.calls.fetch_add(1, Ordering::Relaxed);
            return Ok(Some("{not json".to_string()));
        }
        self.fail("GET").await
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        if self.mode == FailureMode::Garbage {
            self.calls.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }
        self.fail("SET").await
    }

    async fn delete(&self, _keys: &[String]) -> CacheResult<u64> {
        self.fail("DEL").await
    }

    async fn delete_pattern(&self, _pattern: &str, _filter: KeyFilter<'_>) -> CacheResult<u64> {
        self.fail("SCAN").await
    }

    async fn add_to_set(&self, _set_key: &str, _member: &str) -> CacheResult<()> {
        if self.mode == FailureMode::Garbage {
            return Ok(());
        }
        self.fail("SADD").await
    }

    async fn drain_set(&self, _set_key: &str) -> CacheResult<u64> {
        self.fail("SMEMBERS").await
    }

    async fn health_check(&self) -> CacheResult<bool> {
        self.fail("PING").await
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}
