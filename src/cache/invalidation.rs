//! Write-path invalidation
//!
//! Called after the store has committed a write. Deletes the entity keys the
//! write touched, then drains the acting user's registry so every list and
//! query result cached for that user is recomputed on the next read.
//! Failures are logged and swallowed: a missed delete heals when the TTL
//! runs out.

use super::layer::CacheLayer;
use crate::logging::log_cache_degradation;
use tracing::debug;

/// Outcome of one invalidation, for logs and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    pub entity_keys_deleted: u64,
    pub registry_keys_deleted: u64,
    pub failures: u32,
}

impl InvalidationReport {
    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }
}

impl CacheLayer {
    /// Delete `entity_keys` and invalidate the registry of `user_id`
    pub async fn invalidate(&self, user_id: &str, entity_keys: &[String]) -> InvalidationReport {
        let mut report = InvalidationReport::default();

        match self.client().delete(entity_keys).await {
            Ok(deleted) => report.entity_keys_deleted = deleted,
            Err(e) => {
                report.failures += 1;
                log_cache_degradation("delete", &entity_keys.join(","), &e);
            }
        }

        match self.client().invalidate_user(user_id).await {
            Ok(deleted) => report.registry_keys_deleted = deleted,
            Err(e) => {
                report.failures += 1;
                log_cache_degradation("invalidate_user", user_id, &e);
            }
        }

        debug!(
            user_id = %user_id,
            entity_keys = ?entity_keys,
            entity_keys_deleted = report.entity_keys_deleted,
            registry_keys_deleted = report.registry_keys_deleted,
            failures = report.failures,
            "Cache invalidated"
        );
        report
    }
}
