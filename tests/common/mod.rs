//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use goaltrack_core::cache::{CacheClient, CacheLayer};
use goaltrack_core::config::{CacheConfig, CacheTtlConfig};
use goaltrack_core::models::{Goal, GoalStatus};
use goaltrack_core::services::Services;
use goaltrack_core::store::{DocumentStore, InMemoryStore};

/// Services wired to an in-memory store and an in-process cache
pub struct TestContext {
    pub services: Services,
    pub store: InMemoryStore,
    pub cache: Arc<CacheClient>,
}

impl TestContext {
    pub fn memory() -> Self {
        Self::with_client(CacheClient::in_memory(&CacheConfig::default()))
    }

    /// Cache disabled: every read reaches the store
    pub fn uncached() -> Self {
        Self::with_client(CacheClient::noop())
    }

    pub fn with_client(client: CacheClient) -> Self {
        let store = InMemoryStore::new();
        let cache = Arc::new(client);
        let layer = CacheLayer::new(cache.clone(), CacheTtlConfig::default());
        Self {
            services: Services::new(Arc::new(store.clone()), layer),
            store,
            cache,
        }
    }

    /// Store reads since the last call
    pub fn take_reads(&self) -> u64 {
        let reads = self.store.stats().reads();
        self.store.reset_stats();
        reads
    }

    /// Insert a goal with a fixed id straight into the store
    pub async fn seed_goal(&self, id: &str, user_id: &str, title: &str, age_minutes: i64) -> Goal {
        let created = Utc::now() - Duration::minutes(age_minutes);
        self.store
            .create_goal(Goal {
                id: id.to_string(),
                user_id: user_id.to_string(),
                title: title.to_string(),
                description: None,
                status: GoalStatus::Active,
                progress: 0.0,
                due_date: None,
                reward_id: None,
                created_at: created,
                updated_at: created,
            })
            .await
            .expect("seed goal")
    }
}
