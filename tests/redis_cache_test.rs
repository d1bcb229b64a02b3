//! # Redis backend tests
//!
//! Need a live Redis at `REDIS_URL` (default `redis://127.0.0.1:6379`):
//!
//! ```bash
//! cargo test --features test-services --test redis_cache_test
//! ```
//!
//! Each test uses its own namespace, and skips when Redis is unreachable.

#![cfg(feature = "test-services")]

mod common;

use std::time::Duration;

use common::TestContext;
use goaltrack_core::cache::keys::goals_list_key;
use goaltrack_core::cache::{CacheClient, CacheStatus, ConnectionState};
use goaltrack_core::config::{CacheConfig, RedisConfig};
use goaltrack_core::models::{GoalListParams, GoalUpdate};

fn redis_config(version: u32, namespace: &str) -> CacheConfig {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    CacheConfig {
        backend: "redis".to_string(),
        namespace: namespace.to_string(),
        version,
        redis: Some(RedisConfig {
            url,
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn unique_namespace() -> String {
    format!("goaltrack-test-{}", uuid::Uuid::new_v4().simple())
}

async fn connect(config: &CacheConfig) -> Option<CacheClient> {
    let client = CacheClient::from_config_graceful(config).await;
    if client.provider_name() != "redis" || !client.health_check().await {
        println!("Redis unavailable, skipping");
        return None;
    }
    Some(client)
}

#[tokio::test]
async fn test_read_through_and_invalidation_against_redis() {
    let config = redis_config(1, &unique_namespace());
    let Some(client) = connect(&config).await else {
        return;
    };
    assert_eq!(client.connection_state(), Some(ConnectionState::Connected));

    let ctx = TestContext::with_client(client);
    ctx.seed_goal("g1", "u1", "Run", 0).await;
    let params = GoalListParams::default();

    assert_eq!(ctx.services.goals.list("u1", &params).await.unwrap().status, CacheStatus::Miss);
    assert_eq!(ctx.services.goals.list("u1", &params).await.unwrap().status, CacheStatus::Hit);

    ctx.services
        .goals
        .update(
            "u1",
            "g1",
            GoalUpdate {
                title: Some("Run more".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let listed = ctx.services.goals.list("u1", &params).await.unwrap();
    assert_eq!(listed.status, CacheStatus::Miss);
    assert_eq!(listed.value.items[0].title, "Run more");

    assert_eq!(ctx.cache.invalidate_user("u1").await.unwrap(), 2);
    ctx.cache.shutdown();
}

#[tokio::test]
async fn test_version_bump_purges_previous_generations() {
    let namespace = unique_namespace();
    let key = goals_list_key("u1", &GoalListParams::default());
    for version in [1, 20_260_100, 20_260_102] {
        let writer_config = CacheConfig {
            purge_previous_versions: false,
            ..redis_config(version, &namespace)
        };
        let Some(writer) = connect(&writer_config).await else {
            return;
        };
        writer.set(&key, "[]", Duration::from_secs(60)).await.unwrap();
        writer.shutdown();
    }

    // Date-style versions cost one sweep, not one per skipped generation
    let current = redis_config(20_260_101, &namespace);
    let Some(client) = connect(&current).await else {
        return;
    };
    assert_eq!(client.get(&key).await.unwrap(), None);

    let config = current.clone();
    let purged = client
        .scan_and_purge(&current.generation_sweep_pattern(), move |key| {
            config.is_previous_generation(key)
        })
        .await
        .unwrap();
    // The startup sweep may have already removed some of them
    assert!(purged <= 2);

    for (version, expected) in [(1, None), (20_260_100, None), (20_260_102, Some("[]"))] {
        let reader_config = CacheConfig {
            purge_previous_versions: false,
            ..redis_config(version, &namespace)
        };
        let Some(reader) = connect(&reader_config).await else {
            return;
        };
        assert_eq!(reader.get(&key).await.unwrap().as_deref(), expected);
        reader.shutdown();
    }
    client.shutdown();
}
