//! # Redis reconnect test
//!
//! Kills every normal client connection on the Redis at `REDIS_URL`, so it
//! lives in its own test binary and must not share a server with anything
//! that minds being disconnected:
//!
//! ```bash
//! cargo test --features test-services --test redis_reconnect_test
//! ```

#![cfg(feature = "test-services")]

use std::time::{Duration, Instant};

use goaltrack_core::cache::{CacheClient, CacheError, ConnectionState};
use goaltrack_core::config::{CacheConfig, RedisConfig};

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

async fn kill_other_clients() -> redis::RedisResult<u64> {
    let client = redis::Client::open(redis_url())?;
    let mut conn = client.get_multiplexed_async_connection().await?;
    redis::cmd("CLIENT")
        .arg("KILL")
        .arg("TYPE")
        .arg("normal")
        .arg("SKIPME")
        .arg("yes")
        .query_async::<u64>(&mut conn)
        .await
}

#[tokio::test]
async fn test_client_recovers_after_server_drops_connection() {
    let config = CacheConfig {
        backend: "redis".to_string(),
        namespace: format!("goaltrack-reconnect-{}", uuid::Uuid::new_v4().simple()),
        redis: Some(RedisConfig {
            url: redis_url(),
            reconnect_base_delay_seconds: 1,
            reconnect_max_delay_seconds: 2,
            ..Default::default()
        }),
        ..Default::default()
    };
    let client = CacheClient::from_config_graceful(&config).await;
    if client.connection_state() != Some(ConnectionState::Connected) {
        println!("Redis unavailable, skipping");
        client.shutdown();
        return;
    }
    client.set("goal:g1", "{}", Duration::from_secs(60)).await.unwrap();

    assert!(kill_other_clients().await.unwrap() >= 1);

    // The first command notices the dead socket; later ones fail fast
    let mut saw_unavailable = false;
    for _ in 0..20 {
        if let Err(CacheError::Unavailable(_)) = client.get("goal:g1").await {
            saw_unavailable = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(saw_unavailable, "commands never failed fast after the kill");

    // First retry waits at most base delay plus jitter
    let deadline = Instant::now() + Duration::from_secs(5);
    while client.connection_state() != Some(ConnectionState::Connected) {
        assert!(Instant::now() < deadline, "did not reconnect within the backoff window");
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    client.set("goal:g2", "[]", Duration::from_secs(60)).await.unwrap();
    assert_eq!(client.get("goal:g2").await.unwrap().as_deref(), Some("[]"));
    assert_eq!(client.get("goal:g1").await.unwrap().as_deref(), Some("{}"));

    client.shutdown();
}
