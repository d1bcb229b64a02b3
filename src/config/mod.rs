//! # Goaltrack Configuration System
//!
//! Layered configuration: serde defaults, then `config/goaltrack.toml`, then
//! `config/goaltrack.{environment}.toml`, then `GOALTRACK__*` environment
//! variables. See [`loader::ConfigManager`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use goaltrack_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let ttl = manager.config().cache.ttl.goals_list();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::cache::connection::ReconnectPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/goaltrack.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GoaltrackConfig {
    /// Cache backend, key space and TTLs
    pub cache: CacheConfig,

    /// HTTP server settings
    pub web: WebConfig,
}

impl GoaltrackConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.cache.validate()?;
        self.web.validate()
    }
}

/// Caching configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// `redis` / `dragonfly`, `memory`; anything else disables caching
    pub backend: String,
    /// First segment of every physical key
    pub namespace: String,
    /// Key generation; bumping it orphans every key of older generations
    pub version: u32,
    /// Sweep keys of older generations in the background at startup
    pub purge_previous_versions: bool,
    /// Ceiling for bulk deletes and registry drains
    pub delete_timeout_ms: u64,
    /// Entry bound of the in-process backend
    pub memory_max_capacity: u64,
    pub redis: Option<RedisConfig>,
    pub ttl: CacheTtlConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "redis".to_string(),
            namespace: "goaltrack".to_string(),
            version: 1,
            purge_previous_versions: true,
            delete_timeout_ms: 2000,
            memory_max_capacity: 10_000,
            redis: Some(RedisConfig::default()),
            ttl: CacheTtlConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn delete_timeout(&self) -> Duration {
        Duration::from_millis(self.delete_timeout_ms)
    }

    /// Physical key prefix for the current generation, e.g. `goaltrack:v1:`
    pub fn key_prefix(&self) -> String {
        generation_prefix(&self.namespace, self.version)
    }

    /// One glob covering every generation of this namespace
    pub fn generation_sweep_pattern(&self) -> String {
        format!("{}:v*", self.namespace)
    }

    /// True when `key` belongs to a generation older than the current one
    ///
    /// Keys of the current or a newer generation, and keys whose version
    /// segment is not a number, are never matched.
    pub fn is_previous_generation(&self, key: &str) -> bool {
        key.strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix(":v"))
            .and_then(|rest| rest.split_once(':'))
            .and_then(|(version, _)| version.parse::<u32>().ok())
            .is_some_and(|version| version < self.version)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.namespace.is_empty()
            || self
                .namespace
                .chars()
                .any(|c| matches!(c, '*' | '?' | '[' | ']' | ':') || c.is_whitespace())
        {
            return Err(ConfigurationError::invalid_value(
                "cache.namespace",
                &self.namespace,
                "namespace must be non-empty and free of glob characters, ':' and whitespace",
            ));
        }

        if self.version == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.version",
                self.version,
                "version starts at 1",
            ));
        }

        if self.delete_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.delete_timeout_ms",
                self.delete_timeout_ms,
                "delete timeout must be greater than 0",
            ));
        }

        if self.memory_max_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.memory_max_capacity",
                self.memory_max_capacity,
                "in-memory cache capacity must be greater than 0",
            ));
        }

        if let Some(redis) = &self.redis {
            redis.validate()?;
        }

        self.ttl.validate()
    }
}

fn generation_prefix(namespace: &str, version: u32) -> String {
    format!("{namespace}:v{version}:")
}

/// Redis (or Dragonfly) connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub connect_timeout_ms: u64,
    pub command_timeout_ms: u64,
    pub reconnect_base_delay_seconds: u64,
    pub reconnect_max_delay_seconds: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connect_timeout_ms: 2000,
            command_timeout_ms: 500,
            reconnect_base_delay_seconds: 5,
            reconnect_max_delay_seconds: 30,
        }
    }
}

impl RedisConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            Duration::from_secs(self.reconnect_base_delay_seconds),
            Duration::from_secs(self.reconnect_max_delay_seconds),
        )
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.url.is_empty() {
            return Err(ConfigurationError::invalid_value(
                "cache.redis.url",
                "",
                "Redis URL must not be empty",
            ));
        }
        if self.connect_timeout_ms == 0 || self.command_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.redis.command_timeout_ms",
                self.command_timeout_ms.min(self.connect_timeout_ms),
                "Redis timeouts must be greater than 0",
            ));
        }
        if self.reconnect_base_delay_seconds == 0
            || self.reconnect_max_delay_seconds < self.reconnect_base_delay_seconds
        {
            return Err(ConfigurationError::invalid_value(
                "cache.redis.reconnect_max_delay_seconds",
                self.reconnect_max_delay_seconds,
                "reconnect base delay must be > 0 and not exceed the max delay",
            ));
        }
        Ok(())
    }
}

/// Per-endpoint cache TTLs
///
/// Profile data changes least and lives longest; dashboard analytics are the
/// most volatile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheTtlConfig {
    pub user_profile_seconds: u64,
    pub goal_seconds: u64,
    pub goals_list_seconds: u64,
    pub subtask_seconds: u64,
    pub subtasks_list_seconds: u64,
    pub reward_seconds: u64,
    pub rewards_list_seconds: u64,
    pub dashboard_seconds: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            user_profile_seconds: 1800,
            goal_seconds: 900,
            goals_list_seconds: 600,
            subtask_seconds: 900,
            subtasks_list_seconds: 600,
            reward_seconds: 900,
            rewards_list_seconds: 600,
            dashboard_seconds: 300,
        }
    }
}

impl CacheTtlConfig {
    pub fn user_profile(&self) -> Duration {
        Duration::from_secs(self.user_profile_seconds)
    }

    pub fn goal(&self) -> Duration {
        Duration::from_secs(self.goal_seconds)
    }

    pub fn goals_list(&self) -> Duration {
        Duration::from_secs(self.goals_list_seconds)
    }

    pub fn subtask(&self) -> Duration {
        Duration::from_secs(self.subtask_seconds)
    }

    pub fn subtasks_list(&self) -> Duration {
        Duration::from_secs(self.subtasks_list_seconds)
    }

    pub fn reward(&self) -> Duration {
        Duration::from_secs(self.reward_seconds)
    }

    pub fn rewards_list(&self) -> Duration {
        Duration::from_secs(self.rewards_list_seconds)
    }

    pub fn dashboard(&self) -> Duration {
        Duration::from_secs(self.dashboard_seconds)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let entries = [
            ("cache.ttl.user_profile_seconds", self.user_profile_seconds),
            ("cache.ttl.goal_seconds", self.goal_seconds),
            ("cache.ttl.goals_list_seconds", self.goals_list_seconds),
            ("cache.ttl.subtask_seconds", self.subtask_seconds),
            ("cache.ttl.subtasks_list_seconds", self.subtasks_list_seconds),
            ("cache.ttl.reward_seconds", self.reward_seconds),
            ("cache.ttl.rewards_list_seconds", self.rewards_list_seconds),
            ("cache.ttl.dashboard_seconds", self.dashboard_seconds),
        ];
        for (field, value) in entries {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    field,
                    value,
                    "TTL must be greater than 0",
                ));
            }
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
    pub request_timeout_seconds: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl WebConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigurationError::invalid_value(
                "web.bind_address",
                &self.bind_address,
                "expected host:port",
            ));
        }
        Ok(())
    }
}
