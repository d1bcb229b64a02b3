//! # Structured Logging Module
//!
//! Environment-aware structured logging: pretty console output while
//! developing, JSON lines in production. `RUST_LOG` overrides the
//! environment's default level.

use crate::cache::CacheError;
use crate::config::ConfigManager;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let log_level = get_log_level(&environment);
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let layer = if environment == "production" {
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A host process or test harness may already own the global subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized, keeping it");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            "Structured logging initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log a contained cache failure
///
/// Every place that swallows a `CacheError` reports it here so degradation
/// shows up under one message.
pub fn log_cache_degradation(operation: &str, key: &str, error: &CacheError) {
    tracing::error!(
        operation = %operation,
        key = %key,
        error = %error,
        backend_unavailable = error.is_backend_unavailable(),
        "Cache operation failed, continuing without cache"
    );
}

/// Log a committed store write
pub fn log_write_operation(entity: &str, operation: &str, id: &str, user_id: &str) {
    tracing::info!(
        entity = %entity,
        operation = %operation,
        id = %id,
        user_id = %user_id,
        "Write committed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("staging"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_structured_logging();
        log_cache_degradation("get", "goal:g1", &CacheError::Unavailable("down".into()));
    }
}
