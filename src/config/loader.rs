//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles file discovery,
//! environment detection, and layering of overrides.

use super::error::{ConfigResult, ConfigurationError};
use super::GoaltrackConfig;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Base name of configuration files inside the config directory
const CONFIG_FILE_STEM: &str = "goaltrack";

/// Prefix for environment variable overrides (`GOALTRACK__CACHE__VERSION=2`)
const ENV_PREFIX: &str = "GOALTRACK";
const ENV_SEPARATOR: &str = "__";

/// Loaded configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: GoaltrackConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    ///
    /// Useful for testing without modifying global environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            environment = environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let config = Self::build(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = environment,
            cache_enabled = config.cache.enabled,
            cache_backend = %config.cache.backend,
            key_prefix = %config.cache.key_prefix(),
            bind_address = %config.web.bind_address,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    fn build(config_directory: &Path, environment: &str) -> ConfigResult<GoaltrackConfig> {
        let base_file = config_directory.join(format!("{CONFIG_FILE_STEM}.toml"));
        let env_file = config_directory.join(format!("{CONFIG_FILE_STEM}.{environment}.toml"));

        let mut builder = config::Config::builder()
            .add_source(config::File::from(base_file).required(false))
            .add_source(config::File::from(env_file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );

        // Conventional REDIS_URL, unless the namespaced variable is set
        if env::var(format!("{ENV_PREFIX}__CACHE__REDIS__URL")).is_err() {
            if let Ok(url) = env::var("REDIS_URL") {
                builder = builder
                    .set_override("cache.redis.url", url)
                    .map_err(|e| ConfigurationError::load_error(environment, e))?;
            }
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize::<GoaltrackConfig>())
            .map_err(|e| ConfigurationError::load_error(environment, e))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &GoaltrackConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the configuration directory
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("GOALTRACK_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let manager =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
                .unwrap();

        assert_eq!(manager.environment(), "test");
        assert_eq!(manager.config().cache.namespace, "goaltrack");
        assert_eq!(manager.config().cache.version, 1);
        assert_eq!(manager.config().cache.ttl.dashboard_seconds, 300);
    }

    #[test]
    fn test_environment_file_overrides_base_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("goaltrack.toml"),
            r#"
[cache]
backend = "memory"
version = 2

[cache.ttl]
goals_list_seconds = 120
"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("goaltrack.production.toml"),
            r#"
[cache]
version = 3

[web]
bind_address = "127.0.0.1:9000"
"#,
        )
        .unwrap();

        let manager = ConfigManager::load_from_directory_with_env(
            Some(dir.path().to_path_buf()),
            "production",
        )
        .unwrap();
        let config = manager.config();

        assert_eq!(config.cache.backend, "memory");
        assert_eq!(config.cache.version, 3);
        assert_eq!(config.cache.ttl.goals_list_seconds, 120);
        // Untouched fields keep their defaults
        assert_eq!(config.cache.ttl.user_profile_seconds, 1800);
        assert_eq!(config.web.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("goaltrack.toml"),
            "[cache]\nnamespace = \"bad*ns\"\n",
        )
        .unwrap();

        let result =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test");
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("goaltrack.toml"), "[cache\nversion = ").unwrap();

        let result =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test");
        assert!(matches!(result, Err(ConfigurationError::LoadError { .. })));
    }
}
