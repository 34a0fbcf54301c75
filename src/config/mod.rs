//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `TRAUMA_ENGINE` prefix
//! and nested values are separated by double underscores. Every section
//! has defaults, so an empty environment yields a working in-memory setup.
//!
//! # Example
//!
//! ```no_run
//! use trauma_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod engine;
mod error;
mod logging;
mod redis;
mod storage;

pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use redis::RedisConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Engine configuration (key prefix, seed, enabled vectors)
    #[serde(default)]
    pub engine: EngineConfig,

    /// Session storage backend selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Redis connection, used by the redis backend
    #[serde(default)]
    pub redis: RedisConfig,

    /// Tracing subscriber settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `TRAUMA_ENGINE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `TRAUMA_ENGINE__STORAGE__BACKEND=file` -> `storage.backend = file`
    /// - `TRAUMA_ENGINE__ENGINE__SEED=7` -> `engine.seed = 7`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRAUMA_ENGINE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Redis settings are only checked when the redis backend is selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.storage.validate()?;
        if self.storage.backend == StorageBackend::Redis {
            self.redis.validate()?;
        }
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "TRAUMA_ENGINE__ENGINE__KEY_PREFIX",
        "TRAUMA_ENGINE__ENGINE__SEED",
        "TRAUMA_ENGINE__ENGINE__VECTORS",
        "TRAUMA_ENGINE__STORAGE__BACKEND",
        "TRAUMA_ENGINE__STORAGE__FILE_PATH",
        "TRAUMA_ENGINE__REDIS__URL",
        "TRAUMA_ENGINE__LOGGING__JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.engine.key_prefix, "trauma_engine");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.logging.filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nested_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("TRAUMA_ENGINE__ENGINE__KEY_PREFIX", "clinic");
        env::set_var("TRAUMA_ENGINE__ENGINE__SEED", "7");
        env::set_var("TRAUMA_ENGINE__STORAGE__BACKEND", "file");
        env::set_var("TRAUMA_ENGINE__STORAGE__FILE_PATH", "/tmp/te.json");
        env::set_var("TRAUMA_ENGINE__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.engine.key_prefix, "clinic");
        assert_eq!(config.engine.seed, Some(7));
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.file_path.to_str(), Some("/tmp/te.json"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_redis_checked_only_for_redis_backend() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("TRAUMA_ENGINE__REDIS__URL", "http://not-redis");
        let memory = AppConfig::load().unwrap();
        env::set_var("TRAUMA_ENGINE__STORAGE__BACKEND", "redis");
        let redis = AppConfig::load().unwrap();
        clear_env();

        assert!(memory.validate().is_ok());
        assert!(matches!(
            redis.validate(),
            Err(ValidationError::InvalidRedisUrl)
        ));
    }

    #[test]
    fn test_unknown_vector_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("TRAUMA_ENGINE__ENGINE__VECTORS", "visual,tactile");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(
            result.unwrap().validate(),
            Err(ValidationError::UnknownVector(_))
        ));
    }
}
