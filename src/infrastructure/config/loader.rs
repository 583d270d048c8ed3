use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Directory holding the project-local configuration files
pub const CONFIG_DIR: &str = ".habit-rhythm";
pub const ENV_PREFIX: &str = "HABIT_RHYTHM_";

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid home_utc_offset_minutes: {0}. Must be within ±840")]
    InvalidUtcOffset(i32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid delete_batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    #[error("Invalid coach action bounds: min {0}, max {1}. Max must exceed min and be at least 2")]
    InvalidActionBounds(usize, usize),

    #[error("Invalid oracle timeout_secs: {0}. Must be at least 1")]
    InvalidOracleTimeout(u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .habit-rhythm/config.yaml
    /// 3. .habit-rhythm/local.yaml (optional overrides)
    /// 4. Environment variables (HABIT_RHYTHM_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`Self::load`], resolving the config directory under `root`.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.home_utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::InvalidUtcOffset(config.home_utc_offset_minutes));
        }

        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.ledger.delete_batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(config.ledger.delete_batch_size));
        }

        let coach = &config.coach;
        if coach.max_action_chars < 2 || coach.max_action_chars <= coach.min_action_chars {
            return Err(ConfigError::InvalidActionBounds(coach.min_action_chars, coach.max_action_chars));
        }
        if coach.default_action.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("coach.default_action cannot be empty".to_string()));
        }

        if config.oracle.enabled && config.oracle.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "oracle.base_url is required when the oracle is enabled".to_string(),
            ));
        }
        if config.oracle.timeout_secs == 0 {
            return Err(ConfigError::InvalidOracleTimeout(config.oracle.timeout_secs));
        }

        Ok(())
    }
}
