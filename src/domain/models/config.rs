use serde::{Deserialize, Serialize};

/// Main configuration structure for habit-rhythm
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Home timezone as a UTC offset in minutes (540 = UTC+9)
    #[serde(default = "default_home_utc_offset_minutes")]
    pub home_utc_offset_minutes: i32,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Event ledger configuration
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Routine streak configuration
    #[serde(default)]
    pub routine: RoutineConfig,

    /// Weekly coach configuration
    #[serde(default)]
    pub coach: CoachConfig,

    /// Text-rewrite oracle configuration
    #[serde(default)]
    pub oracle: OracleConfig,
}

const fn default_home_utc_offset_minutes() -> i32 {
    540
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_utc_offset_minutes: default_home_utc_offset_minutes(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            ledger: LedgerConfig::default(),
            routine: RoutineConfig::default(),
            coach: CoachConfig::default(),
            oracle: OracleConfig::default(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".habit-rhythm/habit-rhythm.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

const fn default_retention_days() -> u32 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            retention_days: default_retention_days(),
        }
    }
}

/// Event ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LedgerConfig {
    /// Maximum events removed per commit during cascade deletes
    #[serde(default = "default_delete_batch_size")]
    pub delete_batch_size: usize,
}

const fn default_delete_batch_size() -> usize {
    450
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            delete_batch_size: default_delete_batch_size(),
        }
    }
}

/// Routine streak configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RoutineConfig {
    /// Largest day gap between completions that keeps a streak
    #[serde(default = "default_grace_days")]
    pub grace_days: u32,
}

const fn default_grace_days() -> u32 {
    crate::domain::models::routine::DEFAULT_GRACE_DAYS
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            grace_days: default_grace_days(),
        }
    }
}

/// Weekly coach configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CoachConfig {
    /// Actions shorter than this get a "Today, " prefix
    #[serde(default = "default_min_action_chars")]
    pub min_action_chars: usize,

    /// Actions longer than this are cut and end with an ellipsis
    #[serde(default = "default_max_action_chars")]
    pub max_action_chars: usize,

    /// Action used when the user gave none
    #[serde(default = "default_action")]
    pub default_action: String,
}

const fn default_min_action_chars() -> usize {
    20
}

const fn default_max_action_chars() -> usize {
    80
}

fn default_action() -> String {
    "do one action today".to_string()
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            min_action_chars: default_min_action_chars(),
            max_action_chars: default_max_action_chars(),
            default_action: default_action(),
        }
    }
}

/// Text-rewrite oracle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OracleConfig {
    /// Whether rewrite suggestions are requested at all
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the rewrite endpoint
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,

    /// Model name forwarded to the endpoint
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// API key. Falls back to `HABIT_RHYTHM_ORACLE_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_oracle_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_oracle_base_url() -> String {
    "http://localhost:8787/v1".to_string()
}

fn default_oracle_model() -> String {
    "rewrite-small".to_string()
}

const fn default_oracle_timeout_secs() -> u64 {
    20
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_oracle_base_url(),
            model: default_oracle_model(),
            api_key: None,
            timeout_secs: default_oracle_timeout_secs(),
        }
    }
}
