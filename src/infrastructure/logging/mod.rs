//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - Rolling file output via tracing-appender
//! - Retention cleanup of old log files
pub mod config;
pub mod logger;
pub mod retention;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use retention::{cleanup_old_logs, spawn_periodic_cleanup};
