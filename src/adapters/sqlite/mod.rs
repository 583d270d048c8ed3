//! SQLite adapters for the habit-rhythm store.

pub mod connection;
pub mod event_repository;
pub mod migrations;
pub mod routine_repository;
pub mod weekly_review_repository;

pub use connection::{create_pool, create_test_pool, database_url, verify_connection, ConnectionError, PoolConfig};
pub use event_repository::SqliteEventRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use routine_repository::SqliteRoutineRepository;
pub use weekly_review_repository::SqliteWeeklyReviewRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DatabaseConfig, DateKey};

/// Parse a `YYYY-MM-DD` key from a SQLite row field.
pub fn parse_date_key(s: &str) -> DomainResult<DateKey> {
    s.parse().map_err(|_| DomainError::SerializationError(format!("Invalid date key: {s}")))
}

/// Parse an optional `YYYY-MM-DD` key from a SQLite row field.
pub fn parse_optional_date_key(s: Option<String>) -> DomainResult<Option<DateKey>> {
    s.as_deref().map(parse_date_key).transpose()
}

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a JSON string from a SQLite row field, falling back to the type's default.
pub fn parse_json_or_default<T: serde::de::DeserializeOwned + Default>(s: Option<String>) -> DomainResult<T> {
    s.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|opt| opt.unwrap_or_default())
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(&database_url(&config.path), Some(PoolConfig::from(config))).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
