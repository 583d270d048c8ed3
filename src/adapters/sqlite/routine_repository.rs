//! SQLite implementation of the RoutineRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::BTreeSet;

use super::{parse_datetime, parse_json_or_default, parse_optional_date_key};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DateKey, RoutineItem, RoutineTask};
use crate::domain::ports::RoutineRepository;

const ROUTINE_COLUMNS: &str = "id, title, tasks, streak, total_completed_days, monthly_success_rate, \
    last_completed_date, last_reset_date, completion_history, version, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteRoutineRepository {
    pool: SqlitePool,
}

impl SqliteRoutineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &str) -> DomainResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM routines WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

fn version_to_db(version: u64) -> DomainResult<i64> {
    i64::try_from(version).map_err(|_| DomainError::SerializationError(format!("Version out of range: {version}")))
}

#[async_trait]
impl RoutineRepository for SqliteRoutineRepository {
    async fn create(&self, routine: &RoutineItem) -> DomainResult<()> {
        let tasks_json = serde_json::to_string(&routine.tasks)?;
        let history_json = serde_json::to_string(&routine.completion_history)?;

        sqlx::query(
            r#"INSERT INTO routines (id, title, tasks, streak, total_completed_days, monthly_success_rate,
               last_completed_date, last_reset_date, completion_history, version, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(&routine.id)
        .bind(&routine.title)
        .bind(&tasks_json)
        .bind(i64::from(routine.streak))
        .bind(i64::from(routine.total_completed_days))
        .bind(i64::from(routine.monthly_success_rate))
        .bind(routine.last_completed_date.map(|d| d.to_string()))
        .bind(routine.last_reset_date.map(|d| d.to_string()))
        .bind(&history_json)
        .bind(version_to_db(routine.version)?)
        .bind(routine.created_at.to_rfc3339())
        .bind(routine.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<RoutineItem>> {
        let row: Option<RoutineRow> = sqlx::query_as(&format!("SELECT {ROUTINE_COLUMNS} FROM routines WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn update(&self, routine: &RoutineItem, expected_version: u64) -> DomainResult<()> {
        let tasks_json = serde_json::to_string(&routine.tasks)?;
        let history_json = serde_json::to_string(&routine.completion_history)?;
        let expected = version_to_db(expected_version)?;

        let result = sqlx::query(
            r#"UPDATE routines SET title = ?, tasks = ?, streak = ?, total_completed_days = ?,
               monthly_success_rate = ?, last_completed_date = ?, last_reset_date = ?,
               completion_history = ?, version = version + 1, updated_at = ?
               WHERE id = ? AND version = ?"#
        )
        .bind(&routine.title)
        .bind(&tasks_json)
        .bind(i64::from(routine.streak))
        .bind(i64::from(routine.total_completed_days))
        .bind(i64::from(routine.monthly_success_rate))
        .bind(routine.last_completed_date.map(|d| d.to_string()))
        .bind(routine.last_reset_date.map(|d| d.to_string()))
        .bind(&history_json)
        .bind(routine.updated_at.to_rfc3339())
        .bind(&routine.id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            if self.exists(&routine.id).await? {
                return Err(DomainError::ConcurrencyConflict {
                    entity: "routine".to_string(),
                    id: routine.id.clone(),
                });
            }
            return Err(DomainError::RoutineNotFound(routine.id.clone()));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM routines WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::RoutineNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<RoutineItem>> {
        let rows: Vec<RoutineRow> = sqlx::query_as(&format!("SELECT {ROUTINE_COLUMNS} FROM routines ORDER BY created_at"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct RoutineRow {
    id: String,
    title: String,
    tasks: Option<String>,
    streak: i64,
    total_completed_days: i64,
    monthly_success_rate: i64,
    last_completed_date: Option<String>,
    last_reset_date: Option<String>,
    completion_history: Option<String>,
    version: i64,
    created_at: String,
    updated_at: String,
}

fn counter(value: i64, column: &str) -> DomainResult<u32> {
    u32::try_from(value).map_err(|_| DomainError::SerializationError(format!("Invalid {column}: {value}")))
}

impl TryFrom<RoutineRow> for RoutineItem {
    type Error = DomainError;

    fn try_from(row: RoutineRow) -> Result<Self, Self::Error> {
        let tasks: Vec<RoutineTask> = parse_json_or_default(row.tasks)?;
        let completion_history: BTreeSet<DateKey> = parse_json_or_default(row.completion_history)?;

        Ok(RoutineItem {
            id: row.id,
            title: row.title,
            tasks,
            streak: counter(row.streak, "streak")?,
            total_completed_days: counter(row.total_completed_days, "total_completed_days")?,
            monthly_success_rate: counter(row.monthly_success_rate, "monthly_success_rate")?,
            last_completed_date: parse_optional_date_key(row.last_completed_date)?,
            last_reset_date: parse_optional_date_key(row.last_reset_date)?,
            completion_history,
            version: u64::try_from(row.version)
                .map_err(|_| DomainError::SerializationError(format!("Invalid version: {}", row.version)))?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup() -> SqliteRoutineRepository {
        SqliteRoutineRepository::new(create_migrated_test_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_roundtrip_keeps_history() {
        let repo = setup().await;
        let mut routine = RoutineItem::new("Morning").with_task("Stretch");
        routine.completion_history.insert("2024-01-01".parse().unwrap());
        routine.last_completed_date = Some("2024-01-01".parse().unwrap());
        repo.create(&routine).await.unwrap();

        let loaded = repo.get(&routine.id).await.unwrap().unwrap();
        assert_eq!(loaded.tasks, routine.tasks);
        assert_eq!(loaded.completion_history, routine.completion_history);
        assert_eq!(loaded.last_completed_date, routine.last_completed_date);
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let repo = setup().await;
        let mut routine = RoutineItem::new("Evening").with_task("Journal");
        repo.create(&routine).await.unwrap();

        routine.streak = 1;
        repo.update(&routine, 1).await.unwrap();
        assert_eq!(repo.get(&routine.id).await.unwrap().unwrap().version, 2);

        let err = repo.update(&routine, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));

        let ghost = RoutineItem::new("Ghost");
        let err = repo.update(&ghost, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::RoutineNotFound(_)));
    }
}
