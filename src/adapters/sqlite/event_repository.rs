//! SQLite implementation of the GoalTrackEventRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{parse_date_key, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::GoalTrackEvent;
use crate::domain::ports::{EventFilter, GoalTrackEventRepository};

const EVENT_COLUMNS: &str = "id, goal_track_id, todo_id, todo_text, date_key, created_at";

#[derive(Clone)]
pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Append the filter's conditions to `query`, returning the values to bind in order.
fn filter_clause(query: &mut String, filter: &EventFilter) -> Vec<String> {
    let mut bindings = Vec::new();
    query.push_str(" WHERE 1=1");
    if let Some(goal_track_id) = &filter.goal_track_id {
        query.push_str(" AND goal_track_id = ?");
        bindings.push(goal_track_id.clone());
    }
    if let Some(todo_id) = &filter.todo_id {
        query.push_str(" AND todo_id = ?");
        bindings.push(todo_id.clone());
    }
    if let Some(since) = filter.since {
        query.push_str(" AND date_key >= ?");
        bindings.push(since.to_string());
    }
    if let Some(until) = filter.until {
        query.push_str(" AND date_key <= ?");
        bindings.push(until.to_string());
    }
    bindings
}

#[async_trait]
impl GoalTrackEventRepository for SqliteEventRepository {
    async fn upsert(&self, event: &GoalTrackEvent) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO goal_track_events (id, goal_track_id, todo_id, todo_text, date_key, created_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET todo_text = excluded.todo_text, created_at = excluded.created_at"#
        )
        .bind(&event.id)
        .bind(&event.goal_track_id)
        .bind(&event.todo_id)
        .bind(&event.todo_text)
        .bind(event.date_key.to_string())
        .bind(event.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<GoalTrackEvent>> {
        let row: Option<EventRow> = sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM goal_track_events WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn delete(&self, id: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM goal_track_events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: EventFilter) -> DomainResult<Vec<GoalTrackEvent>> {
        let mut query = format!("SELECT {EVENT_COLUMNS} FROM goal_track_events");
        let bindings = filter_clause(&mut query, &filter);
        query.push_str(" ORDER BY date_key DESC, created_at DESC");

        let mut q = sqlx::query_as::<_, EventRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }
        let rows: Vec<EventRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn find_ids(&self, filter: EventFilter, limit: usize) -> DomainResult<Vec<String>> {
        let limit = i64::try_from(limit).map_err(|_| DomainError::ValidationFailed(format!("Limit too large: {limit}")))?;
        let mut query = String::from("SELECT id FROM goal_track_events");
        let bindings = filter_clause(&mut query, &filter);
        query.push_str(" ORDER BY id LIMIT ?");

        let mut q = sqlx::query_as::<_, (String,)>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }
        let rows = q.bind(limit).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn delete_many(&self, ids: &[String]) -> DomainResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!("DELETE FROM goal_track_events WHERE id IN ({placeholders})");

        let mut tx = self.pool.begin().await?;
        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(id);
        }
        let result = q.execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    goal_track_id: String,
    todo_id: String,
    todo_text: String,
    date_key: String,
    created_at: String,
}

impl TryFrom<EventRow> for GoalTrackEvent {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(GoalTrackEvent {
            id: row.id,
            goal_track_id: row.goal_track_id,
            todo_id: row.todo_id,
            todo_text: row.todo_text,
            date_key: parse_date_key(&row.date_key)?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use chrono::Utc;

    async fn setup() -> SqliteEventRepository {
        SqliteEventRepository::new(create_migrated_test_pool().await.unwrap())
    }

    fn event(goal: &str, todo: &str, day: &str) -> GoalTrackEvent {
        GoalTrackEvent::new(goal, todo, "Run 5k", day.parse().unwrap(), Utc::now())
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let repo = setup().await;
        let mut first = event("g1", "t1", "2024-02-01");
        repo.upsert(&first).await.unwrap();
        first.todo_text = "Run 6k".to_string();
        repo.upsert(&first).await.unwrap();

        let all = repo.list(EventFilter::new()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].todo_text, "Run 6k");
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let repo = setup().await;
        for (goal, todo, day) in [
            ("g1", "t1", "2024-02-01"),
            ("g1", "t1", "2024-02-03"),
            ("g1", "t2", "2024-02-02"),
            ("g2", "t3", "2024-02-02"),
        ] {
            repo.upsert(&event(goal, todo, day)).await.unwrap();
        }

        let filter = EventFilter::new()
            .goal_track("g1")
            .since("2024-02-02".parse().unwrap());
        let days: Vec<String> = repo
            .list(filter)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.date_key.to_string())
            .collect();
        assert_eq!(days, vec!["2024-02-03", "2024-02-02"]);
    }

    #[tokio::test]
    async fn test_find_ids_and_delete_many() {
        let repo = setup().await;
        for day in ["2024-02-01", "2024-02-02", "2024-02-03"] {
            repo.upsert(&event("g1", "t1", day)).await.unwrap();
        }

        let ids = repo.find_ids(EventFilter::new().todo("t1"), 2).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(repo.delete_many(&ids).await.unwrap(), 2);
        assert_eq!(repo.delete_many(&[]).await.unwrap(), 0);
        assert!(!repo.delete("missing").await.unwrap());
        assert_eq!(repo.list(EventFilter::new()).await.unwrap().len(), 1);
    }
}
