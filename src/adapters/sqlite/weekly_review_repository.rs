//! SQLite implementation of the WeeklyReviewRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{parse_date_key, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DateKey, GoalTrackWeeklyReview, WeeklyStatus};
use crate::domain::ports::WeeklyReviewRepository;

const REVIEW_COLUMNS: &str = "id, goal_track_id, week_start_key, status, block_reason, next_action, \
    coach_fact, coach_pattern, coach_action, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteWeeklyReviewRepository {
    pool: SqlitePool,
}

impl SqliteWeeklyReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeeklyReviewRepository for SqliteWeeklyReviewRepository {
    async fn upsert(&self, review: &GoalTrackWeeklyReview) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO weekly_reviews (id, goal_track_id, week_start_key, status, block_reason, next_action,
               coach_fact, coach_pattern, coach_action, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET status = excluded.status, block_reason = excluded.block_reason,
               next_action = excluded.next_action, coach_fact = excluded.coach_fact,
               coach_pattern = excluded.coach_pattern, coach_action = excluded.coach_action,
               updated_at = excluded.updated_at"#
        )
        .bind(&review.id)
        .bind(&review.goal_track_id)
        .bind(review.week_start_key.to_string())
        .bind(review.status.as_str())
        .bind(&review.block_reason)
        .bind(&review.next_action)
        .bind(&review.coach_fact)
        .bind(&review.coach_pattern)
        .bind(&review.coach_action)
        .bind(review.created_at.to_rfc3339())
        .bind(review.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, goal_track_id: &str, week_start_key: DateKey) -> DomainResult<Option<GoalTrackWeeklyReview>> {
        let row: Option<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM weekly_reviews WHERE goal_track_id = ? AND week_start_key = ?"
        ))
        .bind(goal_track_id)
        .bind(week_start_key.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn list_for_goal_track(&self, goal_track_id: &str, limit: usize) -> DomainResult<Vec<GoalTrackWeeklyReview>> {
        let limit = i64::try_from(limit).map_err(|_| DomainError::ValidationFailed(format!("Limit too large: {limit}")))?;
        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM weekly_reviews WHERE goal_track_id = ? ORDER BY week_start_key DESC LIMIT ?"
        ))
        .bind(goal_track_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn delete_for_goal_track(&self, goal_track_id: &str) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM weekly_reviews WHERE goal_track_id = ?")
            .bind(goal_track_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: String,
    goal_track_id: String,
    week_start_key: String,
    status: String,
    block_reason: Option<String>,
    next_action: Option<String>,
    coach_fact: String,
    coach_pattern: String,
    coach_action: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ReviewRow> for GoalTrackWeeklyReview {
    type Error = DomainError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let status = WeeklyStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid status: {}", row.status)))?;

        Ok(GoalTrackWeeklyReview {
            id: row.id,
            goal_track_id: row.goal_track_id,
            week_start_key: parse_date_key(&row.week_start_key)?,
            status,
            block_reason: row.block_reason,
            next_action: row.next_action,
            coach_fact: row.coach_fact,
            coach_pattern: row.coach_pattern,
            coach_action: row.coach_action,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
