//! Weekly review repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DateKey, GoalTrackWeeklyReview};

/// Repository interface for weekly review persistence.
#[async_trait]
pub trait WeeklyReviewRepository: Send + Sync {
    /// Insert or replace the review with the same id.
    async fn upsert(&self, review: &GoalTrackWeeklyReview) -> DomainResult<()>;

    /// Get the review of one goal track for one week.
    async fn get(&self, goal_track_id: &str, week_start_key: DateKey) -> DomainResult<Option<GoalTrackWeeklyReview>>;

    /// Reviews of one goal track, most recent week first.
    async fn list_for_goal_track(&self, goal_track_id: &str, limit: usize) -> DomainResult<Vec<GoalTrackWeeklyReview>>;

    /// Delete every review of a goal track. Returns the rows removed.
    async fn delete_for_goal_track(&self, goal_track_id: &str) -> DomainResult<u64>;
}
