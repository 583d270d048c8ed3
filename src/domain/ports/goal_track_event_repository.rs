//! Goal-track event repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DateKey, GoalTrackEvent};

/// Filter criteria for reading or sweeping events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub goal_track_id: Option<String>,
    pub todo_id: Option<String>,
    /// Inclusive lower bound on `date_key`
    pub since: Option<DateKey>,
    /// Inclusive upper bound on `date_key`
    pub until: Option<DateKey>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goal_track(mut self, goal_track_id: impl Into<String>) -> Self {
        self.goal_track_id = Some(goal_track_id.into());
        self
    }

    pub fn todo(mut self, todo_id: impl Into<String>) -> Self {
        self.todo_id = Some(todo_id.into());
        self
    }

    pub fn since(mut self, key: DateKey) -> Self {
        self.since = Some(key);
        self
    }

    pub fn until(mut self, key: DateKey) -> Self {
        self.until = Some(key);
        self
    }

    /// Whether an event satisfies every set criterion.
    pub fn matches(&self, event: &GoalTrackEvent) -> bool {
        self.goal_track_id.as_ref().is_none_or(|g| *g == event.goal_track_id)
            && self.todo_id.as_ref().is_none_or(|t| *t == event.todo_id)
            && self.since.is_none_or(|s| event.date_key >= s)
            && self.until.is_none_or(|u| event.date_key <= u)
    }
}

/// Repository interface for event persistence.
///
/// Writes are keyed by the event's deterministic id, so every method is
/// safe to retry.
#[async_trait]
pub trait GoalTrackEventRepository: Send + Sync {
    /// Insert or replace the event with the same id.
    async fn upsert(&self, event: &GoalTrackEvent) -> DomainResult<()>;

    /// Get an event by id.
    async fn get(&self, id: &str) -> DomainResult<Option<GoalTrackEvent>>;

    /// Delete an event by id. Returns whether a row was removed; a missing
    /// id is not an error.
    async fn delete(&self, id: &str) -> DomainResult<bool>;

    /// List matching events, newest day first.
    async fn list(&self, filter: EventFilter) -> DomainResult<Vec<GoalTrackEvent>>;

    /// Ids of at most `limit` matching events.
    async fn find_ids(&self, filter: EventFilter, limit: usize) -> DomainResult<Vec<String>>;

    /// Delete the given ids in a single commit. Returns the rows removed.
    async fn delete_many(&self, ids: &[String]) -> DomainResult<u64>;
}
