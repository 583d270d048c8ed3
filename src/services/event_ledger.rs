//! Event ledger service.
//!
//! Records goal-linked todo completions as events keyed by
//! `(goal track, todo, day)`. Every write is an upsert or delete by that
//! key, so retried or duplicated toggles never create extra events.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DateKey, GoalTrackEvent, Todo};
use crate::domain::ports::{EventFilter, GoalTrackEventRepository};
use crate::services::calendar::Calendar;
use crate::services::rhythm::RhythmWindow;

/// What a todo toggle did to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerChange {
    Recorded(GoalTrackEvent),
    /// `removed` is zero when nothing was stored
    Revoked { todo_id: String, removed: u64 },
    /// Todo is not goal-linked or `done` did not change
    Unchanged,
}

pub struct EventLedgerService<R: GoalTrackEventRepository> {
    repository: Arc<R>,
    calendar: Calendar,
    batch_size: usize,
}

impl<R: GoalTrackEventRepository> EventLedgerService<R> {
    pub fn new(repository: Arc<R>, calendar: Calendar, batch_size: usize) -> DomainResult<Self> {
        if batch_size == 0 {
            return Err(DomainError::ValidationFailed("Delete batch size must be at least 1".to_string()));
        }
        Ok(Self {
            repository,
            calendar,
            batch_size,
        })
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Insert or replace an event by its id.
    pub async fn upsert_event(&self, event: &GoalTrackEvent) -> DomainResult<()> {
        event.validate().map_err(DomainError::ValidationFailed)?;
        self.repository.upsert(event).await
    }

    /// Delete by id; absent ids are a no-op.
    pub async fn delete_event(&self, event_id: &str) -> DomainResult<bool> {
        self.repository.delete(event_id).await
    }

    /// Record that a goal-linked todo was completed on the day of `now`.
    ///
    /// Returns `None` for todos without a goal track.
    #[instrument(skip(self, todo), fields(todo_id = %todo.id))]
    pub async fn record_completion(&self, todo: &Todo, now: DateTime<Utc>) -> DomainResult<Option<GoalTrackEvent>> {
        let Some(goal_track_id) = todo.goal_track_id.as_deref() else {
            return Ok(None);
        };
        let event = GoalTrackEvent::new(goal_track_id, &todo.id, &todo.text, self.calendar.date_key(now), now);
        self.upsert_event(&event).await?;
        debug!(event_id = %event.id, "recorded completion");
        Ok(Some(event))
    }

    /// Remove the todo's outstanding completion.
    ///
    /// A todo carries a single `done` flag, so at most one completion is
    /// live, but it may have been recorded on any earlier day. Every event
    /// of the todo is swept, including ones left under a goal track it has
    /// since been unlinked from. Returns `None` when the todo is unlinked
    /// and nothing was stored for it.
    #[instrument(skip(self, todo), fields(todo_id = %todo.id))]
    pub async fn revoke_completion(&self, todo: &Todo) -> DomainResult<Option<u64>> {
        let removed = self.delete_all_matching(EventFilter::new().todo(&todo.id)).await?;
        if removed == 0 && todo.goal_track_id.is_none() {
            return Ok(None);
        }
        debug!(removed, "revoked completion");
        Ok(Some(removed))
    }

    /// Reflect a todo's `done` transition in the ledger.
    pub async fn apply_toggle(&self, before: &Todo, after: &Todo, now: DateTime<Utc>) -> DomainResult<LedgerChange> {
        match (before.done, after.done) {
            (false, true) => Ok(self
                .record_completion(after, now)
                .await?
                .map_or(LedgerChange::Unchanged, LedgerChange::Recorded)),
            (true, false) => Ok(self
                .revoke_completion(after)
                .await?
                .map_or(LedgerChange::Unchanged, |removed| LedgerChange::Revoked {
                    todo_id: after.id.clone(),
                    removed,
                })),
            _ => Ok(LedgerChange::Unchanged),
        }
    }

    /// Cascade delete for a removed goal track.
    #[instrument(skip(self))]
    pub async fn delete_events_by_goal_track(&self, goal_track_id: &str) -> DomainResult<u64> {
        self.delete_all_matching(EventFilter::new().goal_track(goal_track_id)).await
    }

    /// Cascade delete for a removed todo.
    #[instrument(skip(self))]
    pub async fn delete_events_by_todo(&self, todo_id: &str) -> DomainResult<u64> {
        self.delete_all_matching(EventFilter::new().todo(todo_id)).await
    }

    /// Delete in pages of `batch_size` until a page comes back empty or
    /// short. Each page is its own commit, so a failed run can simply be
    /// invoked again.
    async fn delete_all_matching(&self, filter: EventFilter) -> DomainResult<u64> {
        let mut deleted = 0;
        let mut rounds = 0;
        loop {
            let ids = self.repository.find_ids(filter.clone(), self.batch_size).await?;
            if ids.is_empty() {
                break;
            }
            deleted += self.repository.delete_many(&ids).await?;
            rounds += 1;
            if ids.len() < self.batch_size {
                break;
            }
        }
        info!(deleted, rounds, "cascade delete finished");
        Ok(deleted)
    }

    /// Events of one goal track within the span of `keys`.
    pub async fn events_for_window(&self, goal_track_id: &str, keys: &[DateKey]) -> DomainResult<Vec<GoalTrackEvent>> {
        let (Some(&newest), Some(&oldest)) = (keys.first(), keys.last()) else {
            return Ok(Vec::new());
        };
        let filter = EventFilter::new()
            .goal_track(goal_track_id)
            .since(oldest.min(newest))
            .until(newest.max(oldest));
        self.repository.list(filter).await
    }

    /// Rhythm window of the last `days` days ending on the day of `now`.
    pub async fn rhythm_window(&self, goal_track_id: &str, now: DateTime<Utc>, days: usize) -> DomainResult<RhythmWindow> {
        let keys = self.calendar.last_n_date_keys(now, days);
        let events = self.events_for_window(goal_track_id, &keys).await?;
        RhythmWindow::build(&events, goal_track_id, &keys)
    }
}
