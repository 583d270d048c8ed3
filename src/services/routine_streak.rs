//! Routine streak service.
//!
//! Loads a routine, runs the start-of-day reset, applies the day-commit
//! state machine and writes the result back with a version check.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CompletionOutcome, RoutineCompletion, RoutineItem};
use crate::domain::ports::RoutineRepository;
use crate::services::calendar::Calendar;

pub struct RoutineStreakService<R: RoutineRepository> {
    repository: Arc<R>,
    calendar: Calendar,
    grace_days: u32,
}

impl<R: RoutineRepository> RoutineStreakService<R> {
    pub fn new(repository: Arc<R>, calendar: Calendar, grace_days: u32) -> Self {
        Self {
            repository,
            calendar,
            grace_days,
        }
    }

    /// Create a routine with the given task titles.
    pub async fn create_routine(&self, title: &str, tasks: &[&str]) -> DomainResult<RoutineItem> {
        let routine = tasks
            .iter()
            .fold(RoutineItem::new(title), |routine, task| routine.with_task(*task));
        routine.validate().map_err(DomainError::ValidationFailed)?;
        self.repository.create(&routine).await?;
        Ok(routine)
    }

    pub async fn get_routine(&self, id: &str) -> DomainResult<RoutineItem> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::RoutineNotFound(id.to_string()))
    }

    pub async fn list_routines(&self) -> DomainResult<Vec<RoutineItem>> {
        self.repository.list().await
    }

    pub async fn delete_routine(&self, id: &str) -> DomainResult<()> {
        self.repository.delete(id).await
    }

    /// Flip one task's checkbox. Checking the last box does not commit the
    /// day; that takes an explicit [`Self::complete_routine`].
    #[instrument(skip(self))]
    pub async fn toggle_task(&self, routine_id: &str, task_id: &str, now: DateTime<Utc>) -> DomainResult<RoutineItem> {
        let today = self.calendar.today(now);
        let mut routine = self.get_routine(routine_id).await?;
        routine.apply_daily_reset(today);
        if routine.is_completed_on(today) {
            return Err(DomainError::InvalidStateTransition {
                from: routine.day_state(today).as_str().to_string(),
                to: "toggled".to_string(),
                reason: "day already committed".to_string(),
            });
        }
        routine.toggle_task(task_id)?;
        self.save(routine).await
    }

    /// Run the start-of-day reset if it has not run today.
    pub async fn reset_for_day(&self, routine_id: &str, now: DateTime<Utc>) -> DomainResult<RoutineItem> {
        let mut routine = self.get_routine(routine_id).await?;
        if routine.apply_daily_reset(self.calendar.today(now)) {
            debug!(routine_id, "applied daily reset");
            return self.save(routine).await;
        }
        Ok(routine)
    }

    /// Commit today for a routine whose tasks are all checked.
    ///
    /// A version conflict means another writer saved first. The routine is
    /// reloaded once and the same-day guard re-applied, so two concurrent
    /// commits on one day still yield a single increment.
    #[instrument(skip(self))]
    pub async fn complete_routine(&self, routine_id: &str, now: DateTime<Utc>) -> DomainResult<RoutineCompletion> {
        match self.try_complete(routine_id, now).await {
            Err(DomainError::ConcurrencyConflict { .. }) => {
                warn!(routine_id, "routine changed during completion, retrying once");
                self.try_complete(routine_id, now).await
            }
            result => result,
        }
    }

    async fn try_complete(&self, routine_id: &str, now: DateTime<Utc>) -> DomainResult<RoutineCompletion> {
        let today = self.calendar.today(now);
        let mut routine = self.get_routine(routine_id).await?;
        let reset = routine.apply_daily_reset(today);

        let completion = routine.complete(today, self.grace_days)?;
        if completion.outcome == CompletionOutcome::AlreadyCompleted {
            if reset {
                self.save(routine).await?;
            }
            return Ok(completion);
        }

        let routine = self.save(completion.routine).await?;
        info!(
            routine_id,
            streak = routine.streak,
            outcome = ?completion.outcome,
            "routine day committed"
        );
        Ok(RoutineCompletion {
            routine,
            outcome: completion.outcome,
        })
    }

    async fn save(&self, mut routine: RoutineItem) -> DomainResult<RoutineItem> {
        let expected = routine.version;
        self.repository.update(&routine, expected).await?;
        routine.version = expected + 1;
        Ok(routine)
    }
}
