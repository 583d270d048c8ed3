//! Routine domain model.
//!
//! A routine is a checklist run once per day. Checking tasks never touches
//! the streak; only the explicit completion action does, through
//! [`RoutineItem::complete`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::date_key::DateKey;
use crate::domain::errors::{DomainError, DomainResult};

/// Largest day gap between two completions that keeps a streak alive.
pub const DEFAULT_GRACE_DAYS: u32 = 2;

/// A single checkbox inside a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

impl RoutineTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            done: false,
        }
    }
}

/// Where a routine stands for the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineDayState {
    /// No task checked
    Idle,
    /// Some but not all tasks checked
    InProgress,
    /// Every task checked, day not yet committed
    AllDone,
    /// Completion action taken today
    CompletedToday,
}

impl RoutineDayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InProgress => "in_progress",
            Self::AllDone => "all_done",
            Self::CompletedToday => "completed_today",
        }
    }
}

/// Result of a completion action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// First completion ever
    Started,
    /// Streak carried over (possibly across grace days)
    Extended,
    /// Gap exceeded the grace window
    Reset,
    /// The day was already committed; nothing changed
    AlreadyCompleted,
}

/// The routine after a completion action, plus how the streak moved.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineCompletion {
    pub routine: RoutineItem,
    pub outcome: CompletionOutcome,
}

/// Percentage of elapsed days this month that appear in `history`.
///
/// The denominator is the day of month of `today`, so the rate is
/// meaningful mid-month. Days after `today` are not counted.
pub fn monthly_success_rate(history: &BTreeSet<DateKey>, today: DateKey) -> u32 {
    let completed = history
        .iter()
        .filter(|day| day.is_same_month(today) && **day <= today)
        .count();
    let elapsed = today.day_of_month().max(1) as usize;
    let rate = (100.0 * completed as f64 / elapsed as f64).round();
    (rate as u32).min(100)
}

/// A named checklist executed once per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineItem {
    pub id: String,
    pub title: String,
    pub tasks: Vec<RoutineTask>,
    /// Consecutive successful days, grace days tolerated
    pub streak: u32,
    pub total_completed_days: u32,
    pub monthly_success_rate: u32,
    pub last_completed_date: Option<DateKey>,
    /// Day the daily reset rule last ran
    #[serde(default)]
    pub last_reset_date: Option<DateKey>,
    #[serde(default)]
    pub completion_history: BTreeSet<DateKey>,
    /// Version for optimistic locking
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoutineItem {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            tasks: Vec::new(),
            streak: 0,
            total_completed_days: 0,
            monthly_success_rate: 0,
            last_completed_date: None,
            last_reset_date: None,
            completion_history: BTreeSet::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_task(mut self, title: impl Into<String>) -> Self {
        self.tasks.push(RoutineTask::new(title));
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Routine title cannot be empty".to_string());
        }
        if self.tasks.iter().any(|t| t.title.trim().is_empty()) {
            return Err("Routine task title cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn is_completed_on(&self, day: DateKey) -> bool {
        self.last_completed_date == Some(day)
    }

    pub fn day_state(&self, today: DateKey) -> RoutineDayState {
        if self.is_completed_on(today) {
            return RoutineDayState::CompletedToday;
        }
        let checked = self.tasks.iter().filter(|t| t.done).count();
        match checked {
            0 => RoutineDayState::Idle,
            n if n == self.tasks.len() => RoutineDayState::AllDone,
            _ => RoutineDayState::InProgress,
        }
    }

    /// Flip one task's checkbox. Returns the new checked value.
    pub fn toggle_task(&mut self, task_id: &str) -> DomainResult<bool> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| DomainError::ValidationFailed(format!("Routine task not found: {task_id}")))?;
        task.done = !task.done;
        self.updated_at = Utc::now();
        Ok(task.done)
    }

    /// Start-of-day reset, applied at most once per day.
    ///
    /// Returns true when any field changed and the routine needs saving.
    pub fn apply_daily_reset(&mut self, today: DateKey) -> bool {
        if self.last_reset_date == Some(today) {
            return false;
        }
        self.last_reset_date = Some(today);
        if !self.is_completed_on(today) {
            for task in self.tasks.iter_mut().filter(|t| t.done) {
                task.done = false;
            }
        }
        self.monthly_success_rate = monthly_success_rate(&self.completion_history, today);
        self.updated_at = Utc::now();
        true
    }

    /// Commit `today` as a completed day.
    ///
    /// The same-day guard runs before the streak rule, so repeated
    /// commits on one day collapse to a single increment.
    pub fn complete(&self, today: DateKey, grace_days: u32) -> DomainResult<RoutineCompletion> {
        if self.is_completed_on(today) {
            return Ok(RoutineCompletion {
                routine: self.clone(),
                outcome: CompletionOutcome::AlreadyCompleted,
            });
        }

        let state = self.day_state(today);
        if self.tasks.is_empty() || state != RoutineDayState::AllDone {
            return Err(DomainError::InvalidStateTransition {
                from: state.as_str().to_string(),
                to: RoutineDayState::CompletedToday.as_str().to_string(),
                reason: if self.tasks.is_empty() {
                    "routine has no tasks".to_string()
                } else {
                    "not every task is checked".to_string()
                },
            });
        }

        let mut next = self.clone();
        let outcome = match self.last_completed_date {
            None => {
                next.streak = 1;
                CompletionOutcome::Started
            }
            Some(last) => {
                let gap = last.days_until(today);
                if gap > 0 && gap <= i64::from(grace_days) {
                    next.streak += 1;
                    CompletionOutcome::Extended
                } else {
                    next.streak = 1;
                    CompletionOutcome::Reset
                }
            }
        };

        next.total_completed_days += 1;
        next.completion_history.insert(today);
        next.last_completed_date = Some(today);
        next.monthly_success_rate = monthly_success_rate(&next.completion_history, today);
        next.updated_at = Utc::now();

        Ok(RoutineCompletion { routine: next, outcome })
    }
}
