//! Composition root wiring the SQLite store, the configured oracle and the
//! analytics services.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::adapters::oracle::oracle_from_config;
use crate::adapters::sqlite::{
    initialize_database, SqliteEventRepository, SqliteRoutineRepository, SqliteWeeklyReviewRepository,
};
use crate::domain::errors::DomainResult;
use crate::domain::models::{Config, Todo};
use crate::domain::ports::RewriteOracle;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{
    Calendar, EventLedgerService, LedgerChange, RewriteService, RhythmWindow, RoutineStreakService, WeeklyCoach,
    WeeklyReviewService,
};

/// Rows removed when a goal track is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalTrackPurge {
    pub events: u64,
    pub reviews: u64,
}

pub struct HabitRhythmEngine {
    config: Config,
    calendar: Calendar,
    ledger: EventLedgerService<SqliteEventRepository>,
    routines: RoutineStreakService<SqliteRoutineRepository>,
    reviews: WeeklyReviewService<SqliteEventRepository, SqliteWeeklyReviewRepository>,
    rewrites: RewriteService<dyn RewriteOracle>,
}

impl HabitRhythmEngine {
    /// Validate `config`, open and migrate the database, build the services.
    pub async fn open(config: Config) -> Result<Self> {
        ConfigLoader::validate(&config)?;
        let pool = initialize_database(&config.database)
            .await
            .with_context(|| format!("Failed to open database at {}", config.database.path))?;
        Ok(Self::from_pool(pool, config)?)
    }

    /// Build the services over an already migrated pool.
    pub fn from_pool(pool: SqlitePool, config: Config) -> DomainResult<Self> {
        let calendar = Calendar::from_offset_minutes(config.home_utc_offset_minutes)?;
        let events = Arc::new(SqliteEventRepository::new(pool.clone()));

        let ledger = EventLedgerService::new(events.clone(), calendar, config.ledger.delete_batch_size)?;
        let routines = RoutineStreakService::new(
            Arc::new(SqliteRoutineRepository::new(pool.clone())),
            calendar,
            config.routine.grace_days,
        );
        let reviews = WeeklyReviewService::new(
            events,
            Arc::new(SqliteWeeklyReviewRepository::new(pool)),
            calendar,
            WeeklyCoach::new(config.coach.clone()),
        );
        let rewrites = RewriteService::new(oracle_from_config(&config.oracle)?);

        info!(
            utc_offset_minutes = config.home_utc_offset_minutes,
            oracle_enabled = config.oracle.enabled,
            "habit rhythm engine ready"
        );

        Ok(Self {
            config,
            calendar,
            ledger,
            routines,
            reviews,
            rewrites,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    pub fn ledger(&self) -> &EventLedgerService<SqliteEventRepository> {
        &self.ledger
    }

    pub fn routines(&self) -> &RoutineStreakService<SqliteRoutineRepository> {
        &self.routines
    }

    pub fn reviews(&self) -> &WeeklyReviewService<SqliteEventRepository, SqliteWeeklyReviewRepository> {
        &self.reviews
    }

    pub fn rewrites(&self) -> &RewriteService<dyn RewriteOracle> {
        &self.rewrites
    }

    /// Record a todo's `done` change in the ledger.
    pub async fn on_todo_toggled(&self, before: &Todo, after: &Todo, now: DateTime<Utc>) -> DomainResult<LedgerChange> {
        self.ledger.apply_toggle(before, after, now).await
    }

    /// Cascade for a deleted todo: its events and any cached rewrite.
    pub async fn on_todo_deleted(&self, todo_id: &str) -> DomainResult<u64> {
        let events = self.ledger.delete_events_by_todo(todo_id).await?;
        self.rewrites.forget(todo_id).await;
        Ok(events)
    }

    /// Cascade for a deleted goal track: its events and its reviews.
    pub async fn on_goal_track_deleted(&self, goal_track_id: &str) -> DomainResult<GoalTrackPurge> {
        let events = self.ledger.delete_events_by_goal_track(goal_track_id).await?;
        let reviews = self.reviews.delete_for_goal_track(goal_track_id).await?;
        info!(goal_track_id, events, reviews, "goal track purged");
        Ok(GoalTrackPurge { events, reviews })
    }

    /// Rhythm over the last `days` days in the home timezone.
    pub async fn rhythm(&self, goal_track_id: &str, now: DateTime<Utc>, days: usize) -> DomainResult<RhythmWindow> {
        self.ledger.rhythm_window(goal_track_id, now, days).await
    }
}
