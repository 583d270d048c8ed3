//! Habit Rhythm - execution and habit-rhythm analytics
//!
//! Records goal-linked todo completions in an idempotent event ledger and
//! derives the signals a habit tracker shows from it: per-day rhythm
//! counts, completion ratios, routine streaks with grace days, missed-todo
//! reflection, and a rule-based weekly coach.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): calendar math, aggregators and state machines
//! - **Adapters** (`adapters`): SQLite and in-memory stores, the HTTP rewrite oracle
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **Application Layer** (`application`): the wired-up engine
//!
//! # Example
//!
//! ```ignore
//! use habit_rhythm::{ConfigLoader, HabitRhythmEngine, LogConfig, LoggerImpl};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;
//!     let engine = HabitRhythmEngine::open(config).await?;
//!     let window = engine.rhythm("goal-1", chrono::Utc::now(), 7).await?;
//!     println!("{:?}", window.last_executed());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{GoalTrackPurge, HabitRhythmEngine};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, DateKey, GoalTrackEvent, GoalTrackWeeklyReview, MissedReason, RoutineItem, Todo, WeeklyStatus,
};
pub use domain::ports::{GoalTrackEventRepository, RewriteOracle, RoutineRepository, WeeklyReviewRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::{LogConfig, LoggerImpl};
pub use services::{Calendar, EventLedgerService, RhythmWindow, RoutineStreakService, WeeklyCoach};
