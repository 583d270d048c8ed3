pub mod config;
pub mod date_key;
pub mod goal_track_event;
pub mod routine;
pub mod todo;
pub mod weekly_review;

pub use config::{
    CoachConfig, Config, DatabaseConfig, LedgerConfig, LoggingConfig, OracleConfig, RoutineConfig,
};
pub use date_key::DateKey;
pub use goal_track_event::{build_event_id, GoalTrackEvent};
pub use routine::{
    monthly_success_rate, CompletionOutcome, RoutineCompletion, RoutineDayState, RoutineItem,
    RoutineTask, DEFAULT_GRACE_DAYS,
};
pub use todo::{MissedReason, Todo};
pub use weekly_review::{build_review_id, GoalTrackWeeklyReview, WeeklyStatus};
