pub mod calendar;
pub mod completion_ratio;
pub mod event_ledger;
pub mod missed_reason;
pub mod rewrite;
pub mod rhythm;
pub mod routine_streak;
pub mod weekly_coach;
pub mod weekly_review;

pub use calendar::{weekday_label, Calendar};
pub use completion_ratio::{completion_ratios, summarize, DayRatio, RatioStyle, RatioSummary};
pub use event_ledger::{EventLedgerService, LedgerChange};
pub use missed_reason::{
    classify, follow_up, is_ai_eligible, is_overdue, pick_reflection_questions, MissedFollowUp,
};
pub use rewrite::{RewriteOutcome, RewriteService, UNAVAILABLE_MESSAGE};
pub use rhythm::{dot_intensity, DotIntensity, LastExecuted, RhythmImpact, RhythmWindow};
pub use routine_streak::RoutineStreakService;
pub use weekly_coach::{CoachAdvice, CoachPattern, WeeklyCoach};
pub use weekly_review::{normalize_legacy, parse_review, ReviewSubmission, WeeklyReviewService};
