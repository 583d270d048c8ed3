//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - GoalTrackEventRepository: event ledger storage
//! - RoutineRepository: routine storage with optimistic locking
//! - WeeklyReviewRepository: weekly review storage
//! - RewriteOracle: optional text-rewrite collaborator
//!
//! These traits keep the analytics independent of the backing store.
pub mod goal_track_event_repository;
pub mod null_rewrite_oracle;
pub mod rewrite_oracle;
pub mod routine_repository;
pub mod weekly_review_repository;

pub use goal_track_event_repository::{EventFilter, GoalTrackEventRepository};
pub use null_rewrite_oracle::NullRewriteOracle;
pub use rewrite_oracle::{RewriteOracle, RewriteRequest, RewriteSuggestion};
pub use routine_repository::RoutineRepository;
pub use weekly_review_repository::WeeklyReviewRepository;
