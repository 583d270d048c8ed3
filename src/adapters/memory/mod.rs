//! In-memory adapters, for tests and embedding without a database.

pub mod event_repository;
pub mod routine_repository;
pub mod weekly_review_repository;

pub use event_repository::InMemoryEventRepository;
pub use routine_repository::InMemoryRoutineRepository;
pub use weekly_review_repository::InMemoryWeeklyReviewRepository;
