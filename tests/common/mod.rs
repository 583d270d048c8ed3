//! Common test utilities for integration tests
//!
//! Shared fixtures for the SQLite-backed and in-memory integration tests.

use chrono::{DateTime, TimeZone, Utc};
use habit_rhythm::adapters::sqlite::create_migrated_test_pool;
use habit_rhythm::{Config, HabitRhythmEngine, Todo};

/// Engine over a fresh in-memory database, home zone UTC+9.
#[allow(dead_code)]
pub async fn test_engine() -> HabitRhythmEngine {
    let pool = create_migrated_test_pool().await.expect("Failed to create test pool");
    HabitRhythmEngine::from_pool(pool, Config::default()).expect("Failed to build engine")
}

/// Engine with a custom delete batch size.
#[allow(dead_code)]
pub async fn test_engine_with_batch(batch_size: usize) -> HabitRhythmEngine {
    let mut config = Config::default();
    config.ledger.delete_batch_size = batch_size;
    let pool = create_migrated_test_pool().await.expect("Failed to create test pool");
    HabitRhythmEngine::from_pool(pool, config).expect("Failed to build engine")
}

/// Noon in UTC+9 on the given day of January 2024.
#[allow(dead_code)]
pub fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 3, 0, 0).unwrap()
}

/// An open todo linked to `goal_track_id`.
#[allow(dead_code)]
pub fn linked_todo(id: &str, goal_track_id: &str) -> Todo {
    Todo::new(format!("todo {id}")).with_id(id).with_goal_track(goal_track_id)
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
