//! Weekly reviews over the SQLite store.

mod common;

use common::{jan, linked_todo, test_engine};
use habit_rhythm::services::{parse_review, ReviewSubmission};
use habit_rhythm::{DateKey, WeeklyStatus};
use serde_json::json;

fn submission(status: WeeklyStatus, next_action: Option<&str>) -> ReviewSubmission {
    ReviewSubmission {
        status,
        block_reason: None,
        next_action: next_action.map(str::to_string),
    }
}

#[tokio::test]
async fn test_review_coaches_from_trailing_week() {
    let engine = test_engine().await;
    let todo = linked_todo("t1", "g1").with_done(true);
    for day in 8..=11 {
        engine.ledger().record_completion(&todo, jan(day)).await.unwrap();
    }

    let review = engine
        .reviews()
        .submit("g1", jan(14), submission(WeeklyStatus::Sporadic, Some("Walk after lunch every day")))
        .await
        .unwrap();

    assert_eq!(review.id, "g1_2024-01-08");
    assert_eq!(review.week_start_key, DateKey::from_ymd(2024, 1, 8).unwrap());
    assert_eq!(review.coach_fact, "executed 4 of the last 7 days");
    assert_eq!(review.coach_pattern, "late-week gap");
    assert_eq!(review.coach_action, "Walk after lunch every day");
}

#[tokio::test]
async fn test_resubmission_replaces_same_week() {
    let engine = test_engine().await;
    let first = engine
        .reviews()
        .submit("g1", jan(9), submission(WeeklyStatus::Stopped, None))
        .await
        .unwrap();
    let second = engine
        .reviews()
        .submit("g1", jan(12), submission(WeeklyStatus::Steady, None))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.coach_pattern, "no execution");

    let history = engine.reviews().history("g1", 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, WeeklyStatus::Steady);
}

#[tokio::test]
async fn test_previous_rule_carries_into_next_week() {
    let engine = test_engine().await;
    engine
        .reviews()
        .submit("g1", jan(14), submission(WeeklyStatus::Steady, Some("Run before breakfast twice")))
        .await
        .unwrap();

    let next = engine
        .reviews()
        .submit("g1", jan(21), submission(WeeklyStatus::Sporadic, None))
        .await
        .unwrap();

    assert_eq!(next.next_action, None);
    assert_eq!(next.coach_action, "Run before breakfast twice");

    let history = engine.reviews().history("g1", 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, "g1_2024-01-15", "newest week first");
}

#[tokio::test]
async fn test_goal_track_purge_drops_reviews() {
    let engine = test_engine().await;
    engine
        .reviews()
        .submit("g1", jan(14), submission(WeeklyStatus::Steady, None))
        .await
        .unwrap();

    let purge = engine.on_goal_track_deleted("g1").await.unwrap();
    assert_eq!(purge.reviews, 1);
    assert!(engine.reviews().review_for_week("g1", jan(14)).await.unwrap().is_none());
}

#[test]
fn test_legacy_document_parses_into_current_layout() {
    let legacy = json!({
        "goalTrackId": "g7",
        "weekStartKey": "2024-01-08",
        "rhythm": "steady",
        "wobbleMoment": "Friday evenings",
        "nextWeekRule": "Pack the gym bag the night before",
        "createdAt": "2024-01-14T11:00:00Z",
        "updatedAt": "2024-01-14T11:00:00Z"
    });

    let review = parse_review(legacy).unwrap();
    assert_eq!(review.id, "g7_2024-01-08");
    assert_eq!(review.status, WeeklyStatus::Steady);
    assert_eq!(review.block_reason.as_deref(), Some("Friday evenings"));
    assert_eq!(review.next_action.as_deref(), Some("Pack the gym bag the night before"));
    assert_eq!(review.coach_action, "");
}

#[test]
fn test_current_fields_win_over_legacy() {
    let mixed = json!({
        "id": "g7_2024-01-08",
        "goalTrackId": "g7",
        "weekStartKey": "2024-01-08",
        "status": "STOPPED",
        "rhythm": "STEADY",
        "coachFact": "executed 0 of the last 7 days",
        "coachPattern": "no execution",
        "coachAction": "Today, open the notebook",
        "createdAt": "2024-01-14T11:00:00Z",
        "updatedAt": "2024-01-14T11:00:00Z"
    });

    let review = parse_review(mixed).unwrap();
    assert_eq!(review.status, WeeklyStatus::Stopped);
    assert_eq!(review.coach_pattern, "no execution");
}
