//! Weekly review service.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{build_review_id, DateKey, GoalTrackWeeklyReview, WeeklyStatus};
use crate::domain::ports::{EventFilter, GoalTrackEventRepository, WeeklyReviewRepository};
use crate::services::calendar::Calendar;
use crate::services::rhythm::RhythmWindow;
use crate::services::weekly_coach::{WeeklyCoach, COACH_WINDOW_DAYS};

/// Field renames from the first review document layout.
const LEGACY_FIELDS: &[(&str, &str)] = &[
    ("rhythm", "status"),
    ("wobbleMoment", "blockReason"),
    ("nextWeekRule", "nextAction"),
];

/// What the user submits at the end of a week.
#[derive(Debug, Clone)]
pub struct ReviewSubmission {
    pub status: WeeklyStatus,
    pub block_reason: Option<String>,
    pub next_action: Option<String>,
}

pub struct WeeklyReviewService<E, W>
where
    E: GoalTrackEventRepository,
    W: WeeklyReviewRepository,
{
    events: Arc<E>,
    reviews: Arc<W>,
    calendar: Calendar,
    coach: WeeklyCoach,
}

impl<E, W> WeeklyReviewService<E, W>
where
    E: GoalTrackEventRepository,
    W: WeeklyReviewRepository,
{
    pub fn new(events: Arc<E>, reviews: Arc<W>, calendar: Calendar, coach: WeeklyCoach) -> Self {
        Self {
            events,
            reviews,
            calendar,
            coach,
        }
    }

    /// Save this week's review with fresh coaching.
    ///
    /// Re-submitting in the same week replaces the earlier review and keeps
    /// its `created_at`.
    #[instrument(skip(self, submission))]
    pub async fn submit(
        &self,
        goal_track_id: &str,
        now: DateTime<Utc>,
        submission: ReviewSubmission,
    ) -> DomainResult<GoalTrackWeeklyReview> {
        let week_start = self.calendar.week_start_key(now);
        let keys = self.calendar.last_n_date_keys(now, COACH_WINDOW_DAYS);
        let window = self.trailing_window(goal_track_id, &keys).await?;

        let previous = self.reviews.get(goal_track_id, week_start.minus_days(7)).await?;
        let fallback = previous
            .as_ref()
            .and_then(|r| r.next_action.as_deref().or(Some(r.coach_action.as_str())));
        let advice = self
            .coach
            .advise(&window.counts(), submission.next_action.as_deref(), fallback);

        let existing = self.reviews.get(goal_track_id, week_start).await?;
        let mut review = GoalTrackWeeklyReview::new(goal_track_id, week_start, submission.status);
        if let Some(existing) = existing {
            review.created_at = existing.created_at;
        }
        review.block_reason = non_blank(submission.block_reason);
        review.next_action = non_blank(submission.next_action);
        review.coach_fact = advice.fact;
        review.coach_pattern = advice.pattern.label().to_string();
        review.coach_action = advice.action;
        review.updated_at = now;

        review.validate().map_err(DomainError::ValidationFailed)?;
        self.reviews.upsert(&review).await?;
        info!(review_id = %review.id, pattern = %review.coach_pattern, "weekly review saved");
        Ok(review)
    }

    pub async fn review_for_week(&self, goal_track_id: &str, now: DateTime<Utc>) -> DomainResult<Option<GoalTrackWeeklyReview>> {
        self.reviews.get(goal_track_id, self.calendar.week_start_key(now)).await
    }

    pub async fn history(&self, goal_track_id: &str, limit: usize) -> DomainResult<Vec<GoalTrackWeeklyReview>> {
        self.reviews.list_for_goal_track(goal_track_id, limit).await
    }

    /// Cascade delete for a removed goal track.
    pub async fn delete_for_goal_track(&self, goal_track_id: &str) -> DomainResult<u64> {
        self.reviews.delete_for_goal_track(goal_track_id).await
    }

    async fn trailing_window(&self, goal_track_id: &str, keys: &[DateKey]) -> DomainResult<RhythmWindow> {
        let mut filter = EventFilter::new().goal_track(goal_track_id);
        if let (Some(&newest), Some(&oldest)) = (keys.first(), keys.last()) {
            filter = filter.since(oldest).until(newest);
        }
        let events = self.events.list(filter).await?;
        RhythmWindow::build(&events, goal_track_id, keys)
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Rewrite a stored review document into the current field layout.
///
/// Legacy names are moved to their current names unless the current name
/// is already present. The status is upper-cased and the id and coach
/// fields are filled in when missing.
pub fn normalize_legacy(document: Value) -> DomainResult<Value> {
    let Value::Object(mut fields) = document else {
        return Err(DomainError::ValidationFailed("Weekly review document must be an object".to_string()));
    };

    for (legacy, current) in LEGACY_FIELDS {
        if let Some(value) = fields.remove(*legacy) {
            fields.entry(*current).or_insert(value);
        }
    }

    if let Some(status) = fields.get("status").and_then(Value::as_str).map(str::to_string) {
        let parsed = WeeklyStatus::from_str(&status)
            .ok_or_else(|| DomainError::ValidationFailed(format!("Unknown weekly status: {status}")))?;
        fields.insert("status".to_string(), Value::String(parsed.as_str().to_string()));
    }

    if !fields.contains_key("id") {
        if let Some(id) = derived_id(&fields) {
            fields.insert("id".to_string(), Value::String(id));
        }
    }
    for coach_field in ["coachFact", "coachPattern", "coachAction"] {
        fields.entry(coach_field).or_insert_with(|| Value::String(String::new()));
    }

    Ok(Value::Object(fields))
}

fn derived_id(fields: &Map<String, Value>) -> Option<String> {
    let goal_track_id = fields.get("goalTrackId")?.as_str()?;
    let week_start: DateKey = fields.get("weekStartKey")?.as_str()?.parse().ok()?;
    Some(build_review_id(goal_track_id, week_start))
}

/// Parse a stored review of either layout.
pub fn parse_review(document: Value) -> DomainResult<GoalTrackWeeklyReview> {
    let review: GoalTrackWeeklyReview = serde_json::from_value(normalize_legacy(document)?)?;
    review.validate().map_err(DomainError::ValidationFailed)?;
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryEventRepository, InMemoryWeeklyReviewRepository};
    use crate::domain::models::GoalTrackEvent;
    use chrono::TimeZone;
    use serde_json::json;

    type Service = WeeklyReviewService<InMemoryEventRepository, InMemoryWeeklyReviewRepository>;

    fn setup() -> (Arc<InMemoryEventRepository>, Service) {
        let events = Arc::new(InMemoryEventRepository::new());
        let reviews = Arc::new(InMemoryWeeklyReviewRepository::new());
        let service = WeeklyReviewService::new(events.clone(), reviews, Calendar::utc(), WeeklyCoach::default());
        (events, service)
    }

    fn submission(next_action: Option<&str>) -> ReviewSubmission {
        ReviewSubmission {
            status: WeeklyStatus::Sporadic,
            block_reason: Some("late meetings".to_string()),
            next_action: next_action.map(str::to_string),
        }
    }

    // Sunday
    fn sunday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 14, 20, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_submit_builds_coaching_from_ledger() {
        let (events, service) = setup();
        for day in ["2024-01-14", "2024-01-12", "2024-01-09"] {
            let event = GoalTrackEvent::new("g1", "t1", "Run", day.parse().unwrap(), sunday());
            events.upsert(&event).await.unwrap();
        }

        let review = service
            .submit("g1", sunday(), submission(Some("Run before work on Tuesday and Thursday")))
            .await
            .unwrap();

        assert_eq!(review.id, "g1_2024-01-08");
        assert_eq!(review.coach_fact, "executed 3 of the last 7 days");
        assert_eq!(review.coach_pattern, "steady");
        assert_eq!(review.coach_action, "Run before work on Tuesday and Thursday");
    }

    #[tokio::test]
    async fn test_resubmit_replaces_same_week() {
        let (_events, service) = setup();
        let first = service.submit("g1", sunday(), submission(None)).await.unwrap();
        let second = service.submit("g1", sunday(), submission(Some("walk"))).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.coach_action, "Today, walk");
        assert_eq!(service.history("g1", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_previous_week_action_is_fallback() {
        let (_events, service) = setup();
        let last_week = sunday() - chrono::Duration::days(7);
        service
            .submit("g1", last_week, submission(Some("Read ten pages before bed each night")))
            .await
            .unwrap();

        let review = service.submit("g1", sunday(), submission(None)).await.unwrap();
        assert_eq!(review.coach_pattern, "no execution");
        assert_eq!(review.coach_action, "Read ten pages before bed each night");
    }

    #[test]
    fn test_normalize_legacy_fields() {
        let legacy = json!({
            "goalTrackId": "g1",
            "weekStartKey": "2024-01-08",
            "rhythm": "steady",
            "wobbleMoment": "Friday nights",
            "nextWeekRule": "Prep gym bag on Thursday",
            "createdAt": "2024-01-14T20:00:00Z",
            "updatedAt": "2024-01-14T20:00:00Z"
        });
        let review = parse_review(legacy).unwrap();
        assert_eq!(review.id, "g1_2024-01-08");
        assert_eq!(review.status, WeeklyStatus::Steady);
        assert_eq!(review.block_reason.as_deref(), Some("Friday nights"));
        assert_eq!(review.next_action.as_deref(), Some("Prep gym bag on Thursday"));
    }

    #[test]
    fn test_normalize_prefers_current_fields() {
        let doc = json!({"status": "STOPPED", "rhythm": "steady"});
        let normalized = normalize_legacy(doc).unwrap();
        assert_eq!(normalized["status"], "STOPPED");
        assert!(normalized.get("rhythm").is_none());
        assert!(normalize_legacy(json!({"rhythm": "wobbly"})).is_err());
        assert!(normalize_legacy(json!([1, 2])).is_err());
    }
}
