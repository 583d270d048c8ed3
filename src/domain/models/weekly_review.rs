//! Weekly self-review of a goal track.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::date_key::DateKey;

/// Deterministic id: one review per goal track per week.
pub fn build_review_id(goal_track_id: &str, week_start_key: DateKey) -> String {
    format!("{goal_track_id}_{week_start_key}")
}

/// How the user rates their own week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeeklyStatus {
    Steady,
    Sporadic,
    Stopped,
}

impl WeeklyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Steady => "STEADY",
            Self::Sporadic => "SPORADIC",
            Self::Stopped => "STOPPED",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "STEADY" => Some(Self::Steady),
            "SPORADIC" => Some(Self::Sporadic),
            "STOPPED" => Some(Self::Stopped),
            _ => None,
        }
    }
}

/// One evaluation per `(goal track, week start)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTrackWeeklyReview {
    pub id: String,
    pub goal_track_id: String,
    pub week_start_key: DateKey,
    pub status: WeeklyStatus,
    #[serde(default)]
    pub block_reason: Option<String>,
    /// Single rule the user commits to for next week
    #[serde(default)]
    pub next_action: Option<String>,
    pub coach_fact: String,
    pub coach_pattern: String,
    pub coach_action: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GoalTrackWeeklyReview {
    pub fn new(goal_track_id: impl Into<String>, week_start_key: DateKey, status: WeeklyStatus) -> Self {
        let goal_track_id = goal_track_id.into();
        let now = Utc::now();
        Self {
            id: build_review_id(&goal_track_id, week_start_key),
            goal_track_id,
            week_start_key,
            status,
            block_reason: None,
            next_action: None,
            coach_fact: String::new(),
            coach_pattern: String::new(),
            coach_action: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.goal_track_id.is_empty() {
            return Err("Review goal track id cannot be empty".to_string());
        }
        if self.week_start_key.week_start() != self.week_start_key {
            return Err(format!("Week start {} is not a Monday", self.week_start_key));
        }
        if self.id != build_review_id(&self.goal_track_id, self.week_start_key) {
            return Err(format!("Review id {} does not match its key", self.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_id_is_deterministic() {
        let week: DateKey = "2024-01-08".parse().unwrap();
        let review = GoalTrackWeeklyReview::new("g1", week, WeeklyStatus::Steady);
        assert_eq!(review.id, "g1_2024-01-08");
        assert!(review.validate().is_ok());
    }

    #[test]
    fn test_review_rejects_non_monday_week() {
        let week: DateKey = "2024-01-09".parse().unwrap();
        let review = GoalTrackWeeklyReview::new("g1", week, WeeklyStatus::Sporadic);
        assert!(review.validate().is_err());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(WeeklyStatus::from_str("stopped"), Some(WeeklyStatus::Stopped));
        assert_eq!(WeeklyStatus::from_str("wobbly"), None);
        assert_eq!(serde_json::to_string(&WeeklyStatus::Sporadic).unwrap(), "\"SPORADIC\"");
    }
}
