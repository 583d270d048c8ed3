//! Goal-track event domain model.
//!
//! An event records that one goal-linked todo was completed on one
//! calendar day. The id is the composite key itself, so writing the same
//! completion twice lands on the same record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::date_key::DateKey;

/// Deterministic idempotency key for a `(goal track, todo, day)` triple.
pub fn build_event_id(goal_track_id: &str, todo_id: &str, date_key: DateKey) -> String {
    format!("{goal_track_id}_{todo_id}_{date_key}")
}

/// One completion of one goal-linked todo on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTrackEvent {
    /// Composite key, see [`build_event_id`]
    pub id: String,
    pub goal_track_id: String,
    pub todo_id: String,
    /// Snapshot of the todo text at completion time
    pub todo_text: String,
    pub date_key: DateKey,
    pub created_at: DateTime<Utc>,
}

impl GoalTrackEvent {
    pub fn new(
        goal_track_id: impl Into<String>,
        todo_id: impl Into<String>,
        todo_text: impl Into<String>,
        date_key: DateKey,
        created_at: DateTime<Utc>,
    ) -> Self {
        let goal_track_id = goal_track_id.into();
        let todo_id = todo_id.into();
        Self {
            id: build_event_id(&goal_track_id, &todo_id, date_key),
            goal_track_id,
            todo_id,
            todo_text: todo_text.into(),
            date_key,
            created_at,
        }
    }

    /// Check that the stored id still matches the composite key.
    pub fn validate(&self) -> Result<(), String> {
        if self.goal_track_id.is_empty() {
            return Err("Event goal track id cannot be empty".to_string());
        }
        if self.todo_id.is_empty() {
            return Err("Event todo id cannot be empty".to_string());
        }
        let expected = build_event_id(&self.goal_track_id, &self.todo_id, self.date_key);
        if self.id != expected {
            return Err(format!("Event id {} does not match key {}", self.id, expected));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_is_composite_key() {
        let day: DateKey = "2024-05-01".parse().unwrap();
        assert_eq!(build_event_id("g1", "t9", day), "g1_t9_2024-05-01");
        assert_eq!(build_event_id("g1", "t9", day), build_event_id("g1", "t9", day));
    }

    #[test]
    fn test_new_event_validates() {
        let day: DateKey = "2024-05-01".parse().unwrap();
        let event = GoalTrackEvent::new("g1", "t9", "Run 5k", day, Utc::now());
        assert_eq!(event.id, "g1_t9_2024-05-01");
        assert!(event.validate().is_ok());

        let mut tampered = event;
        tampered.id = "other".to_string();
        assert!(tampered.validate().is_err());
    }
}
