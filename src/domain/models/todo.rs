//! Todo domain model and the missed-reason taxonomy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Why an overdue todo was not done.
///
/// Closed set. Stored codes outside it decode to `None` rather than an
/// error, since retired codes may still exist in saved data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissedReason {
    /// Done in real life, just never checked off
    #[serde(rename = "completed_unchecked")]
    CompletedButUnchecked,
    HardToStart,
    NotEnoughTime,
    WantToRest,
}

impl MissedReason {
    pub const ALL: [Self; 4] = [
        Self::CompletedButUnchecked,
        Self::HardToStart,
        Self::NotEnoughTime,
        Self::WantToRest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompletedButUnchecked => "completed_unchecked",
            Self::HardToStart => "hard_to_start",
            Self::NotEnoughTime => "not_enough_time",
            Self::WantToRest => "want_to_rest",
        }
    }

    /// Permissive decode: unknown codes yield `None`.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "completed_unchecked" => Some(Self::CompletedButUnchecked),
            "hard_to_start" => Some(Self::HardToStart),
            "not_enough_time" => Some(Self::NotEnoughTime),
            "want_to_rest" => Some(Self::WantToRest),
            _ => None,
        }
    }
}

fn deserialize_missed_reason<'de, D>(deserializer: D) -> Result<Option<MissedReason>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(MissedReason::from_code))
}

/// A unit of work, optionally linked to a goal track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "missedReasonType", deserialize_with = "deserialize_missed_reason")]
    pub missed_reason: Option<MissedReason>,
    #[serde(default)]
    pub goal_track_id: Option<String>,
}

impl Todo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            done: false,
            due_at: None,
            missed_reason: None,
            goal_track_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_goal_track(mut self, goal_track_id: impl Into<String>) -> Self {
        self.goal_track_id = Some(goal_track_id.into());
        self
    }

    pub fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    pub fn is_linked_to(&self, goal_track_id: &str) -> bool {
        self.goal_track_id.as_deref() == Some(goal_track_id)
    }

    /// Not done and due strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.done && self.due_at.is_some_and(|due| due < now)
    }

    /// Replace the text with an accepted rewrite.
    ///
    /// A rewritten todo is a fresh commitment: its due time and missed
    /// reason no longer apply.
    pub fn apply_rewrite(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.missed_reason = None;
        self.due_at = None;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("Todo id cannot be empty".to_string());
        }
        if self.text.trim().is_empty() {
            return Err("Todo text cannot be empty".to_string());
        }
        Ok(())
    }
}
