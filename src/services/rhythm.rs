//! Rhythm aggregator.
//!
//! Turns a bag of goal-track events into per-day counts over a trailing
//! window and derives the signals shown on a goal track card: executed
//! days, total actions, gap since the last execution, and dot intensity.
//! Everything here is pure.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DateKey, GoalTrackEvent};

/// Gap (in days) from which the last-executed label turns into a warning.
pub const STALL_WARNING_GAP: usize = 3;

/// Event count of one day in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date_key: DateKey,
    pub count: u32,
}

/// Per-day counts of one goal track over a most-recent-first window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhythmWindow {
    days: Vec<DayCount>,
}

/// Reject windows that are not strictly descending.
pub fn validate_window(keys: &[DateKey]) -> DomainResult<()> {
    if let Some(pair) = keys.windows(2).find(|pair| pair[0] <= pair[1]) {
        return Err(DomainError::ValidationFailed(format!(
            "Date window must be strictly descending, found {} before {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

impl RhythmWindow {
    /// Count events of `goal_track_id` for each key. Keys without events
    /// map to zero; every key is present.
    pub fn build(events: &[GoalTrackEvent], goal_track_id: &str, keys: &[DateKey]) -> DomainResult<Self> {
        validate_window(keys)?;

        let mut by_day: HashMap<DateKey, u32> = HashMap::new();
        for event in events.iter().filter(|e| e.goal_track_id == goal_track_id) {
            *by_day.entry(event.date_key).or_insert(0) += 1;
        }

        let days = keys
            .iter()
            .map(|&date_key| DayCount {
                date_key,
                count: by_day.get(&date_key).copied().unwrap_or(0),
            })
            .collect();

        tracing::debug!(goal_track_id, window = keys.len(), events = events.len(), "built rhythm window");
        Ok(Self { days })
    }

    /// Build a window from counts already aligned with `keys`.
    pub fn from_counts(keys: &[DateKey], counts: &[u32]) -> DomainResult<Self> {
        validate_window(keys)?;
        if keys.len() != counts.len() {
            return Err(DomainError::ValidationFailed(format!(
                "Window has {} keys but {} counts",
                keys.len(),
                counts.len()
            )));
        }
        let days = keys
            .iter()
            .zip(counts)
            .map(|(&date_key, &count)| DayCount { date_key, count })
            .collect();
        Ok(Self { days })
    }

    pub fn days(&self) -> &[DayCount] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Counts in window order (most recent first).
    pub fn counts(&self) -> Vec<u32> {
        self.days.iter().map(|d| d.count).collect()
    }

    pub fn per_day_counts(&self) -> HashMap<DateKey, u32> {
        self.days.iter().map(|d| (d.date_key, d.count)).collect()
    }

    pub fn count_on(&self, key: DateKey) -> u32 {
        self.days.iter().find(|d| d.date_key == key).map_or(0, |d| d.count)
    }

    pub fn executed_day_count(&self) -> usize {
        executed_day_count(&self.counts())
    }

    pub fn total_action_count(&self) -> u32 {
        total_action_count(&self.counts())
    }

    pub fn recent_gap(&self) -> usize {
        recent_gap(&self.counts())
    }

    pub fn last_executed(&self) -> LastExecuted {
        LastExecuted::from_gap(self.recent_gap(), self.len())
    }

    pub fn rhythm_impact(&self) -> RhythmImpact {
        rhythm_impact(&self.counts())
    }
}

/// Days with at least one event.
pub fn executed_day_count(counts: &[u32]) -> usize {
    counts.iter().filter(|&&c| c > 0).count()
}

pub fn total_action_count(counts: &[u32]) -> u32 {
    counts.iter().sum()
}

/// Index of the first executed day, most recent first; `counts.len()`
/// when nothing was executed in the window.
pub fn recent_gap(counts: &[u32]) -> usize {
    counts.iter().position(|&c| c > 0).unwrap_or(counts.len())
}

/// Label for how long ago the goal track was last executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "days")]
pub enum LastExecuted {
    Today,
    Yesterday,
    TwoDaysAgo,
    /// Warning: this many days without execution
    Stalled(usize),
    /// Zero-length window; nothing to report
    NoWindow,
}

impl LastExecuted {
    /// A gap that spans the whole window means nothing was executed in it.
    pub fn from_gap(gap: usize, window: usize) -> Self {
        match gap {
            _ if window == 0 => Self::NoWindow,
            n if n >= window => Self::Stalled(n),
            0 => Self::Today,
            1 => Self::Yesterday,
            2 => Self::TwoDaysAgo,
            n => Self::Stalled(n),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Stalled(_))
    }

    pub fn label(&self) -> String {
        match self {
            Self::Today => "executed today".to_string(),
            Self::Yesterday => "executed yesterday".to_string(),
            Self::TwoDaysAgo => "2 days ago".to_string(),
            Self::Stalled(days) => format!("{days} days with no execution"),
            Self::NoWindow => "no days to show".to_string(),
        }
    }
}

/// Display intensity of a rhythm dot.
///
/// The thresholds are part of the rendering contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DotIntensity {
    /// Neutral gray
    Empty,
    Light,
    Medium,
    Strong,
    Max,
}

impl DotIntensity {
    pub fn opacity(&self) -> f32 {
        match self {
            Self::Empty => 0.0,
            Self::Light => 0.35,
            Self::Medium => 0.55,
            Self::Strong => 0.75,
            Self::Max => 1.0,
        }
    }
}

pub fn dot_intensity(count: u32) -> DotIntensity {
    match count {
        0 => DotIntensity::Empty,
        1 => DotIntensity::Light,
        2 => DotIntensity::Medium,
        3 => DotIntensity::Strong,
        _ => DotIntensity::Max,
    }
}

/// What completing today's todo right now would do to the executed-day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhythmImpact {
    pub current_days: usize,
    pub predicted_days: usize,
}

impl RhythmImpact {
    pub fn adds_day(&self) -> bool {
        self.predicted_days > self.current_days
    }
}

/// What-if projection; `counts[0]` is today.
pub fn rhythm_impact(counts: &[u32]) -> RhythmImpact {
    let current_days = executed_day_count(counts);
    let today_empty = counts.first().is_some_and(|&c| c == 0);
    RhythmImpact {
        current_days,
        predicted_days: if today_empty { current_days + 1 } else { current_days },
    }
}
