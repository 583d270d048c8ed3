//! Completion-ratio aggregator.
//!
//! Works from the planned todo lists rather than the event ledger, so it
//! also sees goal-linked todos that were never executed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DateKey, Todo};
use crate::services::rhythm::validate_window;

/// Done/total of goal-linked todos on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRatio {
    pub date_key: DateKey,
    pub done: u32,
    pub total: u32,
}

impl DayRatio {
    /// Fraction done, `None` when nothing was planned.
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| f64::from(self.done) / f64::from(self.total))
    }

    pub fn style(&self) -> RatioStyle {
        ratio_style(self.done, self.total)
    }
}

/// Display style of a ratio dot.
///
/// `NotPlanned` (no linked todos) is deliberately distinct from `Missed`
/// (linked todos, none done).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioStyle {
    NotPlanned,
    Missed,
    /// Under half done
    Partial,
    /// At least half, not all
    MostlyDone,
    Complete,
}

pub fn ratio_style(done: u32, total: u32) -> RatioStyle {
    if total == 0 {
        RatioStyle::NotPlanned
    } else if done == 0 {
        RatioStyle::Missed
    } else if done >= total {
        RatioStyle::Complete
    } else if done * 2 < total {
        RatioStyle::Partial
    } else {
        RatioStyle::MostlyDone
    }
}

/// Per-day done/total for `goal_track_id`, one entry per key in order.
pub fn completion_ratios(
    todos_by_day: &HashMap<DateKey, Vec<Todo>>,
    goal_track_id: &str,
    keys: &[DateKey],
) -> DomainResult<Vec<DayRatio>> {
    validate_window(keys)?;

    Ok(keys
        .iter()
        .map(|&date_key| {
            let linked = todos_by_day
                .get(&date_key)
                .map(|todos| todos.iter().filter(|t| t.is_linked_to(goal_track_id)).collect::<Vec<_>>())
                .unwrap_or_default();
            DayRatio {
                date_key,
                done: linked.iter().filter(|t| t.done).count() as u32,
                total: linked.len() as u32,
            }
        })
        .collect())
}

/// Totals over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioSummary {
    pub done: u32,
    pub total: u32,
    /// Days with at least one linked todo
    pub planned_days: u32,
    /// Days where every linked todo was done
    pub complete_days: u32,
}

pub fn summarize(ratios: &[DayRatio]) -> RatioSummary {
    ratios.iter().fold(RatioSummary::default(), |mut acc, day| {
        acc.done += day.done;
        acc.total += day.total;
        if day.total > 0 {
            acc.planned_days += 1;
        }
        if day.style() == RatioStyle::Complete {
            acc.complete_days += 1;
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_ratios_count_only_linked_todos() {
        let mut by_day = HashMap::new();
        by_day.insert(
            key("2024-06-03"),
            vec![
                Todo::new("a").with_goal_track("g1").with_done(true),
                Todo::new("b").with_goal_track("g1"),
                Todo::new("c").with_goal_track("g2").with_done(true),
                Todo::new("d").with_done(true),
            ],
        );
        by_day.insert(key("2024-06-01"), vec![Todo::new("e").with_goal_track("g1")]);

        let keys = vec![key("2024-06-03"), key("2024-06-02"), key("2024-06-01")];
        let ratios = completion_ratios(&by_day, "g1", &keys).unwrap();

        assert_eq!(ratios.len(), 3);
        assert_eq!((ratios[0].done, ratios[0].total), (1, 2));
        assert_eq!((ratios[1].done, ratios[1].total), (0, 0));
        assert_eq!((ratios[2].done, ratios[2].total), (0, 1));
        assert_eq!(ratios[1].style(), RatioStyle::NotPlanned);
        assert_eq!(ratios[2].style(), RatioStyle::Missed);
        assert_eq!(ratios[1].ratio(), None);
    }

    #[test]
    fn test_ratio_styles() {
        assert_eq!(ratio_style(0, 0), RatioStyle::NotPlanned);
        assert_eq!(ratio_style(0, 3), RatioStyle::Missed);
        assert_eq!(ratio_style(1, 3), RatioStyle::Partial);
        assert_eq!(ratio_style(2, 4), RatioStyle::MostlyDone);
        assert_eq!(ratio_style(3, 3), RatioStyle::Complete);
    }

    #[test]
    fn test_summarize() {
        let ratios = vec![
            DayRatio { date_key: key("2024-06-03"), done: 2, total: 2 },
            DayRatio { date_key: key("2024-06-02"), done: 0, total: 0 },
            DayRatio { date_key: key("2024-06-01"), done: 1, total: 3 },
        ];
        let summary = summarize(&ratios);
        assert_eq!(summary, RatioSummary { done: 3, total: 5, planned_days: 2, complete_days: 1 });
    }
}
