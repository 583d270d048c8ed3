//! Weekly coach rule engine.
//!
//! Produces a fact line, a pattern label and a next action from the last
//! seven days of rhythm counts. The output is total: every input yields a
//! well-formed [`CoachAdvice`].

use serde::{Deserialize, Serialize};

use crate::domain::models::CoachConfig;
use crate::services::rhythm::{executed_day_count, recent_gap, STALL_WARNING_GAP};

/// Days the coach looks back over.
pub const COACH_WINDOW_DAYS: usize = 7;

const RECENT_DAYS: usize = 3;
const LOW_FREQUENCY_MAX_DAYS: usize = 2;
const ELLIPSIS: char = '…';
const TODAY_PREFIX: &str = "Today, ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachPattern {
    NoExecution,
    LowFrequency,
    LateWeekGap,
    Steady,
}

impl CoachPattern {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoExecution => "no execution",
            Self::LowFrequency => "low frequency",
            Self::LateWeekGap => "late-week gap",
            Self::Steady => "steady",
        }
    }
}

/// Fact, pattern and action for one weekly review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachAdvice {
    pub fact: String,
    pub pattern: CoachPattern,
    pub action: String,
}

/// Seven counts, most recent first. Short input is zero-padded, long
/// input truncated.
fn weekly_counts(counts: &[u32]) -> [u32; COACH_WINDOW_DAYS] {
    let mut week = [0; COACH_WINDOW_DAYS];
    for (slot, &count) in week.iter_mut().zip(counts) {
        *slot = count;
    }
    week
}

pub fn coach_fact(executed_days: usize) -> String {
    format!("executed {executed_days} of the last {COACH_WINDOW_DAYS} days")
}

/// Decision table, first match wins.
pub fn coach_pattern(counts: &[u32]) -> CoachPattern {
    let week = weekly_counts(counts);
    let executed = executed_day_count(&week);
    if executed == 0 {
        return CoachPattern::NoExecution;
    }
    if executed <= LOW_FREQUENCY_MAX_DAYS {
        return CoachPattern::LowFrequency;
    }
    let recent: u32 = week[..RECENT_DAYS].iter().sum();
    let older: u32 = week[RECENT_DAYS..].iter().sum();
    if (recent == 0 && older > 0) || recent_gap(&week) >= STALL_WARNING_GAP {
        return CoachPattern::LateWeekGap;
    }
    CoachPattern::Steady
}

/// Bound free-text action to something that fits a small card.
pub fn sanitize_action(raw: &str, config: &CoachConfig) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let text = if collapsed.is_empty() {
        config.default_action.clone()
    } else {
        collapsed
    };

    let nudged = if text.chars().count() < config.min_action_chars
        && !text.to_lowercase().contains("today")
    {
        format!("{TODAY_PREFIX}{text}")
    } else {
        text
    };

    if nudged.chars().count() > config.max_action_chars {
        let kept: String = nudged.chars().take(config.max_action_chars.saturating_sub(1)).collect();
        format!("{}{ELLIPSIS}", kept.trim_end())
    } else {
        nudged
    }
}

/// Rule engine for weekly coaching.
#[derive(Debug, Clone, Default)]
pub struct WeeklyCoach {
    config: CoachConfig,
}

impl WeeklyCoach {
    pub fn new(config: CoachConfig) -> Self {
        Self { config }
    }

    /// `counts` are the last seven days, most recent first. The action is
    /// the submitted one, else `fallback_action`, else the default.
    pub fn advise(&self, counts: &[u32], next_action: Option<&str>, fallback_action: Option<&str>) -> CoachAdvice {
        let week = weekly_counts(counts);
        let chosen = [next_action, fallback_action]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or(self.config.default_action.as_str());

        let advice = CoachAdvice {
            fact: coach_fact(executed_day_count(&week)),
            pattern: coach_pattern(&week),
            action: sanitize_action(chosen, &self.config),
        };
        tracing::debug!(pattern = advice.pattern.label(), "weekly coach advice");
        advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_table() {
        assert_eq!(coach_pattern(&[0, 0, 0, 0, 0, 0, 0]), CoachPattern::NoExecution);
        assert_eq!(coach_pattern(&[1, 0, 0, 0, 0, 3, 0]), CoachPattern::LowFrequency);
        assert_eq!(coach_pattern(&[0, 0, 0, 1, 1, 1, 1]), CoachPattern::LateWeekGap);
        assert_eq!(coach_pattern(&[1, 1, 1, 0, 0, 0, 0]), CoachPattern::Steady);
        assert_eq!(coach_pattern(&[2, 0, 1, 1, 0, 1, 0]), CoachPattern::Steady);
    }

    #[test]
    fn test_late_week_gap_is_about_recent_emptiness() {
        // recent3 = 3, older4 = 0: activity is recent, not a gap
        assert_ne!(coach_pattern(&[1, 1, 1, 0, 0, 0, 0]), CoachPattern::LateWeekGap);
        // recent3 = 0, older4 > 0
        assert_eq!(coach_pattern(&[0, 0, 0, 2, 0, 1, 1]), CoachPattern::LateWeekGap);
    }

    #[test]
    fn test_pattern_pads_short_input() {
        assert_eq!(coach_pattern(&[]), CoachPattern::NoExecution);
        assert_eq!(coach_pattern(&[1, 1, 1]), CoachPattern::Steady);
        assert_eq!(coach_pattern(&[0, 0, 0, 1, 1, 1, 1, 9, 9]), CoachPattern::LateWeekGap);
    }

    #[test]
    fn test_fact_line() {
        let coach = WeeklyCoach::default();
        let advice = coach.advise(&[1, 0, 2, 0, 0, 1, 0], Some("Walk after lunch every weekday"), None);
        assert_eq!(advice.fact, "executed 3 of the last 7 days");
    }

    #[test]
    fn test_action_fallback_order() {
        let coach = WeeklyCoach::default();
        let long_rule = "Stretch for ten minutes after waking up";
        assert_eq!(coach.advise(&[], Some(long_rule), Some("ignored fallback text here")).action, long_rule);
        assert_eq!(coach.advise(&[], Some("   "), Some(long_rule)).action, long_rule);
        assert_eq!(coach.advise(&[], None, None).action, "do one action today");
    }

    #[test]
    fn test_short_action_gets_today_prefix() {
        let config = CoachConfig::default();
        assert_eq!(sanitize_action("read", &config), "Today, read");
        assert_eq!(sanitize_action("today read", &config), "today read");
        let exactly_twenty = "a".repeat(20);
        assert_eq!(sanitize_action(&exactly_twenty, &config), exactly_twenty);
    }

    #[test]
    fn test_long_action_truncated_with_ellipsis() {
        let config = CoachConfig::default();
        let long = "x".repeat(200);
        let sanitized = sanitize_action(&long, &config);
        assert_eq!(sanitized.chars().count(), 80);
        assert!(sanitized.ends_with('…'));

        let exactly_eighty = "y".repeat(80);
        assert_eq!(sanitize_action(&exactly_eighty, &config), exactly_eighty);
    }

    #[test]
    fn test_action_whitespace_collapsed() {
        let config = CoachConfig::default();
        assert_eq!(
            sanitize_action("  walk   the dog\n before breakfast ", &config),
            "walk the dog before breakfast"
        );
    }
}
