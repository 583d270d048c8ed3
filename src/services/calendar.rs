//! Calendar/date utilities pinned to a fixed home timezone.
//!
//! Every date key is computed in the home zone, never the host's local
//! zone, so two machines bucket the same instant into the same day.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc, Weekday};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DateKey;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Date arithmetic in the home timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Build from a UTC offset in minutes, e.g. `540` for UTC+9.
    pub fn from_offset_minutes(minutes: i32) -> DomainResult<Self> {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(DomainError::ValidationFailed(format!(
                "UTC offset {minutes} minutes is outside ±{MAX_OFFSET_MINUTES}"
            )));
        }
        FixedOffset::east_opt(minutes * 60)
            .map(Self::new)
            .ok_or_else(|| DomainError::ValidationFailed(format!("Invalid UTC offset: {minutes} minutes")))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Day containing `instant` in the home zone.
    pub fn date_key(&self, instant: DateTime<Utc>) -> DateKey {
        DateKey::new(instant.with_timezone(&self.offset).date_naive())
    }

    /// Alias of [`Calendar::date_key`] for call sites that mean "now".
    pub fn today(&self, now: DateTime<Utc>) -> DateKey {
        self.date_key(now)
    }

    /// Monday of the home-zone week containing `instant`.
    pub fn week_start_key(&self, instant: DateTime<Utc>) -> DateKey {
        self.date_key(instant).week_start()
    }

    /// The last `n` days, today first, strictly descending.
    pub fn last_n_date_keys(&self, now: DateTime<Utc>, n: usize) -> Vec<DateKey> {
        let today = self.date_key(now);
        (0..n).map(|i| today.minus_days(i as i64)).collect()
    }

    /// Week starts of the last `n` weeks, current week first, deduplicated.
    pub fn week_start_keys_for_last_n_weeks(&self, now: DateTime<Utc>, n: usize) -> Vec<DateKey> {
        let current = self.week_start_key(now);
        let mut keys: Vec<DateKey> = Vec::with_capacity(n);
        for i in 0..n {
            let key = current.minus_days(7 * i as i64).week_start();
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Signed calendar-day difference from `from` to `to`.
    pub fn days_between(from: DateKey, to: DateKey) -> i64 {
        from.days_until(to)
    }
}

/// Short English weekday label for a key.
pub fn weekday_label(key: DateKey) -> &'static str {
    match key.date().weekday() {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn seoul() -> Calendar {
        Calendar::from_offset_minutes(540).unwrap()
    }

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_date_key_uses_home_zone() {
        // 2024-01-01 16:30 UTC is already 2024-01-02 in UTC+9
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 16, 30, 0).unwrap();
        assert_eq!(seoul().date_key(instant), key("2024-01-02"));
        assert_eq!(Calendar::utc().date_key(instant), key("2024-01-01"));
    }

    #[test]
    fn test_week_start_key_is_monday() {
        // Sunday 2024-01-07 22:00 UTC is Monday 2024-01-08 in UTC+9
        let instant = Utc.with_ymd_and_hms(2024, 1, 7, 22, 0, 0).unwrap();
        assert_eq!(seoul().week_start_key(instant), key("2024-01-08"));
        assert_eq!(Calendar::utc().week_start_key(instant), key("2024-01-01"));
    }

    #[test]
    fn test_last_n_date_keys_descending() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 3, 0, 0).unwrap();
        let keys = Calendar::utc().last_n_date_keys(now, 4);
        assert_eq!(keys, vec![key("2024-03-02"), key("2024-03-01"), key("2024-02-29"), key("2024-02-28")]);
        assert!(Calendar::utc().last_n_date_keys(now, 0).is_empty());
    }

    #[test]
    fn test_week_starts_deduplicated() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let weeks = Calendar::utc().week_start_keys_for_last_n_weeks(now, 3);
        assert_eq!(weeks, vec![key("2024-01-08"), key("2024-01-01"), key("2023-12-25")]);
    }

    #[test]
    fn test_offset_bounds() {
        assert!(Calendar::from_offset_minutes(-14 * 60).is_ok());
        assert!(Calendar::from_offset_minutes(15 * 60).is_err());
    }

    #[test]
    fn test_weekday_label_and_days_between() {
        assert_eq!(weekday_label(key("2024-01-01")), "Mon");
        assert_eq!(weekday_label(key("2024-01-07")), "Sun");
        assert_eq!(Calendar::days_between(key("2024-01-01"), key("2024-01-04")), 3);
    }
}
