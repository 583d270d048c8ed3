//! Calendar-day key used to bucket events, todos and routine completions.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A calendar day in the home timezone, rendered as `YYYY-MM-DD`.
///
/// Ordering is chronological, so a most-recent-first window is a strictly
/// descending sequence of keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a key from year/month/day, rejecting impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DomainError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidDateKey(format!("{year:04}-{month:02}-{day:02}")))
    }

    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// The key `days` days earlier (negative values move forward).
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Monday of the week containing this day.
    pub fn week_start(&self) -> Self {
        let offset = i64::from(self.0.weekday().num_days_from_monday());
        self.minus_days(offset)
    }

    /// Signed number of calendar days from `self` to `later`.
    pub fn days_until(&self, later: Self) -> i64 {
        (later.0 - self.0).num_days()
    }

    pub fn is_same_month(&self, other: Self) -> bool {
        self.0.year() == other.0.year() && self.0.month() == other.0.month()
    }

    pub fn day_of_month(&self) -> u32 {
        self.0.day()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded fields; keys must be exactly 10 chars.
        if s.len() != 10 {
            return Err(DomainError::InvalidDateKey(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| DomainError::InvalidDateKey(s.to_string()))
    }
}

impl TryFrom<String> for DateKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}
