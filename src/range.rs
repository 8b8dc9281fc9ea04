//! Range resolution: symbolic range keys to concrete date windows

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VitalError};

/// Symbolic aggregation window selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKey {
    /// 7-day window labelled by weekday
    Week,
    /// 30-day window labelled by day of month
    Month,
    /// 90-day window labelled by week of month
    Quarter,
}

impl RangeKey {
    /// Days subtracted from "today" to reach the window start
    pub fn lookback_days(&self) -> u64 {
        match self {
            RangeKey::Week => 6,
            RangeKey::Month => 29,
            RangeKey::Quarter => 89,
        }
    }

    /// Number of calendar days in the window
    pub fn window_days(&self) -> u64 {
        self.lookback_days() + 1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKey::Week => "week",
            RangeKey::Month => "month",
            RangeKey::Quarter => "quarter",
        }
    }
}

impl fmt::Display for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeKey {
    type Err = VitalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "week" => Ok(RangeKey::Week),
            "month" => Ok(RangeKey::Month),
            "quarter" => Ok(RangeKey::Quarter),
            _ => Err(VitalError::InvalidRangeKey { key: s.to_string() }),
        }
    }
}

/// Inclusive calendar date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Number of days in the window, both ends included
    pub fn len_days(&self) -> usize {
        ((self.end_date - self.start_date).num_days() + 1).max(0) as usize
    }

    /// Every date of the window in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.start_date
            .iter_days()
            .take(self.len_days())
    }
}

/// Converts range keys into date windows and per-date labels
pub struct RangeResolver;

impl RangeResolver {
    /// Resolve a range key against an explicit "today"
    pub fn resolve(key: RangeKey, today: NaiveDate) -> DateWindow {
        let start_date = today
            .checked_sub_days(Days::new(key.lookback_days()))
            .unwrap_or(NaiveDate::MIN);

        DateWindow {
            start_date,
            end_date: today,
        }
    }

    /// Resolve a textual range key, failing fast on unknown keys
    pub fn resolve_str(key: &str, today: NaiveDate) -> Result<DateWindow> {
        let key: RangeKey = key.parse()?;
        Ok(Self::resolve(key, today))
    }

    /// Display label a date receives under the given range
    pub fn label_for(key: RangeKey, date: NaiveDate) -> String {
        match key {
            RangeKey::Week => date.format("%a").to_string(),
            RangeKey::Month => date.day().to_string(),
            RangeKey::Quarter => format!("W{}", week_of_month(date)),
        }
    }
}

/// `ceil(day_of_month / 7)`, in 1..=5
pub fn week_of_month(date: NaiveDate) -> u32 {
    date.day().div_ceil(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_sizes() {
        let today = date(2024, 3, 31);

        let week = RangeResolver::resolve(RangeKey::Week, today);
        assert_eq!(week.start_date, date(2024, 3, 25));
        assert_eq!(week.end_date, today);
        assert_eq!(week.len_days(), 7);

        let month = RangeResolver::resolve(RangeKey::Month, today);
        assert_eq!(month.start_date, date(2024, 3, 2));
        assert_eq!(month.len_days(), 30);

        let quarter = RangeResolver::resolve(RangeKey::Quarter, today);
        assert_eq!(quarter.start_date, date(2024, 1, 2));
        assert_eq!(quarter.len_days(), 90);
    }

    #[test]
    fn test_window_crosses_leap_day() {
        let week = RangeResolver::resolve(RangeKey::Week, date(2024, 3, 3));
        assert_eq!(week.start_date, date(2024, 2, 26));
        assert!(week.contains(date(2024, 2, 29)));
        assert_eq!(week.dates().count(), 7);
    }

    #[test]
    fn test_unknown_range_key_fails() {
        let err = RangeResolver::resolve_str("year", date(2024, 3, 3)).unwrap_err();
        assert!(matches!(err, VitalError::InvalidRangeKey { key } if key == "year"));

        assert!("Week".parse::<RangeKey>().is_err());
        assert_eq!("quarter".parse::<RangeKey>().unwrap(), RangeKey::Quarter);
    }

    #[test]
    fn test_labels() {
        // 2024-03-04 is a Monday
        assert_eq!(RangeResolver::label_for(RangeKey::Week, date(2024, 3, 4)), "Mon");
        assert_eq!(RangeResolver::label_for(RangeKey::Month, date(2024, 3, 4)), "4");
        assert_eq!(RangeResolver::label_for(RangeKey::Quarter, date(2024, 3, 4)), "W1");
        assert_eq!(RangeResolver::label_for(RangeKey::Quarter, date(2024, 3, 7)), "W1");
        assert_eq!(RangeResolver::label_for(RangeKey::Quarter, date(2024, 3, 8)), "W2");
        assert_eq!(RangeResolver::label_for(RangeKey::Quarter, date(2024, 3, 31)), "W5");
    }
}
