use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VitalError};

/// Default menstrual cycle length when none has been recorded
pub const DEFAULT_CYCLE_LENGTH_DAYS: u32 = 28;

/// Identifier of a user in the remote record store
pub type UserId = String;

/// One row of activity and sleep measurements for a calendar date
///
/// Any measurement may be absent. Absent and negative values both read as
/// zero during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar date of the measurements
    pub date: NaiveDate,

    /// Step count for the day
    #[serde(default)]
    pub steps: Option<Decimal>,

    /// Active calories burned (kcal)
    #[serde(default)]
    pub calories: Option<Decimal>,

    /// Average heart rate (bpm)
    #[serde(default, alias = "heartRate")]
    pub heart_rate: Option<Decimal>,

    /// Hours slept the night ending on this date
    #[serde(default, alias = "sleepHours")]
    pub sleep_hours: Option<Decimal>,
}

impl DailyRecord {
    /// Record with every measurement absent
    pub fn empty(date: NaiveDate) -> Self {
        DailyRecord {
            date,
            steps: None,
            calories: None,
            heart_rate: None,
            sleep_hours: None,
        }
    }

    /// Record with every measurement explicitly zero
    pub fn zeroed(date: NaiveDate) -> Self {
        DailyRecord {
            date,
            steps: Some(Decimal::ZERO),
            calories: Some(Decimal::ZERO),
            heart_rate: Some(Decimal::ZERO),
            sleep_hours: Some(Decimal::ZERO),
        }
    }

    /// Value of the selected field, with absent and negative values read as zero
    pub fn value(&self, metric: Metric) -> Decimal {
        let raw = match metric {
            Metric::Steps => self.steps,
            Metric::Calories => self.calories,
            Metric::HeartRate => self.heart_rate,
            Metric::SleepHours => self.sleep_hours,
        };
        raw.unwrap_or(Decimal::ZERO).max(Decimal::ZERO)
    }
}

/// Numeric field selector for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Steps,
    Calories,
    HeartRate,
    SleepHours,
}

impl Metric {
    /// Whether daily values add up meaningfully (steps, calories) or are
    /// rates that must be averaged (heart rate, sleep hours)
    pub fn is_additive(&self) -> bool {
        matches!(self, Metric::Steps | Metric::Calories)
    }

    /// Display unit
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Steps => "steps",
            Metric::Calories => "kcal",
            Metric::HeartRate => "bpm",
            Metric::SleepHours => "h",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Steps => write!(f, "steps"),
            Metric::Calories => write!(f, "calories"),
            Metric::HeartRate => write!(f, "heartRate"),
            Metric::SleepHours => write!(f, "sleepHours"),
        }
    }
}

impl FromStr for Metric {
    type Err = VitalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "steps" => Ok(Metric::Steps),
            "calories" => Ok(Metric::Calories),
            "heartrate" | "hr" => Ok(Metric::HeartRate),
            "sleephours" | "sleep" => Ok(Metric::SleepHours),
            _ => Err(VitalError::Validation(format!("Unknown metric: {}", s))),
        }
    }
}

/// Most recent menstrual cycle entry for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Date the most recent period began
    #[serde(alias = "startDate")]
    pub start_date: NaiveDate,

    /// Average cycle length in days, always positive
    #[serde(
        default = "default_cycle_length",
        alias = "averageLengthDays",
        deserialize_with = "deserialize_cycle_length"
    )]
    pub average_length_days: u32,
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH_DAYS
}

fn deserialize_cycle_length<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let length = Option::<u32>::deserialize(deserializer)?;
    match length {
        None => Ok(DEFAULT_CYCLE_LENGTH_DAYS),
        Some(0) => Err(serde::de::Error::custom(
            "average cycle length must be positive",
        )),
        Some(days) => Ok(days),
    }
}

impl CycleRecord {
    /// Create a cycle record, rejecting a zero length
    pub fn new(start_date: NaiveDate, average_length_days: u32) -> Result<Self> {
        if average_length_days == 0 {
            return Err(VitalError::Validation(
                "Average cycle length must be positive".to_string(),
            ));
        }
        Ok(CycleRecord {
            start_date,
            average_length_days,
        })
    }

    /// Create a cycle record with the default 28-day length
    pub fn with_default_length(start_date: NaiveDate) -> Self {
        CycleRecord {
            start_date,
            average_length_days: DEFAULT_CYCLE_LENGTH_DAYS,
        }
    }
}

/// Wall-clock time of day in `HH:MM` 24-hour form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(TimeOfDay)
            .ok_or_else(|| VitalError::Validation(format!("Invalid time: {:02}:{:02}", hour, minute)))
    }

    /// Minutes since midnight
    pub fn minutes_from_midnight(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }
}

impl FromStr for TimeOfDay {
    type Err = VitalError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(TimeOfDay)
            .map_err(|_| VitalError::Validation(format!("Invalid time (expected HH:MM): {}", s)))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// User's configured bed and wake times
///
/// No ordering is enforced: a wake time earlier than the bedtime is an
/// overnight span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSchedule {
    pub bedtime: TimeOfDay,
    #[serde(alias = "wakeupTime")]
    pub wakeup_time: TimeOfDay,
}

impl SleepSchedule {
    pub fn new(bedtime: TimeOfDay, wakeup_time: TimeOfDay) -> Self {
        SleepSchedule {
            bedtime,
            wakeup_time,
        }
    }

    /// Parse `HH:MM` bed and wake strings
    pub fn parse(bedtime: &str, wakeup_time: &str) -> Result<Self> {
        Ok(SleepSchedule {
            bedtime: bedtime.parse()?,
            wakeup_time: wakeup_time.parse()?,
        })
    }
}
