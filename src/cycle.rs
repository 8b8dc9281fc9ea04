//! Menstrual cycle day prediction
//!
//! Predictions are framed as "days until the next period starts". The
//! likelihood label classifies that same number, so both values a screen
//! shows always come from one computation.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VitalError};
use crate::models::CycleRecord;

/// At or below this many days until the next start the label is "High chance"
pub const HIGH_CHANCE_MAX_DAYS: u32 = 5;
/// At or below this many days (and above the high cutoff) the label is "Moderate chance"
pub const MODERATE_CHANCE_MAX_DAYS: u32 = 10;

/// Tunable likelihood cutoffs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePolicy {
    pub high_chance_max_days: u32,
    pub moderate_chance_max_days: u32,
}

impl Default for CyclePolicy {
    fn default() -> Self {
        CyclePolicy {
            high_chance_max_days: HIGH_CHANCE_MAX_DAYS,
            moderate_chance_max_days: MODERATE_CHANCE_MAX_DAYS,
        }
    }
}

/// Qualitative conception-likelihood label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConceptionLikelihood {
    High,
    Moderate,
    Low,
}

impl fmt::Display for ConceptionLikelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConceptionLikelihood::High => write!(f, "High chance"),
            ConceptionLikelihood::Moderate => write!(f, "Moderate chance"),
            ConceptionLikelihood::Low => write!(f, "Low chance"),
        }
    }
}

/// Predicted position within the current cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleForecast {
    /// Days until the next predicted start, in `[0, length - 1]`
    pub days_until_next: u32,

    /// `today + days_until_next`
    pub next_start: NaiveDate,

    /// 1-based day within the current cycle
    pub cycle_day: u32,

    pub likelihood: ConceptionLikelihood,
}

/// Outcome of a prediction; `Unavailable` when the user has no cycle data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePrediction {
    Predicted(CycleForecast),
    Unavailable,
}

impl CyclePrediction {
    pub fn forecast(&self) -> Option<&CycleForecast> {
        match self {
            CyclePrediction::Predicted(forecast) => Some(forecast),
            CyclePrediction::Unavailable => None,
        }
    }

    pub fn days_until_next(&self) -> Option<u32> {
        self.forecast().map(|f| f.days_until_next)
    }

    /// Convert `Unavailable` into [`VitalError::CycleDataUnavailable`]
    pub fn require(self) -> Result<CycleForecast> {
        match self {
            CyclePrediction::Predicted(forecast) => Ok(forecast),
            CyclePrediction::Unavailable => Err(VitalError::CycleDataUnavailable),
        }
    }
}

/// Cycle predictor parameterized by a [`CyclePolicy`]
#[derive(Debug, Clone, Default)]
pub struct CyclePredictor {
    policy: CyclePolicy,
}

impl CyclePredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CyclePolicy) -> Self {
        CyclePredictor { policy }
    }

    /// Predict the next cycle start relative to `today`
    ///
    /// `days_until_next = (L - elapsed mod L) mod L`, so the day a period is
    /// due reads as 0 rather than a full cycle away. A start date after
    /// `today` wraps the same way.
    pub fn predict(&self, record: Option<&CycleRecord>, today: NaiveDate) -> CyclePrediction {
        let Some(record) = record else {
            return CyclePrediction::Unavailable;
        };
        if record.average_length_days == 0 {
            return CyclePrediction::Unavailable;
        }

        let length = i64::from(record.average_length_days);
        let elapsed = (today - record.start_date).num_days();
        let position = elapsed.rem_euclid(length);
        let days_until_next = ((length - position) % length).max(0) as u32;

        let next_start = today
            .checked_add_days(Days::new(u64::from(days_until_next)))
            .unwrap_or(NaiveDate::MAX);

        CyclePrediction::Predicted(CycleForecast {
            days_until_next,
            next_start,
            cycle_day: position as u32 + 1,
            likelihood: self.classify(days_until_next),
        })
    }

    /// Likelihood label for a days-until-next value
    pub fn classify(&self, days_until_next: u32) -> ConceptionLikelihood {
        if days_until_next <= self.policy.high_chance_max_days {
            ConceptionLikelihood::High
        } else if days_until_next <= self.policy.moderate_chance_max_days {
            ConceptionLikelihood::Moderate
        } else {
            ConceptionLikelihood::Low
        }
    }
}
