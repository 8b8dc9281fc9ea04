//! Sleep quality classification and deep-sleep estimation
//!
//! Quality bands are fixed thresholds over the average nightly duration:
//!
//! | Average hours | Band      |
//! |---------------|-----------|
//! | `< 6`         | Poor      |
//! | `[6, 7)`      | Fair      |
//! | `[7, 8)`      | Good      |
//! | `>= 8`        | Excellent |
//!
//! Deep sleep is estimated as a fixed share of total sleep. Both the band
//! edges and the ratio live in [`SleepPolicy`] so they can be tuned from
//! configuration.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::SleepSchedule;

/// Below this average a night is Poor
pub const FAIR_SLEEP_MIN_HOURS: Decimal = dec!(6);
/// Below this average a night is Fair
pub const GOOD_SLEEP_MIN_HOURS: Decimal = dec!(7);
/// At or above this average a night is Excellent
pub const EXCELLENT_SLEEP_MIN_HOURS: Decimal = dec!(8);
/// Share of total sleep spent in deep sleep
pub const DEEP_SLEEP_RATIO: Decimal = dec!(0.25);

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Tunable sleep classification policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepPolicy {
    pub fair_min_hours: Decimal,
    pub good_min_hours: Decimal,
    pub excellent_min_hours: Decimal,
    pub deep_sleep_ratio: Decimal,
}

impl Default for SleepPolicy {
    fn default() -> Self {
        SleepPolicy {
            fair_min_hours: FAIR_SLEEP_MIN_HOURS,
            good_min_hours: GOOD_SLEEP_MIN_HOURS,
            excellent_min_hours: EXCELLENT_SLEEP_MIN_HOURS,
            deep_sleep_ratio: DEEP_SLEEP_RATIO,
        }
    }
}

impl SleepPolicy {
    /// Thresholds must ascend and the ratio must be a share in `[0, 1]`
    pub fn is_consistent(&self) -> bool {
        self.fair_min_hours <= self.good_min_hours
            && self.good_min_hours <= self.excellent_min_hours
            && self.deep_sleep_ratio >= Decimal::ZERO
            && self.deep_sleep_ratio <= Decimal::ONE
    }
}

/// Sleep quality band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SleepQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl fmt::Display for SleepQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SleepQuality::Poor => write!(f, "Poor"),
            SleepQuality::Fair => write!(f, "Fair"),
            SleepQuality::Good => write!(f, "Good"),
            SleepQuality::Excellent => write!(f, "Excellent"),
        }
    }
}

/// Estimated deep-sleep duration, one decimal place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepSleepEstimate {
    pub hours: Decimal,
}

impl fmt::Display for DeepSleepEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}h", self.hours)
    }
}

/// Everything a sleep screen shows for one averaged period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepInsight {
    pub average_hours: Decimal,
    pub quality: SleepQuality,
    pub deep_sleep: DeepSleepEstimate,
}

/// Sleep classifier parameterized by a [`SleepPolicy`]
#[derive(Debug, Clone, Default)]
pub struct SleepQualityEvaluator {
    policy: SleepPolicy,
}

impl SleepQualityEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SleepPolicy) -> Self {
        SleepQualityEvaluator { policy }
    }

    pub fn policy(&self) -> &SleepPolicy {
        &self.policy
    }

    /// Quality band for an average nightly duration; negative reads as zero
    pub fn classify(&self, average_hours: Decimal) -> SleepQuality {
        let hours = average_hours.max(Decimal::ZERO);
        if hours >= self.policy.excellent_min_hours {
            SleepQuality::Excellent
        } else if hours >= self.policy.good_min_hours {
            SleepQuality::Good
        } else if hours >= self.policy.fair_min_hours {
            SleepQuality::Fair
        } else {
            SleepQuality::Poor
        }
    }

    pub fn deep_sleep(&self, average_hours: Decimal) -> DeepSleepEstimate {
        let hours = (average_hours.max(Decimal::ZERO) * self.policy.deep_sleep_ratio)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        DeepSleepEstimate { hours }
    }

    pub fn evaluate(&self, average_hours: Decimal) -> SleepInsight {
        SleepInsight {
            average_hours: average_hours.max(Decimal::ZERO),
            quality: self.classify(average_hours),
            deep_sleep: self.deep_sleep(average_hours),
        }
    }
}

impl SleepSchedule {
    /// Planned hours in bed; a wake time before the bedtime spans midnight
    pub fn scheduled_hours(&self) -> Decimal {
        let bed = self.bedtime.minutes_from_midnight();
        let wake = self.wakeup_time.minutes_from_midnight();
        let minutes = if wake < bed {
            wake + MINUTES_PER_DAY - bed
        } else {
            wake - bed
        };
        Decimal::from(minutes) / Decimal::from(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_bands() {
        let evaluator = SleepQualityEvaluator::new();

        assert_eq!(evaluator.classify(dec!(0)), SleepQuality::Poor);
        assert_eq!(evaluator.classify(dec!(5.99)), SleepQuality::Poor);
        assert_eq!(evaluator.classify(dec!(6)), SleepQuality::Fair);
        assert_eq!(evaluator.classify(dec!(6.9)), SleepQuality::Fair);
        assert_eq!(evaluator.classify(dec!(7)), SleepQuality::Good);
        assert_eq!(evaluator.classify(dec!(7.9)), SleepQuality::Good);
        assert_eq!(evaluator.classify(dec!(8.0)), SleepQuality::Excellent);
        assert_eq!(evaluator.classify(dec!(11)), SleepQuality::Excellent);
    }

    #[test]
    fn test_deep_sleep_estimate() {
        let evaluator = SleepQualityEvaluator::new();

        assert_eq!(evaluator.deep_sleep(dec!(7.5)).hours, dec!(1.9));
        assert_eq!(evaluator.deep_sleep(dec!(7.5)).to_string(), "1.9h");
        assert_eq!(evaluator.deep_sleep(dec!(8)).to_string(), "2.0h");
        assert_eq!(evaluator.deep_sleep(dec!(1)).to_string(), "0.3h");
        assert_eq!(evaluator.deep_sleep(dec!(0)).to_string(), "0.0h");
    }

    #[test]
    fn test_custom_policy() {
        let evaluator = SleepQualityEvaluator::with_policy(SleepPolicy {
            excellent_min_hours: dec!(9),
            deep_sleep_ratio: dec!(0.2),
            ..SleepPolicy::default()
        });

        assert_eq!(evaluator.classify(dec!(8.5)), SleepQuality::Good);
        assert_eq!(evaluator.deep_sleep(dec!(8)).hours, dec!(1.6));
        assert!(evaluator.policy().is_consistent());
    }

    #[test]
    fn test_inconsistent_policy() {
        let policy = SleepPolicy {
            fair_min_hours: dec!(7.5),
            ..SleepPolicy::default()
        };
        assert!(!policy.is_consistent());
    }

    #[test]
    fn test_scheduled_hours() {
        let overnight = SleepSchedule::parse("22:30", "06:45").unwrap();
        assert_eq!(overnight.scheduled_hours(), dec!(8.25));

        let nap = SleepSchedule::parse("13:00", "14:30").unwrap();
        assert_eq!(nap.scheduled_hours(), dec!(1.5));

        let same = SleepSchedule::parse("23:00", "23:00").unwrap();
        assert_eq!(same.scheduled_hours(), Decimal::ZERO);
    }

    #[test]
    fn test_evaluate() {
        let insight = SleepQualityEvaluator::new().evaluate(dec!(6.4));
        assert_eq!(insight.quality, SleepQuality::Fair);
        assert_eq!(insight.deep_sleep.hours, dec!(1.6));
        assert_eq!(insight.quality.to_string(), "Fair");
    }
}
