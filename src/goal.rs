use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VitalError};

/// Completion ratio toward a goal, always in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoalProgress(Decimal);

impl GoalProgress {
    pub const NONE: GoalProgress = GoalProgress(Decimal::ZERO);
    pub const COMPLETE: GoalProgress = GoalProgress(Decimal::ONE);

    pub fn ratio(&self) -> Decimal {
        self.0
    }

    /// Ratio rounded for display (midpoint away from zero)
    pub fn rounded(&self, dp: u32) -> Decimal {
        self.0
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Whole-number percentage, e.g. `78` for `0.7786`
    pub fn percent(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= Decimal::ONE
    }
}

/// Goal completion calculator
pub struct GoalProgressCalculator;

impl GoalProgressCalculator {
    /// `min(1, value / goal)`, with negative values read as zero
    ///
    /// Fails with `InvalidGoal` for a zero or negative goal rather than
    /// dividing by it.
    pub fn progress(value: Decimal, goal: Decimal) -> Result<GoalProgress> {
        if goal <= Decimal::ZERO {
            return Err(VitalError::InvalidGoal { goal });
        }

        let value = value.max(Decimal::ZERO);
        if value >= goal {
            return Ok(GoalProgress::COMPLETE);
        }

        // value < goal, so the quotient stays below one
        let ratio = value.checked_div(goal).unwrap_or(Decimal::ONE);
        Ok(GoalProgress(ratio.min(Decimal::ONE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_weekly_average_progress() {
        let average = dec!(54500) / dec!(7);
        let progress = GoalProgressCalculator::progress(average, dec!(10000)).unwrap();

        assert_eq!(progress.rounded(4), dec!(0.7786));
        assert_eq!(progress.percent(), dec!(78));
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_progress_clamps_at_one() {
        let progress = GoalProgressCalculator::progress(dec!(25000), dec!(10000)).unwrap();
        assert_eq!(progress, GoalProgress::COMPLETE);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_zero_value_is_zero_progress() {
        let progress = GoalProgressCalculator::progress(Decimal::ZERO, dec!(8)).unwrap();
        assert_eq!(progress, GoalProgress::NONE);
    }

    #[test]
    fn test_tiny_goal_completes_without_overflow() {
        let goal = dec!(0.0000000000000000000000000001);
        let progress = GoalProgressCalculator::progress(dec!(10000), goal).unwrap();
        assert_eq!(progress, GoalProgress::COMPLETE);

        let progress = GoalProgressCalculator::progress(Decimal::MAX, dec!(0.5)).unwrap();
        assert_eq!(progress, GoalProgress::COMPLETE);
    }

    #[test]
    fn test_invalid_goal() {
        for goal in [dec!(0), dec!(-1), dec!(-10000)] {
            let err = GoalProgressCalculator::progress(dec!(5000), goal).unwrap_err();
            assert!(matches!(err, VitalError::InvalidGoal { .. }));
        }
    }

    proptest! {
        #[test]
        fn test_progress_bounded(
            value in -1_000_000i64..10_000_000,
            goal_mantissa in 1i64..1_000_000,
            goal_scale in 0u32..=28,
        ) {
            let goal = Decimal::new(goal_mantissa, goal_scale);
            let progress = GoalProgressCalculator::progress(Decimal::from(value), goal).unwrap();
            prop_assert!(progress.ratio() >= Decimal::ZERO);
            prop_assert!(progress.ratio() <= Decimal::ONE);
        }

        #[test]
        fn test_non_positive_goal_always_fails(value in 0i64..1_000_000, goal in -1_000_000i64..=0) {
            let result = GoalProgressCalculator::progress(Decimal::from(value), Decimal::from(goal));
            let is_invalid_goal = matches!(result, Err(VitalError::InvalidGoal { .. }));
            prop_assert!(is_invalid_goal);
        }
    }
}
