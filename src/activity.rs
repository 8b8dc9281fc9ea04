//! Step conversions and body mass index

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VitalError};

/// Kilometres covered per step (0.762 m stride)
pub const KM_PER_STEP: Decimal = dec!(0.000762);
/// Active kilocalories burned per step
pub const KCAL_PER_STEP: Decimal = dec!(0.04);

pub const BMI_NORMAL_MIN: Decimal = dec!(18.5);
pub const BMI_OVERWEIGHT_MIN: Decimal = dec!(25);
pub const BMI_OBESE_MIN: Decimal = dec!(30);

/// Per-step conversion constants shared by every screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConstants {
    pub km_per_step: Decimal,
    pub kcal_per_step: Decimal,
}

impl Default for ActivityConstants {
    fn default() -> Self {
        ActivityConstants {
            km_per_step: KM_PER_STEP,
            kcal_per_step: KCAL_PER_STEP,
        }
    }
}

impl ActivityConstants {
    /// Distance walked in kilometres, two decimals
    pub fn distance_km(&self, steps: Decimal) -> Decimal {
        (steps.max(Decimal::ZERO) * self.km_per_step)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Calories burned by walking, whole kilocalories
    pub fn calories_from_steps(&self, steps: Decimal) -> Decimal {
        (steps.max(Decimal::ZERO) * self.kcal_per_step)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: Decimal) -> Self {
        if bmi >= BMI_OBESE_MIN {
            BmiCategory::Obese
        } else if bmi >= BMI_OVERWEIGHT_MIN {
            BmiCategory::Overweight
        } else if bmi >= BMI_NORMAL_MIN {
            BmiCategory::Normal
        } else {
            BmiCategory::Underweight
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BmiCategory::Underweight => write!(f, "Underweight"),
            BmiCategory::Normal => write!(f, "Normal"),
            BmiCategory::Overweight => write!(f, "Overweight"),
            BmiCategory::Obese => write!(f, "Obese"),
        }
    }
}

/// Body mass index reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmiReading {
    /// BMI rounded to one decimal
    pub value: Decimal,
    pub category: BmiCategory,
}

/// `weight_kg / height_m^2`
///
/// The category is taken from the unrounded value so that 24.96 stays Normal.
pub fn bmi(weight_kg: Decimal, height_cm: Decimal) -> Result<BmiReading> {
    if weight_kg <= Decimal::ZERO || height_cm <= Decimal::ZERO {
        return Err(VitalError::Validation(format!(
            "Weight and height must be positive (weight={}kg, height={}cm)",
            weight_kg, height_cm
        )));
    }

    let height_m = height_cm / Decimal::ONE_HUNDRED;
    let raw = weight_kg / (height_m * height_m);

    Ok(BmiReading {
        value: raw.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
        category: BmiCategory::from_bmi(raw),
    })
}
