use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::activity::ActivityConstants;
use crate::cycle::CyclePolicy;
use crate::error::VitalError;
use crate::logging::LogConfig;
use crate::models::Metric;
use crate::sleep::SleepPolicy;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User whose data the CLI reads when none is given
    pub default_user_id: Option<String>,

    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Daily goals used for progress rings
    pub goals: GoalSettings,

    /// Sleep quality thresholds and deep-sleep ratio
    pub sleep: SleepPolicy,

    /// Cycle likelihood cutoffs
    pub cycle: CyclePolicy,

    /// Per-step conversion constants
    pub activity: ActivityConstants,

    /// Logging preferences
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Daily goal targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSettings {
    pub daily_steps: Decimal,
    pub daily_calories: Decimal,
    pub sleep_hours: Decimal,
}

impl Default for GoalSettings {
    fn default() -> Self {
        GoalSettings {
            daily_steps: dec!(10000),
            daily_calories: dec!(2500),
            sleep_hours: dec!(8),
        }
    }
}

impl GoalSettings {
    /// Goal associated with a metric; heart rate has none
    pub fn goal_for(&self, metric: Metric) -> Option<Decimal> {
        match metric {
            Metric::Steps => Some(self.daily_steps),
            Metric::Calories => Some(self.daily_calories),
            Metric::SleepHours => Some(self.sleep_hours),
            Metric::HeartRate => None,
        }
    }
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        ConfigMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_user_id: None,
            metadata: ConfigMetadata::default(),
            goals: GoalSettings::default(),
            sleep: SleepPolicy::default(),
            cycle: CyclePolicy::default(),
            activity: ActivityConstants::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vitalrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %e,
                    "Config file not loaded, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to_file(config_path)
    }

    /// Reject goals and policies the engine would refuse at call time
    pub fn validate(&self) -> std::result::Result<(), VitalError> {
        let goals = [
            ("daily_steps", self.goals.daily_steps),
            ("daily_calories", self.goals.daily_calories),
            ("sleep_hours", self.goals.sleep_hours),
        ];
        for (name, goal) in goals {
            if goal <= Decimal::ZERO {
                return Err(VitalError::Configuration(format!(
                    "goals.{} must be positive, got {}",
                    name, goal
                )));
            }
        }

        if !self.sleep.is_consistent() {
            return Err(VitalError::Configuration(
                "sleep thresholds must ascend and deep_sleep_ratio must lie in [0, 1]".to_string(),
            ));
        }

        if self.cycle.high_chance_max_days > self.cycle.moderate_chance_max_days {
            return Err(VitalError::Configuration(
                "cycle.high_chance_max_days must not exceed cycle.moderate_chance_max_days"
                    .to_string(),
            ));
        }

        if self.activity.km_per_step < Decimal::ZERO || self.activity.kcal_per_step < Decimal::ZERO {
            return Err(VitalError::Configuration(
                "activity constants must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}
