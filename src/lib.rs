// Library interface for VitalRS modules
// Screen-level code and the CLI consume the calculators through this crate root

pub mod activity;
pub mod aggregate;
pub mod config;
pub mod cycle;
pub mod dashboard;
pub mod error;
pub mod goal;
pub mod import;
pub mod labels;
pub mod logging;
pub mod models;
pub mod range;
pub mod repository;
pub mod sleep;

// Re-export commonly used types for convenience
pub use models::*;
pub use aggregate::{fill_missing_days, AggregateResult, MetricsAggregator, WeeklyBucket};
pub use cycle::{ConceptionLikelihood, CycleForecast, CyclePolicy, CyclePrediction, CyclePredictor};
pub use goal::{GoalProgress, GoalProgressCalculator};
pub use labels::ChartLabelGenerator;
pub use range::{DateWindow, RangeKey, RangeResolver};
pub use sleep::{DeepSleepEstimate, SleepInsight, SleepPolicy, SleepQuality, SleepQualityEvaluator};
pub use repository::{HealthRepository, InMemoryRepository};
pub use config::AppConfig;
pub use error::{RepositoryError, Result, VitalError};
pub use logging::{LogConfig, LogFormat, LogLevel};
