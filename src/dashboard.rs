//! Screen-level view models over a [`HealthRepository`]
//!
//! Each loader fetches a complete snapshot, then hands it to the pure
//! calculators. Caller bugs (bad goal, unknown range) come back as `Err`.
//! Store failures and missing cycle data come back as
//! [`DataState::NoData`] so a screen can render its empty state.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{fill_missing_days, AggregateResult, MetricsAggregator, WeeklyBucket};
use crate::config::AppConfig;
use crate::cycle::{CycleForecast, CyclePrediction, CyclePredictor};
use crate::error::{RepositoryError, Result, VitalError};
use crate::goal::{GoalProgress, GoalProgressCalculator};
use crate::models::{CycleRecord, Metric, SleepSchedule, TimeOfDay, UserId};
use crate::range::{DateWindow, RangeKey, RangeResolver};
use crate::repository::HealthRepository;
use crate::sleep::{SleepInsight, SleepQualityEvaluator};

/// Why a screen has nothing to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoDataReason {
    Repository(RepositoryError),
    CycleDataUnavailable,
}

impl NoDataReason {
    /// Screen copy for the empty state
    pub fn user_message(&self) -> String {
        match self {
            NoDataReason::Repository(e) => VitalError::Repository(e.clone()).user_message(),
            NoDataReason::CycleDataUnavailable => VitalError::CycleDataUnavailable.user_message(),
        }
    }
}

/// Either a ready view model or a typed empty state
#[derive(Debug, Clone, PartialEq)]
pub enum DataState<T> {
    Ready(T),
    NoData(NoDataReason),
}

impl<T> DataState<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            DataState::Ready(value) => Some(value),
            DataState::NoData(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DataState::Ready(_))
    }
}

/// A result tagged with the range it was requested for
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub requested: RangeKey,
    pub value: T,
}

impl<T> Fetched<T> {
    /// The value, unless the user has since switched to another range
    pub fn into_current(self, active: RangeKey) -> Option<T> {
        (self.requested == active).then_some(self.value)
    }
}

/// Parameters of one metric screen render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRequest {
    pub user_id: UserId,
    pub range: RangeKey,
    pub metric: Metric,
    pub today: NaiveDate,
    /// Overrides the configured goal for the metric
    pub goal: Option<Decimal>,
}

/// Metric screen view model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub window: DateWindow,
    pub aggregate: AggregateResult,
    /// Progress of the average toward the goal, when the metric has one
    pub progress: Option<GoalProgress>,
    /// Weekly buckets, only for the quarter range
    pub weekly_buckets: Vec<WeeklyBucket>,
    /// Distance walked over the window, only for steps
    pub distance_km: Option<Decimal>,
    /// Active kilocalories from walking, only for steps
    pub step_calories: Option<Decimal>,
}

/// Sleep screen view model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSummary {
    pub window: DateWindow,
    pub aggregate: AggregateResult,
    pub insight: SleepInsight,
    pub progress: GoalProgress,
    /// `None` when the user has not configured a schedule yet
    pub schedule: Option<SleepSchedule>,
    pub scheduled_hours: Option<Decimal>,
}

/// Goal for a request, failing fast on a non-positive override
fn resolve_goal(request_goal: Option<Decimal>, configured: Option<Decimal>) -> Result<Option<Decimal>> {
    match request_goal {
        Some(goal) if goal <= Decimal::ZERO => Err(VitalError::InvalidGoal { goal }),
        Some(goal) => Ok(Some(goal)),
        None => Ok(configured),
    }
}

fn progress_toward(value: Decimal, goal: Option<Decimal>) -> Result<Option<GoalProgress>> {
    goal.map(|g| GoalProgressCalculator::progress(value, g))
        .transpose()
}

/// Load and summarize one metric for a range
pub async fn load_metric_summary<R>(
    repo: &R,
    request: &MetricRequest,
    config: &AppConfig,
) -> Result<Fetched<DataState<MetricSummary>>>
where
    R: HealthRepository + ?Sized,
{
    let goal = resolve_goal(request.goal, config.goals.goal_for(request.metric))?;
    let window = RangeResolver::resolve(request.range, request.today);

    let records = match repo
        .fetch_daily_records(&request.user_id, window.start_date, window.end_date)
        .await
    {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(
                user_id = %request.user_id,
                range = %request.range,
                error = %e,
                "Daily record fetch failed"
            );
            return Ok(Fetched {
                requested: request.range,
                value: DataState::NoData(NoDataReason::Repository(e)),
            });
        }
    };
    tracing::debug!(
        user_id = %request.user_id,
        range = %request.range,
        fetched = records.len(),
        "Daily records fetched"
    );

    let records = fill_missing_days(&window, &records);
    let aggregate = MetricsAggregator::aggregate(&records, request.metric, request.range)?;
    let progress = progress_toward(aggregate.average, goal)?;

    let weekly_buckets = match request.range {
        RangeKey::Quarter => MetricsAggregator::weekly_buckets(&records, request.metric)?,
        RangeKey::Week | RangeKey::Month => Vec::new(),
    };
    let is_steps = request.metric == Metric::Steps;
    let distance_km = is_steps.then(|| config.activity.distance_km(aggregate.total));
    let step_calories = is_steps.then(|| config.activity.calories_from_steps(aggregate.total));

    Ok(Fetched {
        requested: request.range,
        value: DataState::Ready(MetricSummary {
            window,
            aggregate,
            progress,
            weekly_buckets,
            distance_km,
            step_calories,
        }),
    })
}

/// Load the sleep screen: averaged duration, band, deep sleep and schedule
pub async fn load_sleep_summary<R>(
    repo: &R,
    user_id: &str,
    range: RangeKey,
    today: NaiveDate,
    config: &AppConfig,
) -> Result<Fetched<DataState<SleepSummary>>>
where
    R: HealthRepository + ?Sized,
{
    let window = RangeResolver::resolve(range, today);

    let records = match repo
        .fetch_daily_records(user_id, window.start_date, window.end_date)
        .await
    {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(user_id = %user_id, range = %range, error = %e, "Sleep fetch failed");
            return Ok(Fetched {
                requested: range,
                value: DataState::NoData(NoDataReason::Repository(e)),
            });
        }
    };

    // A missing schedule is normal for new users; any other failure empties the screen.
    let schedule = match repo.fetch_sleep_schedule(user_id).await {
        Ok(schedule) => Some(schedule),
        Err(RepositoryError::NotFound { .. }) => None,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Sleep schedule fetch failed");
            return Ok(Fetched {
                requested: range,
                value: DataState::NoData(NoDataReason::Repository(e)),
            });
        }
    };

    let records = fill_missing_days(&window, &records);
    let aggregate = MetricsAggregator::aggregate(&records, Metric::SleepHours, range)?;
    let evaluator = SleepQualityEvaluator::with_policy(config.sleep.clone());
    let insight = evaluator.evaluate(aggregate.average);
    let progress = GoalProgressCalculator::progress(aggregate.average, config.goals.sleep_hours)?;

    Ok(Fetched {
        requested: range,
        value: DataState::Ready(SleepSummary {
            window,
            aggregate,
            insight,
            progress,
            scheduled_hours: schedule.map(|s| s.scheduled_hours()),
            schedule,
        }),
    })
}

/// Load the cycle screen; a user without a cycle record gets `NoData`
pub async fn load_cycle_summary<R>(
    repo: &R,
    user_id: &str,
    today: NaiveDate,
    config: &AppConfig,
) -> DataState<CycleForecast>
where
    R: HealthRepository + ?Sized,
{
    let record = match repo.fetch_cycle_record(user_id).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Cycle fetch failed");
            return DataState::NoData(NoDataReason::Repository(e));
        }
    };

    if let Some(record) = record.as_ref().filter(|r| r.start_date > today) {
        tracing::debug!(user_id = %user_id, start_date = %record.start_date, "Cycle start is in the future");
    }

    let predictor = CyclePredictor::with_policy(config.cycle.clone());
    match predictor.predict(record.as_ref(), today) {
        CyclePrediction::Predicted(forecast) => DataState::Ready(forecast),
        CyclePrediction::Unavailable => DataState::NoData(NoDataReason::CycleDataUnavailable),
    }
}

/// Validate and store a sleep schedule
pub async fn save_sleep_schedule<R>(
    repo: &R,
    user_id: &str,
    bedtime: &str,
    wakeup_time: &str,
) -> Result<SleepSchedule>
where
    R: HealthRepository + ?Sized,
{
    let bedtime: TimeOfDay = bedtime.parse()?;
    let wakeup_time: TimeOfDay = wakeup_time.parse()?;

    repo.save_sleep_schedule(user_id, bedtime, wakeup_time).await?;
    tracing::debug!(user_id = %user_id, %bedtime, %wakeup_time, "Sleep schedule saved");
    Ok(SleepSchedule::new(bedtime, wakeup_time))
}

/// Validate and store the latest cycle start
pub async fn save_cycle_record<R>(
    repo: &R,
    user_id: &str,
    start_date: NaiveDate,
    average_length_days: u32,
) -> Result<CycleRecord>
where
    R: HealthRepository + ?Sized,
{
    let record = CycleRecord::new(start_date, average_length_days)?;

    repo.save_cycle_record(user_id, record.start_date, record.average_length_days)
        .await?;
    tracing::debug!(user_id = %user_id, %start_date, average_length_days, "Cycle record saved");
    Ok(record)
}
