//! Metrics aggregation over daily record sequences
//!
//! Reduces an ordered sequence of [`DailyRecord`]s into totals, averages and
//! extremes for one numeric field. Values stay aligned 1:1 with the input and
//! with the chart labels produced for the active range.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, VitalError};
use crate::labels::ChartLabelGenerator;
use crate::models::{DailyRecord, Metric};
use crate::range::{DateWindow, RangeKey, RangeResolver};

/// Records per bucket in quarter charts
pub const DAYS_PER_WEEKLY_BUCKET: usize = 7;

/// Summary of one metric over a record sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Field that was aggregated
    pub metric: Metric,

    /// Sum of all values
    pub total: Decimal,

    /// `total / bucket_count`, zero for an empty sequence
    pub average: Decimal,

    /// Smallest value, `None` for an empty sequence
    pub min: Option<Decimal>,

    /// Largest value, `None` for an empty sequence
    pub max: Option<Decimal>,

    /// Number of values
    pub bucket_count: usize,

    /// Per-record values in input order
    pub values: Vec<Decimal>,

    /// Per-record chart labels, same length as `values`
    pub labels: Vec<String>,
}

impl AggregateResult {
    /// Average rounded for display (midpoint away from zero)
    pub fn rounded_average(&self, dp: u32) -> Decimal {
        self.average
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn is_empty(&self) -> bool {
        self.bucket_count == 0
    }

    /// `(label, value)` pairs for chart rendering
    pub fn points(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// One bucket of a quarter chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    /// First date in the bucket
    pub start_date: NaiveDate,

    /// Last date in the bucket
    pub end_date: NaiveDate,

    /// `W<k>` label of the first date
    pub label: String,

    /// Sum for additive metrics, mean for rate metrics
    pub value: Decimal,

    /// Records folded into the bucket
    pub record_count: usize,
}

/// Stateless aggregation engine
pub struct MetricsAggregator;

/// Sum of values, failing instead of overflowing the decimal range
fn checked_total(values: impl IntoIterator<Item = Decimal>, metric: Metric) -> Result<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(|| VitalError::Validation(format!("{} total exceeds the decimal range", metric)))
}

impl MetricsAggregator {
    /// Aggregate a metric over records, labelling each value for the range
    pub fn aggregate(records: &[DailyRecord], metric: Metric, key: RangeKey) -> Result<AggregateResult> {
        let values: Vec<Decimal> = records.iter().map(|r| r.value(metric)).collect();
        let labels = ChartLabelGenerator::labels_for_records(records, key);

        let total = checked_total(values.iter().copied(), metric)?;
        let bucket_count = values.len();
        let average = if bucket_count == 0 {
            Decimal::ZERO
        } else {
            total / Decimal::from(bucket_count)
        };

        Ok(AggregateResult {
            metric,
            total,
            average,
            min: values.iter().copied().min(),
            max: values.iter().copied().max(),
            bucket_count,
            values,
            labels,
        })
    }

    /// Fold consecutive runs of seven records into quarter-chart buckets
    pub fn weekly_buckets(records: &[DailyRecord], metric: Metric) -> Result<Vec<WeeklyBucket>> {
        let mut buckets = Vec::with_capacity(records.len().div_ceil(DAYS_PER_WEEKLY_BUCKET));
        for chunk in records.chunks(DAYS_PER_WEEKLY_BUCKET) {
            let (Some(first), Some(last)) = (chunk.first(), chunk.last()) else {
                continue;
            };
            let sum = checked_total(chunk.iter().map(|r| r.value(metric)), metric)?;
            let value = if metric.is_additive() {
                sum
            } else {
                sum / Decimal::from(chunk.len())
            };

            buckets.push(WeeklyBucket {
                start_date: first.date,
                end_date: last.date,
                label: RangeResolver::label_for(RangeKey::Quarter, first.date),
                value,
                record_count: chunk.len(),
            });
        }
        Ok(buckets)
    }
}

/// Densify records to exactly one per date of the window
///
/// Missing dates get a zero-valued record, out-of-window records are
/// dropped and a later duplicate for the same date replaces an earlier one.
pub fn fill_missing_days(window: &DateWindow, records: &[DailyRecord]) -> Vec<DailyRecord> {
    let mut by_date: BTreeMap<NaiveDate, &DailyRecord> = BTreeMap::new();
    for record in records.iter().filter(|r| window.contains(r.date)) {
        by_date.insert(record.date, record);
    }

    window
        .dates()
        .map(|date| {
            by_date
                .get(&date)
                .map(|record| (*record).clone())
                .unwrap_or_else(|| DailyRecord::zeroed(date))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn steps_series(start: NaiveDate, steps: &[i64]) -> Vec<DailyRecord> {
        steps
            .iter()
            .enumerate()
            .map(|(i, s)| DailyRecord {
                steps: Some(Decimal::from(*s)),
                ..DailyRecord::empty(start + chrono::Days::new(i as u64))
            })
            .collect()
    }

    #[test]
    fn test_weekly_steps_scenario() {
        let start = NaiveDate::from_ymd_opt(2024, 9, 16).unwrap();
        let records = steps_series(start, &[5000, 6000, 8000, 7000, 8500, 9500, 10500]);

        let result = MetricsAggregator::aggregate(&records, Metric::Steps, RangeKey::Week).unwrap();

        assert_eq!(result.total, dec!(54500));
        assert_eq!(result.rounded_average(0), dec!(7786));
        assert_eq!(result.min, Some(dec!(5000)));
        assert_eq!(result.max, Some(dec!(10500)));
        assert_eq!(result.bucket_count, 7);
        assert_eq!(result.labels.len(), result.values.len());
        assert_eq!(result.labels[0], "Mon");
    }

    #[test]
    fn test_empty_sequence() {
        let result = MetricsAggregator::aggregate(&[], Metric::Calories, RangeKey::Month).unwrap();

        assert_eq!(result.total, Decimal::ZERO);
        assert_eq!(result.average, Decimal::ZERO);
        assert_eq!(result.min, None);
        assert_eq!(result.max, None);
        assert_eq!(result.bucket_count, 0);
        assert!(result.is_empty());
        assert!(result.labels.is_empty());
    }

    #[test]
    fn test_absent_fields_count_as_zero() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let records = vec![
            DailyRecord {
                heart_rate: Some(dec!(70)),
                ..DailyRecord::empty(date)
            },
            DailyRecord::empty(date.succ_opt().unwrap()),
        ];

        let result = MetricsAggregator::aggregate(&records, Metric::HeartRate, RangeKey::Week).unwrap();
        assert_eq!(result.values, vec![dec!(70), dec!(0)]);
        assert_eq!(result.average, dec!(35));
        assert_eq!(result.min, Some(dec!(0)));
    }

    #[test]
    fn test_fill_missing_days() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 22).unwrap();
        let window = RangeResolver::resolve(RangeKey::Week, today);
        let records = vec![
            DailyRecord {
                steps: Some(dec!(100)),
                ..DailyRecord::empty(NaiveDate::from_ymd_opt(2024, 9, 10).unwrap())
            },
            DailyRecord {
                steps: Some(dec!(4000)),
                ..DailyRecord::empty(NaiveDate::from_ymd_opt(2024, 9, 18).unwrap())
            },
            DailyRecord {
                steps: Some(dec!(4500)),
                ..DailyRecord::empty(NaiveDate::from_ymd_opt(2024, 9, 18).unwrap())
            },
        ];

        let filled = fill_missing_days(&window, &records);

        assert_eq!(filled.len(), 7);
        assert_eq!(filled[0].date, window.start_date);
        assert_eq!(filled[6].date, today);
        assert_eq!(filled[2].value(Metric::Steps), dec!(4500));
        assert_eq!(filled[3], DailyRecord::zeroed(NaiveDate::from_ymd_opt(2024, 9, 19).unwrap()));

        let result = MetricsAggregator::aggregate(&filled, Metric::Steps, RangeKey::Week).unwrap();
        assert_eq!(result.total, dec!(4500));
    }

    #[test]
    fn test_weekly_buckets() {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let steps: Vec<i64> = (0..16).map(|_| 1000).collect();
        let mut records = steps_series(start, &steps);
        for (i, record) in records.iter_mut().enumerate() {
            record.sleep_hours = Some(if i % 2 == 0 { dec!(6) } else { dec!(8) });
        }

        let buckets = MetricsAggregator::weekly_buckets(&records, Metric::Steps).unwrap();
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].value, dec!(7000));
        assert_eq!(buckets[0].label, "W1");
        assert_eq!(buckets[1].label, "W2");
        assert_eq!(buckets[2].record_count, 2);
        assert_eq!(buckets[2].value, dec!(2000));

        let sleep = MetricsAggregator::weekly_buckets(&records, Metric::SleepHours).unwrap();
        // 6,8,6,8,6,8,6 -> 48 / 7
        assert_eq!(sleep[0].value, dec!(48) / dec!(7));
        assert_eq!(sleep[2].value, dec!(7));

        assert!(MetricsAggregator::weekly_buckets(&[], Metric::Steps).unwrap().is_empty());
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let start = NaiveDate::from_ymd_opt(2024, 9, 16).unwrap();
        let records: Vec<DailyRecord> = (0..2u64)
            .map(|i| DailyRecord {
                steps: Some(Decimal::MAX),
                ..DailyRecord::empty(start + chrono::Days::new(i))
            })
            .collect();

        let err = MetricsAggregator::aggregate(&records, Metric::Steps, RangeKey::Week).unwrap_err();
        assert!(matches!(err, VitalError::Validation(_)));

        let err = MetricsAggregator::weekly_buckets(&records, Metric::Steps).unwrap_err();
        assert!(matches!(err, VitalError::Validation(_)));

        let single = MetricsAggregator::aggregate(&records[..1], Metric::Steps, RangeKey::Week).unwrap();
        assert_eq!(single.total, Decimal::MAX);
    }

    proptest! {
        #[test]
        fn test_average_between_extremes(values in prop::collection::vec(0i64..50_000, 1..120)) {
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let records = steps_series(start, &values);
            let result = MetricsAggregator::aggregate(&records, Metric::Steps, RangeKey::Quarter).unwrap();

            prop_assert_eq!(result.average, result.total / Decimal::from(values.len()));
            let min = result.min.unwrap();
            let max = result.max.unwrap();
            prop_assert!(min <= result.average && result.average <= max);
            prop_assert_eq!(result.values.len(), values.len());
        }

        #[test]
        fn test_labels_align_with_values(len in 0usize..100, key_index in 0usize..3) {
            let key = [RangeKey::Week, RangeKey::Month, RangeKey::Quarter][key_index];
            let start = NaiveDate::from_ymd_opt(2023, 11, 20).unwrap();
            let values: Vec<i64> = (0..len as i64).collect();
            let records = steps_series(start, &values);
            let result = MetricsAggregator::aggregate(&records, Metric::Steps, key).unwrap();

            prop_assert_eq!(result.labels.len(), result.values.len());
            prop_assert_eq!(result.bucket_count, len);
        }
    }
}
