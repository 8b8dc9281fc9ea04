use chrono::NaiveDate;

use crate::models::DailyRecord;
use crate::range::{RangeKey, RangeResolver};

/// Produces chart labels positionally aligned with aggregated values
pub struct ChartLabelGenerator;

impl ChartLabelGenerator {
    /// One label per date, in input order
    ///
    /// Sparse sequences are fine: each date gets the label it would receive
    /// in a dense window.
    pub fn labels<I>(dates: I, key: RangeKey) -> Vec<String>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates
            .into_iter()
            .map(|date| RangeResolver::label_for(key, date))
            .collect()
    }

    /// One label per record, in input order
    pub fn labels_for_records(records: &[DailyRecord], key: RangeKey) -> Vec<String> {
        Self::labels(records.iter().map(|r| r.date), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    #[test]
    fn test_week_labels() {
        // 2024-09-16 is a Monday
        let labels = ChartLabelGenerator::labels((16..=22).map(date), RangeKey::Week);
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
    }

    #[test]
    fn test_sparse_sequence_keeps_natural_labels() {
        let records = vec![
            DailyRecord::empty(date(2)),
            DailyRecord::empty(date(9)),
            DailyRecord::empty(date(30)),
        ];

        let month = ChartLabelGenerator::labels_for_records(&records, RangeKey::Month);
        assert_eq!(month, vec!["2", "9", "30"]);

        let quarter = ChartLabelGenerator::labels_for_records(&records, RangeKey::Quarter);
        assert_eq!(quarter, vec!["W1", "W2", "W5"]);
    }

    #[test]
    fn test_empty_input_yields_no_labels() {
        let labels = ChartLabelGenerator::labels(Vec::new(), RangeKey::Quarter);
        assert!(labels.is_empty());
    }
}
