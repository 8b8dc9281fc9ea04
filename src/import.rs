use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::ImportError;
use crate::models::DailyRecord;

/// CSV importer for daily records with flexible column names
///
/// Only `date` (`YYYY-MM-DD`) is required. Empty measurement cells become
/// absent values.
pub struct DailyRecordCsvImporter {
    column_mapping: HashMap<String, String>,
}

impl DailyRecordCsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        Self::add_mapping(&mut column_mapping, "date", &["date", "day", "created_at"]);
        Self::add_mapping(&mut column_mapping, "steps", &["steps", "step_count"]);
        Self::add_mapping(
            &mut column_mapping,
            "calories",
            &["calories", "kcal", "active_calories"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "heart_rate",
            &["heart_rate", "heartrate", "hr", "bpm"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "sleep_hours",
            &["sleep_hours", "sleephours", "sleep"],
        );

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, canonical: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_string(), canonical.to_string());
        }
    }

    /// Load records from a CSV file
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<DailyRecord>, ImportError> {
        let file = std::fs::File::open(path).map_err(csv::Error::from)?;
        self.import_reader(file)
    }

    /// Load records from any CSV source, sorted ascending by date
    pub fn import_reader<R: Read>(&self, reader: R) -> Result<Vec<DailyRecord>, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: HashMap<String, usize> = reader
            .headers()?
            .iter()
            .enumerate()
            .filter_map(|(index, header)| {
                self.column_mapping
                    .get(&header.to_lowercase())
                    .map(|canonical| (canonical.clone(), index))
            })
            .collect();

        let date_column = *columns.get("date").ok_or_else(|| ImportError::MissingColumn {
            column: "date".to_string(),
        })?;

        let mut records = Vec::new();
        for (row_index, row) in reader.records().enumerate() {
            let row = row?;
            // header is line 1
            let line = row_index + 2;

            let raw_date = row.get(date_column).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
                ImportError::InvalidValue {
                    row: line,
                    column: "date".to_string(),
                    value: raw_date.to_string(),
                }
            })?;

            let cell = |name: &str| -> Result<Option<Decimal>, ImportError> {
                let Some(index) = columns.get(name) else {
                    return Ok(None);
                };
                let raw = row.get(*index).unwrap_or_default();
                if raw.is_empty() {
                    return Ok(None);
                }
                Decimal::from_str(raw)
                    .map(Some)
                    .map_err(|_| ImportError::InvalidValue {
                        row: line,
                        column: name.to_string(),
                        value: raw.to_string(),
                    })
            };

            records.push(DailyRecord {
                date,
                steps: cell("steps")?,
                calories: cell("calories")?,
                heart_rate: cell("heart_rate")?,
                sleep_hours: cell("sleep_hours")?,
            });
        }

        records.sort_by_key(|r| r.date);
        Ok(records)
    }
}

impl Default for DailyRecordCsvImporter {
    fn default() -> Self {
        Self::new()
    }
}
