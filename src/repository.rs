//! Data-access contract for the remote record store
//!
//! The engine only ever sees the store through [`HealthRepository`]. The
//! [`InMemoryRepository`] backs the CLI and tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::error::RepositoryError;
use crate::models::{CycleRecord, DailyRecord, SleepSchedule, TimeOfDay, UserId};

/// Narrow async interface to the external record store
#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// Daily records in `[start_date, end_date]`, ascending by date
    async fn fetch_daily_records(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyRecord>, RepositoryError>;

    /// Most recent cycle entry, `None` if the user never logged one
    async fn fetch_cycle_record(&self, user_id: &str)
        -> Result<Option<CycleRecord>, RepositoryError>;

    async fn fetch_sleep_schedule(&self, user_id: &str) -> Result<SleepSchedule, RepositoryError>;

    async fn save_sleep_schedule(
        &self,
        user_id: &str,
        bedtime: TimeOfDay,
        wakeup_time: TimeOfDay,
    ) -> Result<(), RepositoryError>;

    async fn save_cycle_record(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        average_length_days: u32,
    ) -> Result<(), RepositoryError>;
}

#[derive(Debug, Default)]
struct UserTables {
    daily: BTreeMap<NaiveDate, DailyRecord>,
    cycle: Option<CycleRecord>,
    sleep_schedule: Option<SleepSchedule>,
}

/// Process-local store keyed by user id
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    users: RwLock<HashMap<UserId, UserTables>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace daily records; one row per (user, date)
    pub async fn upsert_daily_records<I>(&self, user_id: &str, records: I)
    where
        I: IntoIterator<Item = DailyRecord>,
    {
        let mut users = self.users.write().await;
        let tables = users.entry(user_id.to_string()).or_default();
        for record in records {
            tables.daily.insert(record.date, record);
        }
    }

    /// Number of daily rows stored for a user
    pub async fn daily_record_count(&self, user_id: &str) -> usize {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|t| t.daily.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl HealthRepository for InMemoryRepository {
    async fn fetch_daily_records(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyRecord>, RepositoryError> {
        let users = self.users.read().await;
        let Some(tables) = users.get(user_id) else {
            return Ok(Vec::new());
        };
        if start_date > end_date {
            return Ok(Vec::new());
        }

        Ok(tables
            .daily
            .range(start_date..=end_date)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn fetch_cycle_record(
        &self,
        user_id: &str,
    ) -> Result<Option<CycleRecord>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .get(user_id)
            .and_then(|t| t.cycle.clone()))
    }

    async fn fetch_sleep_schedule(&self, user_id: &str) -> Result<SleepSchedule, RepositoryError> {
        self.users
            .read()
            .await
            .get(user_id)
            .and_then(|t| t.sleep_schedule)
            .ok_or_else(|| RepositoryError::NotFound {
                table: "sleep_schedule".to_string(),
                key: user_id.to_string(),
            })
    }

    async fn save_sleep_schedule(
        &self,
        user_id: &str,
        bedtime: TimeOfDay,
        wakeup_time: TimeOfDay,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().sleep_schedule =
            Some(SleepSchedule::new(bedtime, wakeup_time));
        Ok(())
    }

    async fn save_cycle_record(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        average_length_days: u32,
    ) -> Result<(), RepositoryError> {
        let record = CycleRecord::new(start_date, average_length_days).map_err(|e| {
            RepositoryError::Storage {
                reason: e.to_string(),
            }
        })?;

        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().cycle = Some(record);
        Ok(())
    }
}
