//! Consumption records, prediction rows, and the record store interface

use crate::error::Result;
use crate::models::ModelType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category assigned to uploaded rows that carry none.
pub const DEFAULT_CATEGORY: &str = "General";

/// One raw consumption observation. Immutable once created; removed only by
/// cascading user deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub user_id: i64,
    pub device_name: String,
    pub category: String,
    pub date: NaiveDate,
    /// kWh for the calendar day
    pub consumption: f64,
}

impl ConsumptionRecord {
    pub fn new(
        user_id: i64,
        device_name: impl Into<String>,
        category: impl Into<String>,
        date: NaiveDate,
        consumption: f64,
    ) -> Self {
        Self {
            user_id,
            device_name: device_name.into(),
            category: category.into(),
            date,
            consumption,
        }
    }
}

/// Forecast granularity of a stored prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionKind {
    Daily,
    Weekly,
    Monthly,
}

/// A prediction emitted by the forecast service. Created with
/// `actual_value`/`accuracy` empty; both are filled once ground truth for
/// `target_date` becomes available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub user_id: i64,
    pub kind: PredictionKind,
    pub predicted_value: f64,
    pub actual_value: Option<f64>,
    pub accuracy: Option<f64>,
    pub model_used: ModelType,
    pub target_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(
        user_id: i64,
        kind: PredictionKind,
        predicted_value: f64,
        model_used: ModelType,
        target_date: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            kind,
            predicted_value,
            actual_value: None,
            accuracy: None,
            model_used,
            target_date,
            created_at: Utc::now(),
        }
    }

    /// Backfill the observed value and derive a 0-100 accuracy percentage.
    pub fn record_actual(&mut self, actual: f64) {
        self.actual_value = Some(actual);
        self.accuracy = Some(if actual.abs() < f64::EPSILON {
            0.0
        } else {
            let percentage_error = ((self.predicted_value - actual) / actual * 100.0).abs();
            (100.0 - percentage_error).clamp(0.0, 100.0)
        });
    }
}

/// Record store interface consumed by the pipeline and the forecast service.
///
/// Implementations may return records in any order; the feature pipeline
/// sorts chronologically itself.
pub trait RecordStore {
    /// Records for one user, optionally restricted to dates on or after
    /// `since`.
    fn list_records(
        &self,
        user_id: i64,
        since: Option<NaiveDate>,
    ) -> Result<Vec<ConsumptionRecord>>;
}

/// In-memory record store, used directly in tests and as the reference
/// implementation for relational backends.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: HashMap<i64, Vec<ConsumptionRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk insert of a pre-validated batch. The upload path validates the
    /// whole batch before calling this, so inserts are all-or-nothing.
    pub fn insert_batch(&mut self, batch: Vec<ConsumptionRecord>) -> usize {
        let inserted = batch.len();
        for record in batch {
            self.records.entry(record.user_id).or_default().push(record);
        }
        inserted
    }

    /// Cascading deletion of one user's observations.
    pub fn delete_user(&mut self, user_id: i64) -> usize {
        self.records.remove(&user_id).map_or(0, |r| r.len())
    }

    pub fn record_count(&self, user_id: i64) -> usize {
        self.records.get(&user_id).map_or(0, Vec::len)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn list_records(
        &self,
        user_id: i64,
        since: Option<NaiveDate>,
    ) -> Result<Vec<ConsumptionRecord>> {
        let mut out = self.records.get(&user_id).cloned().unwrap_or_default();
        if let Some(since) = since {
            out.retain(|r| r.date >= since);
        }
        Ok(out)
    }
}
