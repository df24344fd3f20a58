//! Recursive multi-step consumption forecasting
//!
//! Each future day's lag features are built from the model's own prior
//! predictions once real observations run out, so the forecast is a genuine
//! recursive rollout rather than independent single-step predictions.

use crate::error::{PowercastError, Result};
use crate::features::{self, MIN_HISTORY, WEEK_LAG};
use crate::models::ModelType;
use crate::records::{Prediction, PredictionKind, RecordStore};
use crate::store::ArtifactStore;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

/// Days of history loaded for forecasting when available.
pub const RECENT_WINDOW_DAYS: usize = 14;

/// Default forecast horizon.
pub const DEFAULT_HORIZON_DAYS: usize = 7;

/// One forecasted day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub prediction: f64,
}

/// Summary block of the forecast response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub daily_avg: f64,
    /// dailyAvg extrapolated over a 30-day month
    pub monthly_total: f64,
    /// Forecast average vs the trailing actual window, in percent
    pub percentage_change: f64,
}

/// Accuracy block; confidence is derived from the artifact's held-out R².
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAccuracy {
    pub confidence: f64,
    pub mae: f64,
}

/// Forecast result in the shape of the `/predictions` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub daily: Vec<DailyForecast>,
    pub summary: ForecastSummary,
    pub accuracy: ForecastAccuracy,
    #[serde(skip)]
    pub model_used: ModelType,
}

impl ForecastReport {
    /// Materialize prediction rows for persistence. Actuals and accuracy are
    /// filled later, once ground truth for each target date exists.
    pub fn to_predictions(&self, user_id: i64) -> Vec<Prediction> {
        self.daily
            .iter()
            .map(|day| {
                Prediction::new(
                    user_id,
                    PredictionKind::Daily,
                    day.prediction,
                    self.model_used,
                    day.date,
                )
            })
            .collect()
    }
}

/// Produces N-day-ahead forecasts from a record store and a trained artifact.
///
/// Stateless per call: artifact handles are loaded per request, so concurrent
/// requests against different model types never contend.
pub struct ForecastService<'a, S: RecordStore> {
    records: &'a S,
    artifacts: &'a ArtifactStore,
}

impl<'a, S: RecordStore> ForecastService<'a, S> {
    pub fn new(records: &'a S, artifacts: &'a ArtifactStore) -> Self {
        Self { records, artifacts }
    }

    /// Recursive forecast for one user over `horizon_days` future days.
    pub fn forecast(
        &self,
        user_id: i64,
        horizon_days: usize,
        model_type: ModelType,
    ) -> Result<ForecastReport> {
        if horizon_days == 0 {
            return Err(PowercastError::Validation(
                "forecast horizon must be at least 1 day".to_string(),
            ));
        }

        let model = self.artifacts.load(model_type)?;

        let mut records = self.records.list_records(user_id, None)?;
        records.sort_by_key(|r| r.date);
        if records.len() < MIN_HISTORY {
            return Err(PowercastError::InsufficientData(format!(
                "forecasting needs at least {} days of history, found {}",
                MIN_HISTORY,
                records.len()
            )));
        }

        let window_start = records.len().saturating_sub(RECENT_WINDOW_DAYS);
        let recent = &records[window_start..];
        let last_date = recent[recent.len() - 1].date;

        let raw: Vec<f64> = recent.iter().map(|r| r.consumption).collect();
        // History buffer seeds the lag features; predictions are appended so
        // later steps read the model's own prior output.
        let mut history = features::impute_batch_mean(&raw)?;
        let observed_len = history.len();

        let mut daily = Vec::with_capacity(horizon_days);
        for step in 1..=horizon_days {
            let date = last_date + Duration::days(step as i64);
            let (day_of_week, month, day_of_month, is_weekend) = features::calendar_features(date);
            let prev_day = history[history.len() - 1];
            let prev_week = history[history.len() - WEEK_LAG];

            let row = vec![
                day_of_week as f64,
                month as f64,
                day_of_month as f64,
                if is_weekend { 1.0 } else { 0.0 },
                prev_day,
                prev_week,
            ];
            // kWh cannot go negative
            let predicted = model.predict_row(&row)?.max(0.0);

            daily.push(DailyForecast {
                date,
                prediction: predicted,
            });
            history.push(predicted);
        }

        let daily_avg = daily.iter().map(|d| d.prediction).sum::<f64>() / daily.len() as f64;
        let monthly_total = daily_avg * 30.0;

        let baseline_len = horizon_days.min(observed_len);
        let baseline = history[observed_len - baseline_len..observed_len]
            .iter()
            .sum::<f64>()
            / baseline_len as f64;
        let percentage_change = if baseline.abs() < 1e-9 {
            0.0
        } else {
            (daily_avg - baseline) / baseline * 100.0
        };

        debug!(
            user_id,
            horizon = horizon_days,
            model = %model_type,
            daily_avg,
            "generated forecast"
        );

        Ok(ForecastReport {
            daily,
            summary: ForecastSummary {
                daily_avg,
                monthly_total,
                percentage_change,
            },
            accuracy: ForecastAccuracy {
                confidence: model.metrics.r2.clamp(0.0, 1.0) * 100.0,
                mae: model.metrics.mae,
            },
            model_used: model_type,
        })
    }
}
