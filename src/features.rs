//! Feature engineering pipeline for consumption forecasting
//!
//! Transforms one user's chronologically ordered consumption series into a
//! supervised-learning feature matrix and target vector. A pure transform:
//! no store access, no side effects.

use crate::error::{PowercastError, Result};
use crate::records::ConsumptionRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Minimum series length able to produce one lag-complete feature row.
pub const MIN_HISTORY: usize = 8;

/// Positional shift of the weekly lag feature.
pub const WEEK_LAG: usize = 7;

/// Column order of the engineered feature matrix.
pub const FEATURE_NAMES: [&str; 6] = [
    "day_of_week",
    "month",
    "day_of_month",
    "is_weekend",
    "prev_day_consumption",
    "prev_week_consumption",
];

/// One engineered row. Exists only for dates where both the 1-position and
/// 7-position lags are defined within the same user's series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub month: u32,
    pub day_of_month: u32,
    pub is_weekend: bool,
    pub prev_day_consumption: f64,
    pub prev_week_consumption: f64,
    /// Target observed on `date`
    pub consumption: f64,
}

impl FeatureRow {
    /// Numeric feature vector in [`FEATURE_NAMES`] order.
    pub fn to_features(&self) -> Vec<f64> {
        vec![
            self.day_of_week as f64,
            self.month as f64,
            self.day_of_month as f64,
            if self.is_weekend { 1.0 } else { 0.0 },
            self.prev_day_consumption,
            self.prev_week_consumption,
        ]
    }
}

/// Calendar features derived deterministically from a date:
/// (day_of_week, month, day_of_month, is_weekend), Monday = 0.
pub fn calendar_features(date: NaiveDate) -> (u32, u32, u32, bool) {
    let day_of_week = date.weekday().num_days_from_monday();
    let is_weekend = day_of_week >= 5;
    (day_of_week, date.month(), date.day(), is_weekend)
}

/// Replace non-finite values with the mean of the finite values in this
/// batch. The mean is computed over the input batch only, so imputed output
/// depends on batch composition; callers must not substitute a forward-fill,
/// which changes numeric results.
pub fn impute_batch_mean(values: &[f64]) -> Result<Vec<f64>> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(PowercastError::InsufficientData(
            "no finite consumption values in batch".to_string(),
        ));
    }
    let batch_mean = finite.iter().sum::<f64>() / finite.len() as f64;
    Ok(values
        .iter()
        .map(|&v| if v.is_finite() { v } else { batch_mean })
        .collect())
}

/// Engineered feature rows for one user's series.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    rows: Vec<FeatureRow>,
}

impl FeatureSet {
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature matrix in [`FEATURE_NAMES`] column order.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(FeatureRow::to_features).collect()
    }

    /// Target vector aligned with [`FeatureSet::matrix`].
    pub fn targets(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.consumption).collect()
    }
}

/// Build the supervised feature set from raw records.
///
/// Input is stable-sorted by date if not already ascending. Lags are
/// positional shifts within the sorted series (1 and 7 steps back), so the
/// first 7 rows are always dropped. Fails with `InsufficientData` when fewer
/// than [`MIN_HISTORY`] records exist.
pub fn build_features(records: &[ConsumptionRecord]) -> Result<FeatureSet> {
    if records.len() < MIN_HISTORY {
        return Err(PowercastError::InsufficientData(format!(
            "need at least {} daily records to build lag features, got {}",
            MIN_HISTORY,
            records.len()
        )));
    }

    let mut sorted: Vec<&ConsumptionRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let raw: Vec<f64> = sorted.iter().map(|r| r.consumption).collect();
    let consumption = impute_batch_mean(&raw)?;

    let mut rows = Vec::with_capacity(sorted.len() - WEEK_LAG);
    for i in WEEK_LAG..sorted.len() {
        let (day_of_week, month, day_of_month, is_weekend) = calendar_features(sorted[i].date);
        rows.push(FeatureRow {
            date: sorted[i].date,
            day_of_week,
            month,
            day_of_month,
            is_weekend,
            prev_day_consumption: consumption[i - 1],
            prev_week_consumption: consumption[i - WEEK_LAG],
            consumption: consumption[i],
        });
    }

    Ok(FeatureSet { rows })
}

/// Zero-mean, unit-variance feature standardization.
///
/// Fitted once on the training partition and persisted alongside the
/// estimator; inference reuses the fitted parameters and never refits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations.
    pub fn fit(matrix: &[Vec<f64>]) -> Result<Self> {
        let n_rows = matrix.len();
        if n_rows == 0 {
            return Err(PowercastError::Training(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }
        let n_features = matrix[0].len();
        let n = n_rows as f64;

        let mut means = vec![0.0; n_features];
        for row in matrix {
            if row.len() != n_features {
                return Err(PowercastError::Training(format!(
                    "ragged feature matrix: expected {} columns, found {}",
                    n_features,
                    row.len()
                )));
            }
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut stds = vec![0.0; n_features];
        for row in matrix {
            for ((std, value), mean) in stds.iter_mut().zip(row).zip(&means) {
                *std += (value - mean).powi(2);
            }
        }
        for std in &mut stds {
            *std = (*std / n).sqrt();
        }

        Ok(Self { means, stds })
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Standardize one feature row. Zero-variance columns map to 0.0.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.means.len() {
            return Err(PowercastError::Validation(format!(
                "feature count mismatch: scaler fitted on {} columns, got {}",
                self.means.len(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(value, (mean, std))| {
                if *std < 1e-12 {
                    0.0
                } else {
                    (value - mean) / std
                }
            })
            .collect())
    }

    pub fn transform(&self, matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        matrix.iter().map(|row| self.transform_row(row)).collect()
    }
}
