//! Trained model representation and the closed model-family dispatch

use crate::error::{PowercastError, Result};
use crate::features::StandardScaler;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::LinearRegression;
use std::fmt;
use std::str::FromStr;

pub mod metrics;
pub mod training;

pub use metrics::RegressionMetrics;
pub use training::{Trainer, TrainerConfig};

/// Supported model families. A closed set: callers select by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Linear,
    Ensemble,
}

impl ModelType {
    pub const ALL: [ModelType; 2] = [ModelType::Linear, ModelType::Ensemble];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Linear => "linear",
            ModelType::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = PowercastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(ModelType::Linear),
            "ensemble" => Ok(ModelType::Ensemble),
            other => Err(PowercastError::Validation(format!(
                "unknown model type '{}', expected 'linear' or 'ensemble'",
                other
            ))),
        }
    }
}

type LinearEstimator = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
type EnsembleEstimator = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Fitted estimator for one model family.
#[derive(Serialize, Deserialize)]
pub enum Estimator {
    Linear(LinearEstimator),
    Ensemble(EnsembleEstimator),
}

impl Estimator {
    pub fn model_type(&self) -> ModelType {
        match self {
            Estimator::Linear(_) => ModelType::Linear,
            Estimator::Ensemble(_) => ModelType::Ensemble,
        }
    }

    /// Predict targets for already-standardized feature rows.
    pub fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>> {
        match self {
            Estimator::Linear(model) => model.predict(x),
            Estimator::Ensemble(model) => model.predict(x),
        }
        .map_err(|e| PowercastError::Data(format!("prediction failed: {}", e)))
    }
}

impl fmt::Debug for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Estimator").field(&self.model_type()).finish()
    }
}

/// A fitted scaler/estimator pair with its held-out evaluation.
///
/// Owned by the artifact store once saved; replaced only by a full retrain
/// and overwrite.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedModel {
    pub model_type: ModelType,
    pub scaler: StandardScaler,
    pub estimator: Estimator,
    pub metrics: RegressionMetrics,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
}

impl TrainedModel {
    /// Predict the target for one unscaled feature row.
    pub fn predict_row(&self, features: &[f64]) -> Result<f64> {
        let scaled = self.scaler.transform_row(features)?;
        let n_features = scaled.len();
        let x = DenseMatrix::new(1, n_features, scaled, false);
        let predictions = self.estimator.predict(&x)?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| PowercastError::Data("estimator returned no predictions".to_string()))
    }
}
