//! Offline training for both model families
//!
//! The holdout split is shuffled with a fixed seed and the forest is seeded
//! too, so identical input data reproduces identical metrics bit for bit.

use crate::error::{PowercastError, Result};
use crate::features::StandardScaler;
use crate::models::{metrics, Estimator, ModelType, TrainedModel};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use tracing::info;

/// Training configuration. Defaults reproduce the published artifacts:
/// 100-tree forest, 20% holdout, seed 42 everywhere randomness appears.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub test_fraction: f64,
    pub n_trees: usize,
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            n_trees: 100,
            seed: 42,
        }
    }
}

/// Fits a scaler and regression estimators on an engineered feature matrix.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Train one model family.
    ///
    /// The scaler is fitted on the training partition only and travels with
    /// the estimator; it is never refitted at inference time.
    pub fn train(
        &self,
        model_type: ModelType,
        matrix: &[Vec<f64>],
        targets: &[f64],
    ) -> Result<TrainedModel> {
        validate_training_data(matrix, targets)?;

        let (train_idx, test_idx) = self.split_indices(matrix.len());
        let train_matrix: Vec<Vec<f64>> = train_idx.iter().map(|&i| matrix[i].clone()).collect();
        let train_targets: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();
        let test_matrix: Vec<Vec<f64>> = test_idx.iter().map(|&i| matrix[i].clone()).collect();
        let test_targets: Vec<f64> = test_idx.iter().map(|&i| targets[i]).collect();

        let scaler = StandardScaler::fit(&train_matrix)?;
        let x_train = to_dense(&scaler.transform(&train_matrix)?);
        let x_test = to_dense(&scaler.transform(&test_matrix)?);

        let estimator = match model_type {
            ModelType::Linear => {
                let model = LinearRegression::fit(
                    &x_train,
                    &train_targets,
                    LinearRegressionParameters::default(),
                )
                .map_err(|e| {
                    PowercastError::Training(format!("linear regression fit failed: {}", e))
                })?;
                Estimator::Linear(model)
            }
            ModelType::Ensemble => {
                let params = RandomForestRegressorParameters::default()
                    .with_n_trees(self.config.n_trees)
                    .with_seed(self.config.seed);
                let model = RandomForestRegressor::fit(&x_train, &train_targets, params)
                    .map_err(|e| {
                        PowercastError::Training(format!("random forest fit failed: {}", e))
                    })?;
                Estimator::Ensemble(model)
            }
        };

        let predictions = estimator.predict(&x_test)?;
        let metrics = metrics::evaluate(&predictions, &test_targets)?;

        info!(
            model = %model_type,
            train_rows = train_idx.len(),
            test_rows = test_idx.len(),
            rmse = metrics.rmse,
            mae = metrics.mae,
            r2 = metrics.r2,
            "trained model family"
        );

        Ok(TrainedModel {
            model_type,
            scaler,
            estimator,
            metrics,
            trained_at: Utc::now(),
            training_samples: train_idx.len(),
        })
    }

    /// Train every supported family. Families are fitted sequentially and a
    /// failure aborts before the next fit, so a partial run commits nothing.
    pub fn train_all(&self, matrix: &[Vec<f64>], targets: &[f64]) -> Result<Vec<TrainedModel>> {
        ModelType::ALL
            .iter()
            .map(|&model_type| self.train(model_type, matrix, targets))
            .collect()
    }

    /// Seeded shuffled holdout split over row indices.
    fn split_indices(&self, n_rows: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n_rows).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let test_size = (n_rows as f64 * self.config.test_fraction).round() as usize;
        let test_size = test_size.clamp(1, n_rows - 1);
        let (test, train) = indices.split_at(test_size);
        (train.to_vec(), test.to_vec())
    }
}

fn validate_training_data(matrix: &[Vec<f64>], targets: &[f64]) -> Result<()> {
    if matrix.is_empty() {
        return Err(PowercastError::Training(
            "feature matrix has zero rows after pipeline filtering".to_string(),
        ));
    }
    if matrix.len() != targets.len() {
        return Err(PowercastError::Training(format!(
            "feature/target count mismatch: {} rows, {} targets",
            matrix.len(),
            targets.len()
        )));
    }
    if matrix.len() < 2 {
        return Err(PowercastError::Training(
            "need at least 2 rows to hold out a test partition".to_string(),
        ));
    }
    for (i, row) in matrix.iter().enumerate() {
        if row.iter().any(|v| !v.is_finite()) {
            return Err(PowercastError::Training(format!(
                "non-finite value in feature row {}",
                i
            )));
        }
    }
    if targets.iter().any(|t| !t.is_finite()) {
        return Err(PowercastError::Training(
            "non-finite value in target vector".to_string(),
        ));
    }
    Ok(())
}

fn to_dense(matrix: &[Vec<f64>]) -> DenseMatrix<f64> {
    let n_rows = matrix.len();
    let n_cols = matrix.first().map_or(0, Vec::len);
    let mut flat = Vec::with_capacity(n_rows * n_cols);
    for row in matrix {
        flat.extend_from_slice(row);
    }
    DenseMatrix::new(n_rows, n_cols, flat, false)
}
