//! Regression quality metrics for model evaluation

use crate::error::{PowercastError, Result};
use serde::{Deserialize, Serialize};

/// Held-out regression metrics surfaced to forecast callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Coefficient of determination
    pub r2: f64,
}

/// Evaluate predictions against held-out actuals.
pub fn evaluate(predictions: &[f64], actuals: &[f64]) -> Result<RegressionMetrics> {
    if predictions.len() != actuals.len() || predictions.is_empty() {
        return Err(PowercastError::Validation(
            "predictions and actuals must have the same non-zero length".to_string(),
        ));
    }

    let n = predictions.len() as f64;

    let mae = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / n;

    let mse = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (p - a).powi(2))
        .sum::<f64>()
        / n;
    let rmse = mse.sqrt();

    let mean_actual = actuals.iter().sum::<f64>() / n;
    let ss_tot: f64 = actuals.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res: f64 = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (a - p).powi(2))
        .sum();

    // A constant actual series has no variance to explain.
    let r2 = if ss_tot.abs() < 1e-10 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(RegressionMetrics { rmse, mae, r2 })
}

impl std::fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  RMSE: {:.2} kWh", self.rmse)?;
        writeln!(f, "  MAE:  {:.2} kWh", self.mae)?;
        writeln!(f, "  R²:   {:.4}", self.r2)?;
        Ok(())
    }
}
