//! Metrics for evaluating forecast performance
//!
//! Every function here is pure and fails fast on empty or mismatched input.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Error metrics for one (actual, predicted) pair of sequences.
///
/// RMSE is not stored; use [`RegressionMetrics::rmse`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// `true` when the actual values have zero variance, making `r2`
    /// a convention rather than a measurement
    pub r2_degenerate: bool,
}

impl RegressionMetrics {
    /// Root Mean Squared Error, derived from `mse`
    pub fn rmse(&self) -> f64 {
        self.mse.sqrt()
    }
}

impl std::fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MAE {:.4}  MSE {:.4}  RMSE {:.4}  R² {:.4}",
            self.mae,
            self.mse,
            self.rmse(),
            self.r2
        )?;
        if self.r2_degenerate {
            write!(f, " (constant actuals)")?;
        }
        Ok(())
    }
}

/// Metrics for both partitions of one fitted model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainTestMetrics {
    pub train: RegressionMetrics,
    pub test: RegressionMetrics,
}

impl TrainTestMetrics {
    /// Compute metrics for the train and test partitions
    pub fn evaluate(
        y_train: &[f64],
        train_pred: &[f64],
        y_test: &[f64],
        test_pred: &[f64],
    ) -> Result<Self> {
        Ok(Self {
            train: compute_metrics(y_train, train_pred)?,
            test: compute_metrics(y_test, test_pred)?,
        })
    }
}

fn check_pair(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.is_empty() {
        return Err(ForecastError::ValidationError(
            "Cannot compute metrics on empty sequences".to_string(),
        ));
    }
    if y_true.len() != y_pred.len() {
        return Err(ForecastError::ValidationError(format!(
            "Actual length ({}) doesn't match predicted length ({})",
            y_true.len(),
            y_pred.len()
        )));
    }
    Ok(())
}

/// Mean of `|y_true - y_pred|`
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_pair(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(sum / y_true.len() as f64)
}

/// Mean of `(y_true - y_pred)^2`
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_pair(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok(sum / y_true.len() as f64)
}

/// Square root of the mean squared error
pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    mean_squared_error(y_true, y_pred).map(f64::sqrt)
}

/// Coefficient of determination, plus whether `y_true` was constant.
///
/// With constant actuals the total sum of squares is zero and R² is
/// undefined. The value is then 1.0 for a perfect prediction and 0.0
/// otherwise, and the second element of the tuple is `true`.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<(f64, bool)> {
    check_pair(y_true, y_pred)?;

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        let r2 = if ss_res == 0.0 { 1.0 } else { 0.0 };
        return Ok((r2, true));
    }

    Ok((1.0 - ss_res / ss_tot, false))
}

/// MAE, MSE and R² of a prediction
pub fn compute_metrics(y_true: &[f64], y_pred: &[f64]) -> Result<RegressionMetrics> {
    let (r2, r2_degenerate) = r2_score(y_true, y_pred)?;
    Ok(RegressionMetrics {
        mae: mean_absolute_error(y_true, y_pred)?,
        mse: mean_squared_error(y_true, y_pred)?,
        r2,
        r2_degenerate,
    })
}
