//! # Hydro Math
//!
//! Numerical building blocks for the hydrocarbon forecasting engine.
//! This crate provides the estimators and numeric helpers the model
//! adapters are assembled from:
//!
//! - Ordinary least squares with intercept ([`linear::LinearRegression`])
//! - CART regression trees and a bootstrap forest ([`tree`])
//! - Nelder–Mead simplex minimisation ([`optimize`])
//! - Regular and seasonal differencing ([`diff`])
//! - Min-max scaling ([`scaling::MinMaxScaler`])

use thiserror::Error;

pub mod diff;
pub mod linear;
pub mod optimize;
pub mod scaling;
pub mod tree;

pub use crate::linear::LinearRegression;
pub use crate::scaling::MinMaxScaler;
pub use crate::tree::{DecisionTreeRegressor, RandomForestRegressor};

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

/// An estimator that learns a mapping from feature rows to a scalar target.
///
/// Feature matrices are passed row-major, one `Vec<f64>` per sample.
pub trait Regressor {
    /// Fit the estimator to `x` (one row per sample) and targets `y`
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    /// Predict one value per row of `x`
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>>;
}

/// Check that a feature matrix is non-empty, rectangular and matches `y`.
///
/// Returns the number of features per row.
pub(crate) fn check_design(x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    if x.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot fit on an empty feature matrix".to_string(),
        ));
    }
    if x.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Feature rows ({}) don't match target length ({})",
            x.len(),
            y.len()
        )));
    }
    let n_features = x[0].len();
    if n_features == 0 {
        return Err(MathError::InvalidInput(
            "Feature rows must not be empty".to_string(),
        ));
    }
    if x.iter().any(|row| row.len() != n_features) {
        return Err(MathError::InvalidInput(
            "All feature rows must have the same length".to_string(),
        ));
    }
    Ok(n_features)
}

/// Check that prediction rows have the width the estimator was fitted on.
pub(crate) fn check_rows(x: &[Vec<f64>], n_features: usize) -> Result<()> {
    if let Some(row) = x.iter().find(|row| row.len() != n_features) {
        return Err(MathError::InvalidInput(format!(
            "Expected {} features per row, got {}",
            n_features,
            row.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_design_rejects_ragged_rows() {
        let x = vec![vec![1.0, 2.0], vec![3.0]];
        let y = vec![1.0, 2.0];
        assert!(matches!(
            check_design(&x, &y),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_check_design_rejects_length_mismatch() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![1.0];
        assert!(check_design(&x, &y).is_err());
    }

    #[test]
    fn test_check_design_reports_width() {
        let x = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let y = vec![1.0, 2.0];
        assert_eq!(check_design(&x, &y).unwrap(), 3);
    }
}
