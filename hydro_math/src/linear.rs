//! Ordinary least squares regression with intercept

use crate::{check_design, check_rows, MathError, Regressor, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Linear regression fitted by ordinary least squares.
///
/// Data are centered before solving, so the intercept is never penalised
/// and is recovered as `mean(y) - mean(x) · coefficients`. The centered
/// system is solved through an SVD, which yields the minimum-norm solution
/// when feature columns are collinear (consecutive lag windows of a trending
/// series are a typical example).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Option<Vec<f64>>,
    intercept: Option<f64>,
}

impl LinearRegression {
    /// Create an unfitted linear regression
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitted coefficients, one per feature
    pub fn coefficients(&self) -> Result<&[f64]> {
        self.coefficients.as_deref().ok_or_else(|| {
            MathError::CalculationError("Linear regression has not been fitted".to_string())
        })
    }

    /// Fitted intercept
    pub fn intercept(&self) -> Result<f64> {
        self.intercept.ok_or_else(|| {
            MathError::CalculationError("Linear regression has not been fitted".to_string())
        })
    }

    /// Whether `fit` has completed successfully
    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let n_features = check_design(x, y)?;
        let n_samples = x.len();
        let n = n_samples as f64;

        let x_mean: Vec<f64> = (0..n_features)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n)
            .collect();
        let y_mean = y.iter().sum::<f64>() / n;

        let centered = DMatrix::from_fn(n_samples, n_features, |i, j| x[i][j] - x_mean[j]);
        let target = DVector::from_iterator(n_samples, y.iter().map(|v| v - y_mean));

        let svd = centered.svd(true, true);
        let max_singular = svd.singular_values.max();

        let coefficients: Vec<f64> = if max_singular <= f64::EPSILON {
            // Every feature is constant: the best fit is the mean.
            vec![0.0; n_features]
        } else {
            let tolerance = max_singular * n_samples.max(n_features) as f64 * f64::EPSILON;
            let solution = svd
                .solve(&target, tolerance)
                .map_err(|e| MathError::CalculationError(e.to_string()))?;
            solution.iter().copied().collect()
        };

        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(MathError::CalculationError(
                "Least squares produced non-finite coefficients".to_string(),
            ));
        }

        let intercept = y_mean
            - x_mean
                .iter()
                .zip(&coefficients)
                .map(|(m, c)| m * c)
                .sum::<f64>();

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let coefficients = self.coefficients()?;
        let intercept = self.intercept()?;
        check_rows(x, coefficients.len())?;

        Ok(x.iter()
            .map(|row| {
                intercept
                    + row
                        .iter()
                        .zip(coefficients)
                        .map(|(v, c)| v * c)
                        .sum::<f64>()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_recovers_exact_plane() {
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 2.0 * r[0] - 3.0 * r[1] + 1.5).collect();

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coefficients = model.coefficients().unwrap();
        assert_relative_eq!(coefficients[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(coefficients[1], -3.0, epsilon = 1e-9);
        assert_relative_eq!(model.intercept().unwrap(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_collinear_windows_extrapolate() {
        // Lag windows of a straight line are perfectly collinear.
        let series: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let lookback = 4;
        let x: Vec<Vec<f64>> = (lookback..30)
            .map(|i| series[i - lookback..i].to_vec())
            .collect();
        let y: Vec<f64> = (lookback..30).map(|i| series[i]).collect();

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let unseen: Vec<Vec<f64>> = (30..40)
            .map(|i| series[i - lookback..i].to_vec())
            .collect();
        let predicted = model.predict(&unseen).unwrap();
        for (p, i) in predicted.iter().zip(30..40) {
            assert_relative_eq!(*p, series[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_constant_features_predict_mean() {
        let x = vec![vec![1.0], vec![1.0], vec![1.0]];
        let y = vec![3.0, 4.0, 5.0];
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let predicted = model.predict(&[vec![1.0]]).unwrap();
        assert_relative_eq!(predicted[0], 4.0);
    }

    #[test]
    fn test_predict_requires_fit() {
        let model = LinearRegression::new();
        assert!(model.predict(&[vec![1.0]]).is_err());
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let mut model = LinearRegression::new();
        model
            .fit(&[vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 3.0]], &[1.0, 2.0, 3.0])
            .unwrap();
        assert!(model.predict(&[vec![1.0]]).is_err());
    }
}
