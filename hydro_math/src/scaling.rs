//! Min-max feature scaling

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Scales values linearly so the fitted minimum maps to 0 and the maximum to 1.
///
/// A constant input has zero range; its scale is taken as 1 so every value
/// maps to 0 and the inverse transform still restores the original.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    range: f64,
}

impl MinMaxScaler {
    /// Learn the minimum and range of `values`
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a scaler on an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Scaler input must be finite".to_string(),
            ));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = if max - min > 0.0 { max - min } else { 1.0 };

        Ok(Self { min, range })
    }

    /// Fitted minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Fitted range (1 for a constant input)
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Map values into the unit interval
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v - self.min) / self.range).collect()
    }

    /// Map scaled values back to the original units
    pub fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| v * self.range + self.min).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_maps_to_unit_interval() {
        let scaler = MinMaxScaler::fit(&[10.0, 20.0, 15.0]).unwrap();
        assert_eq!(scaler.transform(&[10.0, 20.0, 15.0]), vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_round_trip() {
        let values = [3.2, -7.5, 100.25, 0.0, 42.0];
        let scaler = MinMaxScaler::fit(&values).unwrap();
        let restored = scaler.inverse_transform(&scaler.transform(&values));
        for (a, b) in values.iter().zip(&restored) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_constant_input() {
        let scaler = MinMaxScaler::fit(&[50.0, 50.0]).unwrap();
        assert_eq!(scaler.transform(&[50.0]), vec![0.0]);
        assert_eq!(scaler.inverse_transform(&[0.0]), vec![50.0]);
    }

    #[test]
    fn test_rejects_empty_or_nan() {
        assert!(MinMaxScaler::fit(&[]).is_err());
        assert!(MinMaxScaler::fit(&[1.0, f64::NAN]).is_err());
    }
}
