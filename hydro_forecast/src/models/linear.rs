//! Ordinary least squares on lag windows

use crate::config::{validate_test_size, EngineConfig};
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    train_on_windows, FittedModel, ForecastAdapter, ModelKind, ModelOutcome, ModelResult,
};
use hydro_math::LinearRegression;
use tracing::debug;

/// Linear regression of the next value on the previous `lookback` values
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressionAdapter {
    lookback: usize,
    test_size: f64,
}

impl LinearRegressionAdapter {
    /// Create an adapter with the given window length and held-out fraction
    pub fn new(lookback: usize, test_size: f64) -> Result<Self> {
        if lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lookback must be at least 1".to_string(),
            ));
        }
        validate_test_size(test_size)?;
        Ok(Self {
            lookback,
            test_size,
        })
    }

    /// Create an adapter from engine settings
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.lookback, config.test_size)
    }
}

impl ForecastAdapter for LinearRegressionAdapter {
    fn kind(&self) -> ModelKind {
        ModelKind::LinearRegression
    }

    fn train(&self, series: &TimeSeries) -> Result<ModelOutcome> {
        let (model, predictions, metrics) =
            train_on_windows(LinearRegression::new(), series, self.lookback, self.test_size)?;

        let intercept = model.intercept()?;
        debug!(model = self.name(), intercept, "fitted least squares");

        Ok(ModelOutcome::Fitted(ModelResult {
            model: FittedModel::Linear(model),
            predictions,
            metrics,
        }))
    }
}
