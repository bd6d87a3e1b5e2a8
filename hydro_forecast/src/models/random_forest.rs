//! Bootstrap forest of regression trees on lag windows

use crate::config::{validate_test_size, EngineConfig, ForestConfig};
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    train_on_windows, FittedModel, ForecastAdapter, ModelKind, ModelOutcome, ModelResult,
};
use hydro_math::RandomForestRegressor;
use tracing::debug;

/// Random forest regression of the next value on the previous `lookback` values.
///
/// Seeded, so repeated training on the same series is bit-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestAdapter {
    lookback: usize,
    test_size: f64,
    forest: ForestConfig,
    random_seed: u64,
}

impl RandomForestAdapter {
    pub fn new(
        lookback: usize,
        test_size: f64,
        forest: ForestConfig,
        random_seed: u64,
    ) -> Result<Self> {
        if lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lookback must be at least 1".to_string(),
            ));
        }
        validate_test_size(test_size)?;
        forest.validate()?;

        Ok(Self {
            lookback,
            test_size,
            forest,
            random_seed,
        })
    }

    /// Create an adapter from engine settings
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(
            config.lookback,
            config.test_size,
            config.forest,
            config.random_seed,
        )
    }
}

impl ForecastAdapter for RandomForestAdapter {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn train(&self, series: &TimeSeries) -> Result<ModelOutcome> {
        let estimator = RandomForestRegressor::new(self.forest.n_estimators)
            .with_max_depth(self.forest.max_depth)
            .with_random_state(self.random_seed);

        let (model, predictions, metrics) =
            train_on_windows(estimator, series, self.lookback, self.test_size)?;

        debug!(
            model = self.name(),
            trees = model.trees().len(),
            seed = self.random_seed,
            "fitted random forest"
        );

        Ok(ModelOutcome::Fitted(ModelResult {
            model: FittedModel::RandomForest(model),
            predictions,
            metrics,
        }))
    }
}
