//! Model comparison over named series
//!
//! [`ModelComparison`] trains every adapter on a series, keeps the outcomes in
//! a registry keyed by series name and model, and returns one metrics row per
//! available model.

use crate::config::EngineConfig;
use crate::data::TimeSeries;
use crate::error::Result;
use crate::loader::HydrocarbonDataset;
use crate::metrics::RegressionMetrics;
use crate::models::{
    ForecastAdapter, LinearRegressionAdapter, ModelKind, ModelOutcome, ModelResult,
    PredictionBundle, RandomForestAdapter, SarimaAdapter,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info, warn};

/// Train and test metrics of one model on one series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub model: ModelKind,
    pub train: RegressionMetrics,
    pub test: RegressionMetrics,
}

impl MetricRecord {
    pub fn train_rmse(&self) -> f64 {
        self.train.rmse()
    }

    pub fn test_rmse(&self) -> f64 {
        self.test.rmse()
    }
}

/// How to rank the rows of a [`ComparisonTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricCriterion {
    LowestTestMae,
    LowestTestMse,
    HighestTestR2,
}

/// Metrics of every available model on one series, in model order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub series_name: String,
    pub rows: Vec<MetricRecord>,
}

impl ComparisonTable {
    /// The row of one model, if it was available
    pub fn row(&self, model: ModelKind) -> Option<&MetricRecord> {
        self.rows.iter().find(|r| r.model == model)
    }

    /// Keep only the listed models
    pub fn filter(&self, models: &[ModelKind]) -> ComparisonTable {
        ComparisonTable {
            series_name: self.series_name.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| models.contains(&r.model))
                .copied()
                .collect(),
        }
    }

    /// Best row under `criterion`; the earlier model wins ties
    pub fn best_by(&self, criterion: MetricCriterion) -> Option<&MetricRecord> {
        let score = |r: &MetricRecord| match criterion {
            MetricCriterion::LowestTestMae => r.test.mae,
            MetricCriterion::LowestTestMse => r.test.mse,
            MetricCriterion::HighestTestR2 => -r.test.r2,
        };
        self.rows
            .iter()
            .filter(|r| !score(r).is_nan())
            .fold(None, |best: Option<&MetricRecord>, r| match best {
                Some(b) if score(b) <= score(r) => Some(b),
                _ => Some(r),
            })
    }

    /// The table as a polars frame, one row per model
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let column = |name: &str, f: fn(&MetricRecord) -> f64| {
            Series::new(name, self.rows.iter().map(f).collect::<Vec<f64>>())
        };
        let models: Vec<&str> = self.rows.iter().map(|r| r.model.name()).collect();

        let df = DataFrame::new(vec![
            Series::new("Modelo", models),
            column("MAE (Train)", |r| r.train.mae),
            column("MSE (Train)", |r| r.train.mse),
            column("R² (Train)", |r| r.train.r2),
            column("MAE (Test)", |r| r.test.mae),
            column("MSE (Test)", |r| r.test.mse),
            column("R² (Test)", |r| r.test.r2),
        ])?;
        Ok(df)
    }

    /// Serialize the table to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.series_name)?;
        writeln!(
            f,
            "{:<18} {:>14} {:>16} {:>10} {:>14} {:>16} {:>10}",
            "Modelo", "MAE (Train)", "MSE (Train)", "R² (Train)", "MAE (Test)", "MSE (Test)", "R² (Test)"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<18} {:>14.4} {:>16.4} {:>10.4} {:>14.4} {:>16.4} {:>10.4}",
                r.model.name(),
                r.train.mae,
                r.train.mse,
                r.train.r2,
                r.test.mae,
                r.test.mse,
                r.test.r2
            )?;
        }
        Ok(())
    }
}

/// Trains the model families on named series and keeps their outcomes
#[derive(Debug)]
pub struct ModelComparison {
    config: EngineConfig,
    adapters: Vec<Box<dyn ForecastAdapter>>,
    registry: HashMap<String, BTreeMap<ModelKind, ModelOutcome>>,
}

impl ModelComparison {
    /// Create an engine with an empty registry
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let adapters: Vec<Box<dyn ForecastAdapter>> = vec![
            Box::new(LinearRegressionAdapter::from_config(&config)?),
            Box::new(RandomForestAdapter::from_config(&config)?),
            Box::new(SarimaAdapter::from_config(&config)?),
        ];
        Ok(Self {
            config,
            adapters,
            registry: HashMap::new(),
        })
    }

    /// Settings the engine was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Train every model on `series` and record the outcomes under `name`.
    ///
    /// An input error from any model leaves the registry unchanged. Otherwise
    /// the entry for `name` is replaced as a whole.
    pub fn compare(&mut self, series: &TimeSeries, name: &str) -> Result<ComparisonTable> {
        info!(series = name, points = series.len(), "comparing models");

        let mut outcomes = BTreeMap::new();
        for adapter in &self.adapters {
            let outcome = adapter.train(series)?;
            match &outcome {
                ModelOutcome::Fitted(result) => debug!(
                    series = name,
                    model = adapter.name(),
                    test_mae = result.metrics.test.mae,
                    test_r2 = result.metrics.test.r2,
                    "model trained"
                ),
                ModelOutcome::Unavailable { reason } => warn!(
                    series = name,
                    model = adapter.name(),
                    reason = %reason,
                    "model unavailable"
                ),
            }
            outcomes.insert(adapter.kind(), outcome);
        }

        let rows = outcomes
            .iter()
            .filter_map(|(&model, outcome)| {
                outcome.result().map(|r| MetricRecord {
                    model,
                    train: r.metrics.train,
                    test: r.metrics.test,
                })
            })
            .collect();

        self.registry.insert(name.to_string(), outcomes);
        Ok(ComparisonTable {
            series_name: name.to_string(),
            rows,
        })
    }

    /// Compare all six series of a loaded dataset, keyed by display name
    pub fn compare_dataset(
        &mut self,
        dataset: &HydrocarbonDataset,
    ) -> Result<BTreeMap<String, ComparisonTable>> {
        let mut tables = BTreeMap::new();
        for (name, series) in dataset.combined()? {
            let table = self.compare(&series, &name)?;
            tables.insert(name, table);
        }
        info!(series = tables.len(), "compared dataset");
        Ok(tables)
    }

    /// Predictions of `model` on the series trained as `name`
    pub fn get_predictions(&self, name: &str, model: ModelKind) -> Option<&PredictionBundle> {
        self.get_result(name, model).map(|r| &r.predictions)
    }

    /// Full fitted result of `model` on the series trained as `name`
    pub fn get_result(&self, name: &str, model: ModelKind) -> Option<&ModelResult> {
        self.registry.get(name)?.get(&model)?.result()
    }

    /// Outcome of `model` on `name`, including unavailable markers
    pub fn get_outcome(&self, name: &str, model: ModelKind) -> Option<&ModelOutcome> {
        self.registry.get(name)?.get(&model)
    }

    /// Names of the series trained so far, sorted
    pub fn trained_series(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether `name` has been trained
    pub fn is_trained(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }
}
