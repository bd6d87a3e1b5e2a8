//! Forecasting model adapters
//!
//! Three model families sit behind one [`ForecastAdapter`] interface. The
//! linear and random forest adapters learn from lag windows produced by
//! [`crate::preparation::prepare`]; the seasonal adapter works on the raw
//! series. Every adapter returns a [`ModelOutcome`], which is either a fitted
//! result or an explicit "unavailable for this series" marker.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::metrics::TrainTestMetrics;
use crate::preparation::prepare;
use chrono::NaiveDate;
use hydro_math::{LinearRegression, RandomForestRegressor, Regressor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod linear;
pub mod random_forest;
pub mod sarima;

pub use linear::LinearRegressionAdapter;
pub use random_forest::RandomForestAdapter;
pub use sarima::{SarimaAdapter, SarimaFit, SeriesNormalizer};

/// The model families compared by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    LinearRegression,
    RandomForest,
    Sarima,
}

impl ModelKind {
    /// All model kinds in comparison order
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LinearRegression,
        ModelKind::RandomForest,
        ModelKind::Sarima,
    ];

    /// Display name, also the registry key
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "Linear Regression",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::Sarima => "SARIMA",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ForecastError::ParseError(format!("Unknown model name: {}", s)))
    }
}

/// Predictions of one model on one series, with the matching ground truth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBundle {
    /// Fitted values on the training partition
    pub train: Vec<f64>,
    /// Forecasts for the test partition
    pub test: Vec<f64>,
    /// Actual training values
    pub y_train: Vec<f64>,
    /// Actual test values
    pub y_test: Vec<f64>,
    /// Date of every point, training points first
    pub dates: Vec<NaiveDate>,
}

impl PredictionBundle {
    /// Create a bundle, checking that predictions, actuals and dates line up
    pub fn new(
        train: Vec<f64>,
        test: Vec<f64>,
        y_train: Vec<f64>,
        y_test: Vec<f64>,
        dates: Vec<NaiveDate>,
    ) -> Result<Self> {
        if train.len() != y_train.len() {
            return Err(ForecastError::ValidationError(format!(
                "Train predictions ({}) don't match train actuals ({})",
                train.len(),
                y_train.len()
            )));
        }
        if test.len() != y_test.len() {
            return Err(ForecastError::ValidationError(format!(
                "Test predictions ({}) don't match test actuals ({})",
                test.len(),
                y_test.len()
            )));
        }
        if dates.len() != y_train.len() + y_test.len() {
            return Err(ForecastError::ValidationError(format!(
                "Dates ({}) don't cover train ({}) and test ({}) points",
                dates.len(),
                y_train.len(),
                y_test.len()
            )));
        }

        Ok(Self {
            train,
            test,
            y_train,
            y_test,
            dates,
        })
    }

    /// Position of the first test point in `dates`
    pub fn split_index(&self) -> usize {
        self.y_train.len()
    }

    /// Dates of the training points
    pub fn train_dates(&self) -> &[NaiveDate] {
        &self.dates[..self.split_index()]
    }

    /// Dates of the test points
    pub fn test_dates(&self) -> &[NaiveDate] {
        &self.dates[self.split_index()..]
    }

    /// `(actual, predicted)` for every point, train then test
    pub fn actual_vs_predicted(&self) -> Vec<(f64, f64)> {
        self.y_train
            .iter()
            .zip(&self.train)
            .chain(self.y_test.iter().zip(&self.test))
            .map(|(a, p)| (*a, *p))
            .collect()
    }

    /// Smallest and largest value over actuals and predictions
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.actual_vs_predicted()
            .into_iter()
            .flat_map(|(a, p)| [a, p])
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// `actual - predicted` over the test partition
    pub fn test_residuals(&self) -> Vec<f64> {
        self.y_test
            .iter()
            .zip(&self.test)
            .map(|(a, p)| a - p)
            .collect()
    }

    /// Serialize the bundle to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The trained estimator behind a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedModel {
    Linear(LinearRegression),
    RandomForest(RandomForestRegressor),
    Sarima(SarimaFit),
}

/// A fitted model together with its predictions and metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    pub model: FittedModel,
    pub predictions: PredictionBundle,
    pub metrics: TrainTestMetrics,
}

/// Result of training one adapter on one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelOutcome {
    /// The model was fitted
    Fitted(ModelResult),
    /// The model could not be fitted on this series
    Unavailable { reason: String },
}

impl ModelOutcome {
    /// Whether a fitted result is present
    pub fn is_fitted(&self) -> bool {
        matches!(self, ModelOutcome::Fitted(_))
    }

    /// The fitted result, if any
    pub fn result(&self) -> Option<&ModelResult> {
        match self {
            ModelOutcome::Fitted(result) => Some(result),
            ModelOutcome::Unavailable { .. } => None,
        }
    }

    /// The prediction bundle, if any
    pub fn predictions(&self) -> Option<&PredictionBundle> {
        self.result().map(|r| &r.predictions)
    }

    /// Consume the outcome, keeping the fitted result
    pub fn into_result(self) -> Option<ModelResult> {
        match self {
            ModelOutcome::Fitted(result) => Some(result),
            ModelOutcome::Unavailable { .. } => None,
        }
    }
}

/// Common interface of the model adapters
pub trait ForecastAdapter: fmt::Debug {
    /// Which model family this adapter trains
    fn kind(&self) -> ModelKind;

    /// Train on `series` and evaluate on its held-out tail.
    ///
    /// Invalid input is an error. A model that cannot be fitted on otherwise
    /// valid input is reported as [`ModelOutcome::Unavailable`].
    fn train(&self, series: &TimeSeries) -> Result<ModelOutcome>;

    /// Name of the model
    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Shared data path of the window-based adapters: drop missing values,
/// build lag windows, fit `estimator`, predict both partitions and score.
pub(crate) fn train_on_windows<R: Regressor>(
    mut estimator: R,
    series: &TimeSeries,
    lookback: usize,
    test_size: f64,
) -> Result<(R, PredictionBundle, TrainTestMetrics)> {
    let prepared = prepare(&series.drop_missing(), lookback, test_size)?;

    estimator.fit(&prepared.x_train, &prepared.y_train)?;
    let train_pred = estimator.predict(&prepared.x_train)?;
    let test_pred = estimator.predict(&prepared.x_test)?;

    let metrics = TrainTestMetrics::evaluate(
        &prepared.y_train,
        &train_pred,
        &prepared.y_test,
        &test_pred,
    )?;
    let bundle = PredictionBundle::new(
        train_pred,
        test_pred,
        prepared.y_train,
        prepared.y_test,
        prepared.dates,
    )?;

    Ok((estimator, bundle, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        TimeSeries::monthly(2020, 1, vec![0.0; n])
            .unwrap()
            .dates()
            .to_vec()
    }

    #[test]
    fn test_bundle_validates_lengths() {
        assert!(PredictionBundle::new(vec![1.0], vec![2.0], vec![1.0], vec![2.0], dates(2)).is_ok());
        assert!(PredictionBundle::new(vec![1.0], vec![2.0], vec![1.0, 1.5], vec![2.0], dates(3)).is_err());
        assert!(PredictionBundle::new(vec![1.0], vec![], vec![1.0], vec![2.0], dates(2)).is_err());
        assert!(PredictionBundle::new(vec![1.0], vec![2.0], vec![1.0], vec![2.0], dates(3)).is_err());
    }

    #[test]
    fn test_bundle_helpers() {
        let bundle = PredictionBundle::new(
            vec![1.0, 2.0],
            vec![4.0],
            vec![1.5, 2.0],
            vec![3.0],
            dates(3),
        )
        .unwrap();

        assert_eq!(bundle.split_index(), 2);
        assert_eq!(bundle.train_dates().len(), 2);
        assert_eq!(bundle.test_dates(), &dates(3)[2..]);
        assert_eq!(
            bundle.actual_vs_predicted(),
            vec![(1.5, 1.0), (2.0, 2.0), (3.0, 4.0)]
        );
        assert_eq!(bundle.value_range(), Some((1.0, 4.0)));
        assert_eq!(bundle.test_residuals(), vec![-1.0]);
    }

    #[test]
    fn test_model_kind_names() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
        }
        assert_eq!("sarima".parse::<ModelKind>().unwrap(), ModelKind::Sarima);
        assert!("Prophet".parse::<ModelKind>().is_err());
    }
}
