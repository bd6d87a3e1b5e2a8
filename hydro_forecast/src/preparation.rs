//! Supervised-learning windows and chronological train/test splits

use crate::config::validate_test_size;
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Lag windows of a series, split chronologically into train and test
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    /// Feature windows of the training partition
    pub x_train: Vec<Vec<f64>>,
    /// Feature windows of the test partition
    pub x_test: Vec<Vec<f64>>,
    /// Labels of the training partition
    pub y_train: Vec<f64>,
    /// Labels of the test partition
    pub y_test: Vec<f64>,
    /// Date of each label, train then test
    pub dates: Vec<NaiveDate>,
}

impl PreparedData {
    /// Total number of windows
    pub fn len(&self) -> usize {
        self.y_train.len() + self.y_test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Index at which `total` chronologically ordered items are split:
/// `floor(total * (1 - test_size))`.
pub fn split_index(total: usize, test_size: f64) -> usize {
    (total as f64 * (1.0 - test_size)).floor() as usize
}

/// Turn a series into `(lookback values) -> next value` windows and split them.
///
/// For a series of length `N` this yields exactly `N - lookback` windows; the
/// first `floor((N - lookback) * (1 - test_size))` are the training partition.
/// Order is preserved, so every training window precedes every test window.
pub fn prepare(series: &TimeSeries, lookback: usize, test_size: f64) -> Result<PreparedData> {
    validate_test_size(test_size)?;

    if lookback == 0 {
        return Err(ForecastError::InvalidParameter(
            "Lookback must be at least 1".to_string(),
        ));
    }

    if series.has_missing() {
        return Err(ForecastError::DataError(
            "Series contains missing values; drop them before preparing windows".to_string(),
        ));
    }

    let values = series.values();
    if lookback >= values.len() {
        return Err(ForecastError::InsufficientData {
            needed: lookback + 1,
            got: values.len(),
        });
    }

    let (features, labels): (Vec<Vec<f64>>, Vec<f64>) = (lookback..values.len())
        .map(|i| (values[i - lookback..i].to_vec(), values[i]))
        .unzip();

    let split = split_index(labels.len(), test_size);
    if split == 0 {
        // Need enough windows that at least one lands in the training partition.
        let needed_windows = (1.0 / (1.0 - test_size)).ceil() as usize;
        return Err(ForecastError::InsufficientData {
            needed: lookback + needed_windows,
            got: values.len(),
        });
    }

    let mut x_train = features;
    let x_test = x_train.split_off(split);
    let mut y_train = labels;
    let y_test = y_train.split_off(split);

    Ok(PreparedData {
        x_train,
        x_test,
        y_train,
        y_test,
        dates: series.dates()[lookback..].to_vec(),
    })
}
