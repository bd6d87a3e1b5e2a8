//! Descriptive statistics of the loaded series

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics, Statistics};
use std::collections::{BTreeMap, BTreeSet};

/// Summary of one series, in the layout of a `describe()` table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    /// Standard deviation as a percentage of the mean; `NaN` for a zero mean
    pub cv_percent: f64,
}

/// Summarise the non-missing values of `series`
pub fn describe(series: &TimeSeries) -> Result<SeriesStatistics> {
    let clean = series.drop_missing();
    let values = clean.values();
    if values.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }

    let mean = values.iter().mean();
    let std = if values.len() > 1 {
        values.iter().std_dev()
    } else {
        0.0
    };
    let mut data = Data::new(values.to_vec());

    Ok(SeriesStatistics {
        count: values.len(),
        mean,
        std,
        min: Statistics::min(values.iter()),
        q25: data.quantile(0.25),
        median: data.quantile(0.5),
        q75: data.quantile(0.75),
        max: Statistics::max(values.iter()),
        cv_percent: if mean == 0.0 {
            f64::NAN
        } else {
            std / mean * 100.0
        },
    })
}

/// Sum of the values in each calendar year
pub fn yearly_totals(series: &TimeSeries) -> BTreeMap<i32, f64> {
    let mut totals = BTreeMap::new();
    for (date, value) in series.iter().filter(|(_, v)| !v.is_nan()) {
        *totals.entry(date.year()).or_insert(0.0) += value;
    }
    totals
}

/// Mean value of each calendar month (1 to 12) over all years present
pub fn monthly_means(series: &TimeSeries) -> BTreeMap<u32, f64> {
    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for (date, value) in series.iter().filter(|(_, v)| !v.is_nan()) {
        by_month.entry(date.month()).or_default().push(value);
    }
    by_month
        .into_iter()
        .map(|(month, values)| (month, values.iter().mean()))
        .collect()
}

/// Pearson correlations between named series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major, `values[i][j]` correlates `names[i]` with `names[j]`
    pub values: Vec<Vec<f64>>,
    /// Number of shared dates the correlations were computed on
    pub observations: usize,
}

impl CorrelationMatrix {
    /// Correlation between two series by name
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }
}

/// Pairwise Pearson correlation over the dates every series has a value for.
///
/// A constant series has an undefined correlation, reported as `NaN`.
pub fn correlation_matrix(series: &[(String, &TimeSeries)]) -> Result<CorrelationMatrix> {
    let cleaned: Vec<TimeSeries> = series.iter().map(|(_, s)| s.drop_missing()).collect();

    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for s in &cleaned {
        let dates: BTreeSet<NaiveDate> = s.dates().iter().copied().collect();
        common = Some(match common {
            None => dates,
            Some(acc) => acc.intersection(&dates).copied().collect(),
        });
    }
    let common = common.unwrap_or_default();
    if common.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: common.len(),
        });
    }

    let aligned: Vec<Vec<f64>> = cleaned
        .iter()
        .map(|s| {
            s.iter()
                .filter(|(date, _)| common.contains(date))
                .map(|(_, value)| value)
                .collect()
        })
        .collect();

    let values = aligned
        .iter()
        .map(|a| aligned.iter().map(|b| pearson(a, b)).collect())
        .collect();

    Ok(CorrelationMatrix {
        names: series.iter().map(|(name, _)| name.clone()).collect(),
        values,
        observations: common.len(),
    })
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let covariance = a.iter().covariance(b.iter());
    let denominator = a.iter().std_dev() * b.iter().std_dev();
    if denominator == 0.0 {
        f64::NAN
    } else {
        covariance / denominator
    }
}
