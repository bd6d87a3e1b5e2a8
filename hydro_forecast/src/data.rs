//! Time series data handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A date-indexed numeric series.
///
/// Dates are strictly increasing. Missing observations are stored as `NaN`
/// and must be removed with [`TimeSeries::drop_missing`] before modelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series, checking lengths and date ordering
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly increasing: {} is followed by {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self { dates, values })
    }

    /// Create a monthly series starting at the first day of `year`-`month`
    pub fn monthly(year: i32, month: u32, values: Vec<f64>) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("Invalid start month {}-{}", year, month))
        })?;

        let dates = (0..values.len() as u32)
            .map(|offset| {
                start
                    .checked_add_months(chrono::Months::new(offset))
                    .ok_or_else(|| {
                        ForecastError::DataError("Date range out of bounds".to_string())
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(dates, values)
    }

    /// Dates of the observations
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed values (`NaN` for missing)
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the length of the time series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the time series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether any observation is missing
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }

    /// Copy of the series without missing observations
    pub fn drop_missing(&self) -> Self {
        let (dates, values) = self
            .dates
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| !v.is_nan())
            .map(|(d, v)| (*d, *v))
            .unzip();
        Self { dates, values }
    }

    /// Get a slice of the data from start to end index
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.len());
        if start > end || end > self.len() {
            return Err(ForecastError::ValidationError(format!(
                "Slice {}..{} is out of bounds for a series of length {}",
                start,
                end,
                self.len()
            )));
        }

        Ok(Self {
            dates: self.dates[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        })
    }

    /// First date, if any
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last date, if any
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over `(date, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// Data-type category of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataKind {
    Importacion,
    Consumo,
}

impl DataKind {
    /// Both categories, imports first
    pub const ALL: [DataKind; 2] = [DataKind::Importacion, DataKind::Consumo];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            DataKind::Importacion => "Importación",
            DataKind::Consumo => "Consumo",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the three tracked fuel products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Product {
    GasolinaRegular,
    GasolinaSuperior,
    DieselAltoAzufre,
}

impl Product {
    /// All products in column order
    pub const ALL: [Product; 3] = [
        Product::GasolinaRegular,
        Product::GasolinaSuperior,
        Product::DieselAltoAzufre,
    ];

    /// Column label used in the source tables
    pub fn label(&self) -> &'static str {
        match self {
            Product::GasolinaRegular => "Gasolina regular",
            Product::GasolinaSuperior => "Gasolina superior",
            Product::DieselAltoAzufre => "Diesel alto azufre",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies a series as a (data kind, product) pair.
///
/// Displays as `"<kind> <product>"`, e.g. `"Importación Gasolina regular"`,
/// which is the key used by the comparison registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesName {
    pub kind: DataKind,
    pub product: Product,
}

impl SeriesName {
    pub fn new(kind: DataKind, product: Product) -> Self {
        Self { kind, product }
    }

    /// All six series, kind-major
    pub fn all() -> Vec<SeriesName> {
        DataKind::ALL
            .iter()
            .flat_map(|&kind| Product::ALL.iter().map(move |&product| Self::new(kind, product)))
            .collect()
    }
}

impl fmt::Display for SeriesName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.label(), self.product.label())
    }
}

impl FromStr for SeriesName {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .into_iter()
            .find(|name| name.to_string() == s.trim())
            .ok_or_else(|| ForecastError::ParseError(format!("Unknown series name: {}", s)))
    }
}
