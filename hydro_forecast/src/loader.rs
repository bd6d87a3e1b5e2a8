//! CSV ingestion of the hydrocarbon tables
//!
//! Each table has a `Fecha` column followed by one column per product. Rows
//! with a missing date or product value are dropped and the remaining rows
//! are ordered by date.

use crate::data::{DataKind, Product, SeriesName, TimeSeries};
use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Name of the date column in the source tables
pub const DATE_COLUMN: &str = "Fecha";

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Monthly values of the three products for one data kind
#[derive(Debug, Clone, PartialEq)]
pub struct HydrocarbonTable {
    kind: DataKind,
    dates: Vec<NaiveDate>,
    columns: BTreeMap<Product, Vec<f64>>,
}

impl HydrocarbonTable {
    /// Which data kind the table holds
    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// Dates of the complete rows, ascending
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of complete rows
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no complete rows
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The series of one product
    pub fn series(&self, product: Product) -> Result<TimeSeries> {
        let values = self.columns.get(&product).ok_or_else(|| {
            ForecastError::DataError(format!("Column '{}' not loaded", product.label()))
        })?;
        TimeSeries::new(self.dates.clone(), values.clone())
    }
}

/// Data loader for the hydrocarbon CSV tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load one table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, kind: DataKind) -> Result<HydrocarbonTable> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let table = Self::from_dataframe(&df, kind)?;
        debug!(
            path = %path.display(),
            kind = kind.label(),
            rows = df.height(),
            complete = table.len(),
            "loaded table"
        );
        Ok(table)
    }

    /// Build a table from an already loaded frame
    pub fn from_dataframe(df: &DataFrame, kind: DataKind) -> Result<HydrocarbonTable> {
        let dates = Self::date_column(df)?;
        let products = Product::ALL
            .iter()
            .map(|&product| Ok((product, Self::value_column(df, product.label())?)))
            .collect::<Result<Vec<_>>>()?;

        let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::with_capacity(dates.len());
        for (i, date) in dates.iter().enumerate() {
            let Some(date) = date else { continue };
            let values: Option<Vec<f64>> = products
                .iter()
                .map(|(_, column)| column[i].filter(|v| v.is_finite()))
                .collect();
            if let Some(values) = values {
                rows.push((*date, values));
            }
        }
        rows.sort_by_key(|(date, _)| *date);

        let mut columns: BTreeMap<Product, Vec<f64>> = Product::ALL
            .iter()
            .map(|&product| (product, Vec::with_capacity(rows.len())))
            .collect();
        let mut sorted_dates = Vec::with_capacity(rows.len());
        for (date, values) in rows {
            sorted_dates.push(date);
            for (product, value) in Product::ALL.iter().zip(values) {
                if let Some(column) = columns.get_mut(product) {
                    column.push(value);
                }
            }
        }

        if let Some(pair) = sorted_dates.windows(2).find(|w| w[0] == w[1]) {
            return Err(ForecastError::DataError(format!(
                "Duplicate date {} in {} table",
                pair[0],
                kind.label()
            )));
        }

        Ok(HydrocarbonTable {
            kind,
            dates: sorted_dates,
            columns,
        })
    }

    fn date_column(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>> {
        let column = df.column(DATE_COLUMN).map_err(|_| {
            ForecastError::DataError(format!("Missing '{}' column", DATE_COLUMN))
        })?;
        let text = column.cast(&DataType::Utf8)?;
        text.utf8()?
            .into_iter()
            .map(|value| value.map(parse_date).transpose())
            .collect()
    }

    fn value_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
        let column = df
            .column(name)
            .map_err(|_| ForecastError::DataError(format!("Missing '{}' column", name)))?;
        let values = column.cast(&DataType::Float64)?;
        let values = values.f64()?.into_iter().collect();
        Ok(values)
    }
}

/// Parse a date written as `2020-01-31`, `2020-01-31 00:00:00` or `31/01/2020`
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
    {
        return Ok(date);
    }
    Ok(NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)?.date())
}

/// The import and consumption tables together
#[derive(Debug, Clone, PartialEq)]
pub struct HydrocarbonDataset {
    pub importacion: HydrocarbonTable,
    pub consumo: HydrocarbonTable,
}

impl HydrocarbonDataset {
    /// Load `importacion.csv` and `consumo.csv` from `dir`
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let importacion = DataLoader::from_csv(dir.join("importacion.csv"), DataKind::Importacion)?;
        let consumo = DataLoader::from_csv(dir.join("consumo.csv"), DataKind::Consumo)?;
        info!(
            dir = %dir.display(),
            importacion = importacion.len(),
            consumo = consumo.len(),
            "loaded hydrocarbon dataset"
        );
        Ok(Self {
            importacion,
            consumo,
        })
    }

    /// The table for one data kind
    pub fn table(&self, kind: DataKind) -> &HydrocarbonTable {
        match kind {
            DataKind::Importacion => &self.importacion,
            DataKind::Consumo => &self.consumo,
        }
    }

    /// One named series
    pub fn series(&self, name: &SeriesName) -> Result<TimeSeries> {
        self.table(name.kind).series(name.product)
    }

    /// All six series keyed by display name
    pub fn combined(&self) -> Result<BTreeMap<String, TimeSeries>> {
        SeriesName::all()
            .into_iter()
            .map(|name| Ok((name.to_string(), self.series(&name)?)))
            .collect()
    }

    /// Earliest and latest date over both tables
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.importacion.dates().iter().chain(self.consumo.dates());
        let first = dates.clone().min()?;
        let last = dates.max()?;
        Some((*first, *last))
    }
}
