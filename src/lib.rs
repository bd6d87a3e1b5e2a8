//! # Hydrocarbon Dashboard
//!
//! Umbrella crate for the hydrocarbon forecasting workspace. It re-exports
//! the numerical kernels and the forecasting engine so a single dependency
//! gives access to both.
//!
//! ## Example
//!
//! ```
//! use hydrocarbon_dashboard::forecast::{EngineConfig, ModelComparison, ModelKind, TimeSeries};
//!
//! let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
//! let series = TimeSeries::monthly(2015, 1, values).unwrap();
//!
//! let config = EngineConfig::default().with_lookback(6);
//! let mut engine = ModelComparison::new(config).unwrap();
//! let table = engine.compare(&series, "Importación Gasolina regular").unwrap();
//!
//! assert!(table.row(ModelKind::LinearRegression).is_some());
//! assert!(engine.is_trained("Importación Gasolina regular"));
//! ```

pub use hydro_forecast as forecast;
pub use hydro_math as math;

pub use hydro_forecast::{
    ComparisonTable, EngineConfig, ForecastError, HydrocarbonDataset, ModelComparison, ModelKind,
    SeriesName, TimeSeries,
};

/// Version of the umbrella crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
