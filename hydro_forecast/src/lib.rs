//! # Hydro Forecast
//!
//! Forecasting and model comparison for monthly hydrocarbon import and
//! consumption series.
//!
//! ## Features
//!
//! - Lag-window preparation with a chronological train/test split
//! - Three model families behind one adapter interface: linear regression,
//!   random forest and seasonal ARIMA
//! - MAE, MSE and R² on both partitions
//! - A comparison engine that keeps every trained model per series
//! - CSV ingestion and descriptive summaries of the source tables
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hydro_forecast::{EngineConfig, HydrocarbonDataset, ModelComparison, ModelKind};
//!
//! # fn main() -> hydro_forecast::Result<()> {
//! let dataset = HydrocarbonDataset::load("data")?;
//! let mut engine = ModelComparison::new(EngineConfig::default())?;
//!
//! let tables = engine.compare_dataset(&dataset)?;
//! for table in tables.values() {
//!     println!("{}", table);
//! }
//!
//! let bundle = engine.get_predictions("Consumo Gasolina regular", ModelKind::Sarima);
//! # Ok(())
//! # }
//! ```

pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod preparation;
pub mod summary;

// Re-export commonly used types
pub use crate::comparison::{ComparisonTable, MetricCriterion, MetricRecord, ModelComparison};
pub use crate::config::{EngineConfig, ForestConfig, SarimaConfig};
pub use crate::data::{DataKind, Product, SeriesName, TimeSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::loader::{DataLoader, HydrocarbonDataset, HydrocarbonTable};
pub use crate::metrics::{RegressionMetrics, TrainTestMetrics};
pub use crate::models::{ForecastAdapter, ModelKind, ModelOutcome, ModelResult, PredictionBundle};
pub use crate::preparation::{prepare, PreparedData};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
