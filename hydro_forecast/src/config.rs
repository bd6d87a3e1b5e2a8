//! Engine configuration
//!
//! All settings are supplied by the caller at construction time. The engine
//! never reads configuration from files or the environment; callers that keep
//! settings on disk can hand the text to [`EngineConfig::from_json`].

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Settings shared by every adapter in a comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of the series held out, at the end, as the test partition
    pub test_size: f64,
    /// Number of past periods used as features by the window-based models
    pub lookback: usize,
    /// Seed for every randomised estimator
    pub random_seed: u64,
    /// Random forest settings
    pub forest: ForestConfig,
    /// Seasonal model settings
    pub sarima: SarimaConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            lookback: 12,
            random_seed: 42,
            forest: ForestConfig::default(),
            sarima: SarimaConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set the feature window length
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    /// Set the random seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Replace the forest settings
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// Replace the seasonal model settings
    pub fn with_sarima(mut self, sarima: SarimaConfig) -> Self {
        self.sarima = sarima;
        self
    }

    /// Check every setting is usable
    pub fn validate(&self) -> Result<()> {
        validate_test_size(self.test_size)?;
        if self.lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lookback must be at least 1".to_string(),
            ));
        }
        self.forest.validate()?;
        self.sarima.validate()
    }
}

/// Reject test fractions outside the open interval (0, 1)
pub(crate) fn validate_test_size(test_size: f64) -> Result<()> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Test size must be between 0 and 1 (exclusive), got {}",
            test_size
        )));
    }
    Ok(())
}

/// Random forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
        }
    }
}

impl ForestConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forest needs at least one tree".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "Tree depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Seasonal ARIMA settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarimaConfig {
    /// Non-seasonal order (p, d, q)
    pub order: (usize, usize, usize),
    /// Seasonal order (P, D, Q, s)
    pub seasonal_order: (usize, usize, usize, usize),
    /// Iteration cap for the optimiser
    pub max_iter: usize,
    /// Factor applied after min-max scaling
    pub scale: f64,
}

impl Default for SarimaConfig {
    fn default() -> Self {
        Self {
            order: (1, 1, 1),
            seasonal_order: (1, 1, 1, 12),
            max_iter: 200,
            scale: 10.0,
        }
    }
}

impl SarimaConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        let (p, d, q) = self.order;
        let (sp, sd, sq, period) = self.seasonal_order;
        if p > 1 || q > 1 || sp > 1 || sq > 1 {
            return Err(ForecastError::InvalidParameter(format!(
                "Only AR/MA orders up to 1 are supported, got ({},{},{})({},{},{},{})",
                p, d, q, sp, sd, sq, period
            )));
        }
        if d > 1 || sd > 1 {
            return Err(ForecastError::InvalidParameter(
                "Differencing orders must be 0 or 1".to_string(),
            ));
        }
        if period < 2 && (sp > 0 || sd > 0 || sq > 0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Seasonal period must be at least 2, got {}",
                period
            )));
        }
        if self.max_iter == 0 {
            return Err(ForecastError::InvalidParameter(
                "Iteration cap must be at least 1".to_string(),
            ));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Scale factor must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}
