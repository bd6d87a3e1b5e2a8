//! Seasonal ARIMA on the normalised raw series
//!
//! Unlike the window-based adapters this one models the series directly:
//! values are min-max scaled and multiplied by a constant factor, the
//! multiplicative SARIMA(p,d,q)(P,D,Q,s) model is estimated by conditional
//! sum of squares, and predictions are mapped back to original units.
//! A fit that fails is reported as [`ModelOutcome::Unavailable`].

use crate::config::{validate_test_size, EngineConfig, SarimaConfig};
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::metrics::TrainTestMetrics;
use crate::models::{
    FittedModel, ForecastAdapter, ModelKind, ModelOutcome, ModelResult, PredictionBundle,
};
use crate::preparation::split_index;
use hydro_math::diff::{differencing_polynomial, multiply_lag_polynomials};
use hydro_math::optimize::NelderMead;
use hydro_math::MinMaxScaler;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const INITIAL_COEFFICIENT: f64 = 0.1;

/// Min-max scaling followed by multiplication with a constant factor.
///
/// `denormalize(normalize(x))` restores `x` up to floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesNormalizer {
    scaler: MinMaxScaler,
    scale: f64,
}

impl SeriesNormalizer {
    /// Learn the scaling from `values`
    pub fn fit(values: &[f64], scale: f64) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Scale factor must be positive, got {}",
                scale
            )));
        }
        Ok(Self {
            scaler: MinMaxScaler::fit(values)?,
            scale,
        })
    }

    /// Map original units into `[0, scale]`
    pub fn normalize(&self, values: &[f64]) -> Vec<f64> {
        self.scaler
            .transform(values)
            .into_iter()
            .map(|v| v * self.scale)
            .collect()
    }

    /// Map normalised values back to original units
    pub fn denormalize(&self, values: &[f64]) -> Vec<f64> {
        let unscaled: Vec<f64> = values.iter().map(|v| v / self.scale).collect();
        self.scaler.inverse_transform(&unscaled)
    }
}

/// Estimated ARMA coefficients; terms absent from the order are zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SarimaCoefficients {
    pub ar: f64,
    pub ma: f64,
    pub seasonal_ar: f64,
    pub seasonal_ma: f64,
}

/// A fitted seasonal ARIMA model.
///
/// Keeps the normalised training history so it can produce in-sample
/// fitted values and out-of-sample forecasts in original units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaFit {
    pub order: (usize, usize, usize),
    pub seasonal_order: (usize, usize, usize, usize),
    pub coefficients: SarimaCoefficients,
    /// Residual variance on the differenced scale
    pub sigma2: f64,
    /// Minimised conditional sum of squares
    pub css: f64,
    pub iterations: usize,
    pub converged: bool,
    normalizer: SeriesNormalizer,
    history: Vec<f64>,
}

impl SarimaFit {
    /// Estimate the model on an already normalised training series
    pub fn estimate(
        config: &SarimaConfig,
        normalized: &[f64],
        normalizer: SeriesNormalizer,
    ) -> Result<Self> {
        let (p, d, q) = config.order;
        let (sp, sd, sq, period) = config.seasonal_order;
        let n_params = p + q + sp + sq;

        let diff_poly = differencing_polynomial(d, sd, period);
        let lost = diff_poly.len() - 1;
        let first_full_lag = p + sp * period;

        let needed = lost + first_full_lag + n_params + 1;
        if normalized.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: normalized.len(),
            });
        }

        let w = apply_lag_polynomial(&diff_poly, normalized);
        let shape = LagShape {
            order: config.order,
            seasonal_order: config.seasonal_order,
        };

        let objective = |params: &[f64]| {
            let coefficients = shape.unpack(params);
            let e = residuals(&w, &shape.ar_lags(&coefficients), &shape.ma_lags(&coefficients));
            e[first_full_lag..].iter().map(|r| r * r).sum::<f64>()
        };

        let (coefficients, css, iterations, converged) = if n_params == 0 {
            let coefficients = SarimaCoefficients::default();
            (coefficients, objective(&[]), 0, true)
        } else {
            let minimum = NelderMead::new(config.max_iter)
                .minimize(objective, &vec![INITIAL_COEFFICIENT; n_params])?;
            (
                shape.unpack(&minimum.point),
                minimum.value,
                minimum.iterations,
                minimum.converged,
            )
        };

        if !css.is_finite() {
            return Err(ForecastError::ModelError(
                "Conditional sum of squares is not finite for any explored coefficients"
                    .to_string(),
            ));
        }
        if !converged {
            warn!(
                iterations,
                css, "seasonal model optimiser stopped at the iteration cap"
            );
        }

        let sigma2 = css / (w.len() - first_full_lag) as f64;
        debug!(
            ar = coefficients.ar,
            ma = coefficients.ma,
            seasonal_ar = coefficients.seasonal_ar,
            seasonal_ma = coefficients.seasonal_ma,
            sigma2,
            iterations,
            "estimated seasonal model"
        );

        Ok(Self {
            order: config.order,
            seasonal_order: config.seasonal_order,
            coefficients,
            sigma2,
            css,
            iterations,
            converged,
            normalizer,
            history: normalized.to_vec(),
        })
    }

    fn shape(&self) -> LagShape {
        LagShape {
            order: self.order,
            seasonal_order: self.seasonal_order,
        }
    }

    fn diff_poly(&self) -> Vec<f64> {
        differencing_polynomial(self.order.1, self.seasonal_order.1, self.seasonal_order.3)
    }

    /// One-step-ahead in-sample predictions, in original units.
    ///
    /// Observations consumed by differencing have no model prediction; each
    /// is predicted by the observation before it (the first by itself).
    pub fn fitted_values(&self) -> Result<Vec<f64>> {
        let diff_poly = self.diff_poly();
        let lost = diff_poly.len() - 1;
        let shape = self.shape();

        let w = apply_lag_polynomial(&diff_poly, &self.history);
        let e = residuals(
            &w,
            &shape.ar_lags(&self.coefficients),
            &shape.ma_lags(&self.coefficients),
        );

        let fitted: Vec<f64> = (0..self.history.len())
            .map(|t| {
                if t >= lost {
                    self.history[t] - e[t - lost]
                } else {
                    self.history[t.saturating_sub(1)]
                }
            })
            .collect();

        self.finish(fitted)
    }

    /// Recursive forecast of the next `horizon` values, in original units
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let diff_poly = self.diff_poly();
        let shape = self.shape();
        let ar = shape.ar_lags(&self.coefficients);
        let ma = shape.ma_lags(&self.coefficients);

        let mut z = self.history.clone();
        let mut w = apply_lag_polynomial(&diff_poly, &z);
        let mut e = residuals(&w, &ar, &ma);

        for _ in 0..horizon {
            let next_w = arma_prediction(&w, &e, &ar, &ma);
            w.push(next_w);
            e.push(0.0);

            let n = z.len();
            let carried: f64 = diff_poly
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, c)| c * z[n - k])
                .sum();
            z.push(next_w - carried);
        }

        self.finish(z.split_off(self.history.len()))
    }

    fn finish(&self, normalized: Vec<f64>) -> Result<Vec<f64>> {
        if normalized.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ForecastingError(
                "Seasonal model produced non-finite predictions".to_string(),
            ));
        }
        Ok(self.normalizer.denormalize(&normalized))
    }
}

/// Expands the multiplicative ARMA polynomials into plain lag coefficients
#[derive(Debug, Clone, Copy)]
struct LagShape {
    order: (usize, usize, usize),
    seasonal_order: (usize, usize, usize, usize),
}

impl LagShape {
    /// Map the optimiser's parameter vector (AR, MA, seasonal AR, seasonal MA,
    /// skipping absent terms) onto named coefficients
    fn unpack(&self, params: &[f64]) -> SarimaCoefficients {
        let mut values = params.iter().copied();
        let mut take = |present: usize| {
            if present > 0 {
                values.next().unwrap_or(0.0)
            } else {
                0.0
            }
        };
        let ar = take(self.order.0);
        let ma = take(self.order.2);
        let seasonal_ar = take(self.seasonal_order.0);
        let seasonal_ma = take(self.seasonal_order.2);
        SarimaCoefficients {
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
        }
    }

    fn seasonal_factor(&self, coefficient: f64, sign: f64) -> Vec<f64> {
        let period = self.seasonal_order.3;
        let mut factor = vec![0.0; period + 1];
        factor[0] = 1.0;
        factor[period] = sign * coefficient;
        factor
    }

    /// `a_k` in `w_t = sum_k a_k w_{t-k} + ...`; index 0 is unused
    fn ar_lags(&self, c: &SarimaCoefficients) -> Vec<f64> {
        let mut poly = vec![1.0];
        if self.order.0 > 0 {
            poly = multiply_lag_polynomials(&poly, &[1.0, -c.ar]);
        }
        if self.seasonal_order.0 > 0 {
            poly = multiply_lag_polynomials(&poly, &self.seasonal_factor(c.seasonal_ar, -1.0));
        }
        poly[0] = 0.0;
        poly.iter().map(|v| -v).collect()
    }

    /// `b_k` in `w_t = ... + e_t + sum_k b_k e_{t-k}`; index 0 is unused
    fn ma_lags(&self, c: &SarimaCoefficients) -> Vec<f64> {
        let mut poly = vec![1.0];
        if self.order.2 > 0 {
            poly = multiply_lag_polynomials(&poly, &[1.0, c.ma]);
        }
        if self.seasonal_order.2 > 0 {
            poly = multiply_lag_polynomials(&poly, &self.seasonal_factor(c.seasonal_ma, 1.0));
        }
        poly[0] = 0.0;
        poly
    }
}

/// `sum_k poly[k] * y[t-k]` for every `t` with a full history
fn apply_lag_polynomial(poly: &[f64], y: &[f64]) -> Vec<f64> {
    let lost = poly.len() - 1;
    (lost..y.len())
        .map(|t| poly.iter().enumerate().map(|(k, c)| c * y[t - k]).sum())
        .collect()
}

/// Conditional ARMA prediction of the next value from the available history
fn arma_prediction(w: &[f64], e: &[f64], ar: &[f64], ma: &[f64]) -> f64 {
    let t = w.len();
    let ar_part: f64 = (1..ar.len().min(t + 1)).map(|k| ar[k] * w[t - k]).sum();
    let ma_part: f64 = (1..ma.len().min(t + 1)).map(|k| ma[k] * e[t - k]).sum();
    ar_part + ma_part
}

/// One-step residuals with pre-sample values and errors taken as zero
fn residuals(w: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let mut e: Vec<f64> = Vec::with_capacity(w.len());
    for t in 0..w.len() {
        let predicted = arma_prediction(&w[..t], &e, ar, ma);
        e.push(w[t] - predicted);
    }
    e
}

/// Seasonal ARIMA adapter
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaAdapter {
    config: SarimaConfig,
    test_size: f64,
}

impl SarimaAdapter {
    pub fn new(config: SarimaConfig, test_size: f64) -> Result<Self> {
        config.validate()?;
        validate_test_size(test_size)?;
        Ok(Self { config, test_size })
    }

    /// Create an adapter from engine settings
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.sarima, config.test_size)
    }

    fn fit_series(&self, series: &TimeSeries) -> Result<ModelResult> {
        let clean = series.drop_missing();
        let values = clean.values();

        let normalizer = SeriesNormalizer::fit(values, self.config.scale)?;
        let normalized = normalizer.normalize(values);

        let split = split_index(values.len(), self.test_size);
        if split == 0 || split >= values.len() {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: values.len(),
            });
        }

        let fit = SarimaFit::estimate(&self.config, &normalized[..split], normalizer)?;
        let train_pred = fit.fitted_values()?;
        let test_pred = fit.forecast(values.len() - split)?;

        let (y_train, y_test) = values.split_at(split);
        let metrics = TrainTestMetrics::evaluate(y_train, &train_pred, y_test, &test_pred)?;
        let predictions = PredictionBundle::new(
            train_pred,
            test_pred,
            y_train.to_vec(),
            y_test.to_vec(),
            clean.dates().to_vec(),
        )?;

        Ok(ModelResult {
            model: FittedModel::Sarima(fit),
            predictions,
            metrics,
        })
    }
}

impl ForecastAdapter for SarimaAdapter {
    fn kind(&self) -> ModelKind {
        ModelKind::Sarima
    }

    fn train(&self, series: &TimeSeries) -> Result<ModelOutcome> {
        match self.fit_series(series) {
            Ok(result) => Ok(ModelOutcome::Fitted(result)),
            Err(err) => {
                warn!(model = self.name(), error = %err, "seasonal model unavailable");
                Ok(ModelOutcome::Unavailable {
                    reason: err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seasonal_series(n: usize) -> TimeSeries {
        let values = (0..n)
            .map(|i| {
                let t = i as f64;
                1000.0 + 5.0 * t + 80.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
            })
            .collect();
        TimeSeries::monthly(2010, 1, values).unwrap()
    }

    #[test]
    fn test_lag_expansion() {
        let shape = LagShape {
            order: (1, 1, 1),
            seasonal_order: (1, 1, 1, 12),
        };
        let c = SarimaCoefficients {
            ar: 0.5,
            ma: 0.2,
            seasonal_ar: 0.3,
            seasonal_ma: 0.4,
        };

        let ar = shape.ar_lags(&c);
        assert_eq!(ar.len(), 14);
        assert_relative_eq!(ar[1], 0.5);
        assert_relative_eq!(ar[12], 0.3);
        assert_relative_eq!(ar[13], -0.15);

        let ma = shape.ma_lags(&c);
        assert_relative_eq!(ma[1], 0.2);
        assert_relative_eq!(ma[12], 0.4);
        assert_relative_eq!(ma[13], 0.08);
    }

    #[test]
    fn test_unpack_skips_absent_terms() {
        let shape = LagShape {
            order: (0, 1, 1),
            seasonal_order: (1, 1, 0, 12),
        };
        let c = shape.unpack(&[0.7, -0.2]);
        assert_eq!(c.ar, 0.0);
        assert_eq!(c.ma, 0.7);
        assert_eq!(c.seasonal_ar, -0.2);
        assert_eq!(c.seasonal_ma, 0.0);
    }

    #[test]
    fn test_normalizer_round_trip() {
        let values = [812.0, 640.5, 1203.25, 999.0, 640.5];
        let normalizer = SeriesNormalizer::fit(&values, 10.0).unwrap();
        let normalized = normalizer.normalize(&values);
        assert!(normalized.iter().all(|v| (0.0..=10.0).contains(v)));

        for (a, b) in values.iter().zip(normalizer.denormalize(&normalized)) {
            assert_relative_eq!(*a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_tracks_trend_plus_season() {
        let adapter = SarimaAdapter::new(SarimaConfig::default(), 0.2).unwrap();
        let outcome = adapter.train(&seasonal_series(120)).unwrap();
        let result = outcome.result().expect("seasonal model should fit");

        assert_eq!(result.predictions.y_train.len(), 96);
        assert_eq!(result.predictions.test.len(), 24);
        assert_eq!(result.predictions.dates.len(), 120);
        assert!(result.metrics.test.r2 > 0.9);
    }

    #[test]
    fn test_short_series_is_unavailable() {
        let adapter = SarimaAdapter::new(SarimaConfig::default(), 0.2).unwrap();
        let outcome = adapter.train(&seasonal_series(20)).unwrap();
        assert!(!outcome.is_fitted());
        assert!(matches!(outcome, ModelOutcome::Unavailable { .. }));
    }

    #[test]
    fn test_constant_series_fits() {
        let adapter = SarimaAdapter::new(SarimaConfig::default(), 0.2).unwrap();
        let series = TimeSeries::monthly(2000, 1, vec![50.0; 60]).unwrap();
        let outcome = adapter.train(&series).unwrap();
        let bundle = outcome.predictions().expect("constant series should fit");
        for p in bundle.test.iter().chain(&bundle.train) {
            assert_relative_eq!(*p, 50.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rejects_unsupported_orders() {
        let config = SarimaConfig {
            order: (2, 1, 1),
            ..SarimaConfig::default()
        };
        assert!(SarimaAdapter::new(config, 0.2).is_err());
    }
}
