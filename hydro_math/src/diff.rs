//! Regular and seasonal differencing

/// Apply `(1 - B)^d` to a series.
///
/// Each pass shortens the series by one value.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply `(1 - B^period)^d` to a series.
///
/// Each pass shortens the series by `period` values.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result[period..]
            .iter()
            .zip(&result)
            .map(|(current, lagged)| current - lagged)
            .collect();
    }
    result
}

/// Coefficients of the lag polynomial `(1 - B)^d (1 - B^period)^seasonal_d`.
///
/// Entry `k` is the coefficient of `B^k`; entry 0 is always 1. A differenced
/// value is `w_t = sum_k c_k y_{t-k}`, so a level can be rebuilt from `w_t`
/// and the history as `y_t = w_t - sum_{k>0} c_k y_{t-k}`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply_lag_polynomials(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = multiply_lag_polynomials(&poly, &seasonal);
        }
    }
    poly
}

/// Product of two polynomials in the lag operator, lowest power first
pub fn multiply_lag_polynomials(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difference() {
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 1), vec![3.0, 5.0, 7.0]);
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 2), vec![2.0, 2.0]);
        assert_eq!(difference(&[1.0, 2.0], 0), vec![1.0, 2.0]);
        assert!(difference(&[1.0], 1).is_empty());
    }

    #[test]
    fn test_seasonal_difference() {
        let series = [1.0, 2.0, 3.0, 11.0, 12.0, 13.0];
        assert_eq!(seasonal_difference(&series, 1, 3), vec![10.0, 10.0, 10.0]);
        assert!(seasonal_difference(&series, 1, 6).is_empty());
    }

    #[test]
    fn test_multiply_lag_polynomials() {
        // (1 - 0.5B)(1 + 2B^2) = 1 - 0.5B + 2B^2 - B^3
        assert_eq!(
            multiply_lag_polynomials(&[1.0, -0.5], &[1.0, 0.0, 2.0]),
            vec![1.0, -0.5, 2.0, -1.0]
        );
    }

    #[test]
    fn test_polynomial_matches_direct_differencing() {
        let series: Vec<f64> = (0..40).map(|i| ((i * i) % 17) as f64 + i as f64).collect();
        let direct = seasonal_difference(&difference(&series, 1), 1, 12);
        let poly = differencing_polynomial(1, 1, 12);
        assert_eq!(poly.len(), 14);

        let offset = poly.len() - 1;
        for (k, w) in direct.iter().enumerate() {
            let t = k + offset;
            let via_poly: f64 = poly.iter().enumerate().map(|(j, c)| c * series[t - j]).sum();
            assert!((via_poly - w).abs() < 1e-9);
        }
    }
}
