//! Derivative-free minimisation with the Nelder–Mead simplex method

use crate::{MathError, Result};

/// Outcome of a simplex minimisation
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether both the objective spread and the simplex size fell below
    /// the tolerance before `max_iter`
    pub converged: bool,
}

/// Nelder–Mead simplex minimiser with standard coefficients
/// (reflection 1, expansion 2, contraction 0.5, shrink 0.5).
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMead {
    max_iter: usize,
    tolerance: f64,
    initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.05,
        }
    }
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

impl NelderMead {
    /// Create a minimiser with the given iteration cap
    pub fn new(max_iter: usize) -> Self {
        Self {
            max_iter,
            ..Self::default()
        }
    }

    /// Set the convergence tolerance on objective spread and simplex size
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Minimise `objective` starting from `initial`.
    ///
    /// Non-finite objective values are treated as `+inf`, so the simplex
    /// walks away from regions where the objective blows up.
    pub fn minimize<F>(&self, objective: F, initial: &[f64]) -> Result<Minimum>
    where
        F: Fn(&[f64]) -> f64,
    {
        let n = initial.len();
        if n == 0 {
            return Err(MathError::InvalidInput(
                "Cannot minimise over zero parameters".to_string(),
            ));
        }

        let eval = |p: &[f64]| {
            let v = objective(p);
            if v.is_finite() {
                v
            } else {
                f64::INFINITY
            }
        };

        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(initial.to_vec());
        for i in 0..n {
            let mut vertex = initial.to_vec();
            vertex[i] += if initial[i].abs() > 1e-10 {
                self.initial_step * initial[i].abs()
            } else {
                self.initial_step
            };
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            iterations += 1;

            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            let best = order[0];
            let worst = order[n];
            let second_worst = order[n - 1];

            let centroid = centroid_without(&simplex, worst);
            let spread = values[worst] - values[best];
            let size = simplex
                .iter()
                .map(|v| distance(v, &centroid))
                .fold(0.0, f64::max);
            if spread.is_finite() && spread < self.tolerance && size < self.tolerance {
                converged = true;
                break;
            }

            let reflected = along(&centroid, &simplex[worst], -REFLECTION);
            let reflected_value = eval(&reflected);

            if reflected_value < values[best] {
                let expanded = along(&centroid, &reflected, EXPANSION);
                let expanded_value = eval(&expanded);
                if expanded_value < reflected_value {
                    simplex[worst] = expanded;
                    values[worst] = expanded_value;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = reflected_value;
                }
                continue;
            }

            if reflected_value < values[second_worst] {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
                continue;
            }

            let (candidate, threshold) = if reflected_value < values[worst] {
                (along(&centroid, &reflected, CONTRACTION), reflected_value)
            } else {
                (along(&centroid, &simplex[worst], CONTRACTION), values[worst])
            };
            let candidate_value = eval(&candidate);
            if candidate_value < threshold {
                simplex[worst] = candidate;
                values[worst] = candidate_value;
                continue;
            }

            let anchor = simplex[best].clone();
            for i in 0..=n {
                if i != best {
                    simplex[i] = along(&anchor, &simplex[i], SHRINK);
                    values[i] = eval(&simplex[i]);
                }
            }
        }

        let best = (0..=n)
            .min_by(|&a, &b| values[a].total_cmp(&values[b]))
            .unwrap_or(0);

        Ok(Minimum {
            point: simplex[best].clone(),
            value: values[best],
            iterations,
            converged,
        })
    }
}

/// `origin + t * (point - origin)`
fn along(origin: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(point)
        .map(|(o, p)| o + t * (p - o))
        .collect()
}

fn centroid_without(simplex: &[Vec<f64>], excluded: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let mut centroid = vec![0.0; n];
    for (_, vertex) in simplex.iter().enumerate().filter(|(i, _)| *i != excluded) {
        for (c, v) in centroid.iter_mut().zip(vertex) {
            *c += v;
        }
    }
    let count = (simplex.len() - 1) as f64;
    centroid.iter_mut().for_each(|c| *c /= count);
    centroid
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
