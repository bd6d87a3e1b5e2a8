//! Regression trees and bootstrap-aggregated forests
//!
//! Trees are grown with the CART procedure: every split is the axis-aligned
//! threshold that minimises the summed squared error of the two children.

use crate::{check_design, check_rows, MathError, Regressor, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A node of a fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Terminal node predicting the mean target of its samples
    Leaf { value: f64, n_samples: usize },
    /// Internal node sending `x[feature] <= threshold` to the left
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Depth of the subtree rooted here (a leaf has depth 0)
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// CART regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    n_features: usize,
    root: Option<TreeNode>,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    /// Create an unbounded tree (min 2 samples per split, 1 per leaf)
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            n_features: 0,
            root: None,
        }
    }

    /// Limit the depth of the tree
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Root of the fitted tree, if any
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Depth of the fitted tree
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::depth)
    }

    fn build(&self, x: &[Vec<f64>], y: &[f64], indices: Vec<usize>, depth: usize) -> TreeNode {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let mean = sum / n as f64;
        let sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();
        // Pure up to rounding, relative to the magnitude of the targets
        let pure = sse <= f64::EPSILON * indices.iter().map(|&i| y[i] * y[i]).sum::<f64>();

        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        if n < self.min_samples_split || depth_reached || pure {
            return TreeNode::Leaf {
                value: mean,
                n_samples: n,
            };
        }

        let Some((feature, threshold)) = self.best_split(x, y, &indices, sse) else {
            return TreeNode::Leaf {
                value: mean,
                n_samples: n,
            };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[i][feature] <= threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build(x, y, left, depth + 1)),
            right: Box::new(self.build(x, y, right, depth + 1)),
        }
    }

    /// Find the split with the lowest child SSE that beats the parent SSE
    fn best_split(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        parent_sse: f64,
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted = indices.to_vec();

        for feature in 0..self.n_features {
            sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let total_sum: f64 = sorted.iter().map(|&i| y[i]).sum();
            let total_sq: f64 = sorted.iter().map(|&i| y[i] * y[i]).sum();
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for k in 0..n - 1 {
                let yi = y[sorted[k]];
                left_sum += yi;
                left_sq += yi * yi;

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let current = x[sorted[k]][feature];
                let next = x[sorted[k + 1]][feature];
                if next <= current {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);

                if best.map_or(true, |(_, _, b)| sse < b) {
                    best = Some((feature, (current + next) / 2.0, sse));
                }
            }
        }

        best.filter(|&(_, _, sse)| sse < parent_sse)
            .map(|(feature, threshold, _)| (feature, threshold))
    }
}

impl Regressor for DecisionTreeRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.n_features = check_design(x, y)?;
        if y.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Targets must be finite".to_string(),
            ));
        }
        let root = self.build(x, y, (0..x.len()).collect(), 0);
        self.root = Some(root);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let root = self.root.as_ref().ok_or_else(|| {
            MathError::CalculationError("Decision tree has not been fitted".to_string())
        })?;
        check_rows(x, self.n_features)?;
        Ok(x.iter().map(|row| root.predict_row(row)).collect())
    }
}

/// Random forest regressor: trees fitted on bootstrap resamples, averaged.
///
/// Every split considers all features. With a `random_state`, tree `i`
/// draws its bootstrap sample from a generator seeded with
/// `random_state + i`, so fits are reproducible bit for bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    max_depth: Option<usize>,
    random_state: Option<u64>,
    trees: Vec<DecisionTreeRegressor>,
}

impl RandomForestRegressor {
    /// Create a forest with `n_estimators` trees
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            random_state: None,
            trees: Vec::new(),
        }
    }

    /// Limit the depth of every tree
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Seed the bootstrap sampling
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Number of trees requested
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Fitted trees
    pub fn trees(&self) -> &[DecisionTreeRegressor] {
        &self.trees
    }
}

fn bootstrap_sample(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    let mut rng = match random_state {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        check_design(x, y)?;
        if self.n_estimators == 0 {
            return Err(MathError::InvalidInput(
                "A forest needs at least one tree".to_string(),
            ));
        }

        let n_samples = x.len();
        let mut trees = Vec::with_capacity(self.n_estimators);

        for i in 0..self.n_estimators {
            let seed = self.random_state.map(|s| s.wrapping_add(i as u64));
            let sample = bootstrap_sample(n_samples, seed);

            let sample_x: Vec<Vec<f64>> = sample.iter().map(|&idx| x[idx].clone()).collect();
            let sample_y: Vec<f64> = sample.iter().map(|&idx| y[idx]).collect();

            let mut tree = DecisionTreeRegressor::new();
            if let Some(depth) = self.max_depth {
                tree = tree.with_max_depth(depth);
            }
            tree.fit(&sample_x, &sample_y)?;
            trees.push(tree);
        }

        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(MathError::CalculationError(
                "Random forest has not been fitted".to_string(),
            ));
        }

        let mut totals = vec![0.0; x.len()];
        for tree in &self.trees {
            for (total, p) in totals.iter_mut().zip(tree.predict(x)?) {
                *total += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        Ok(totals.into_iter().map(|t| t / n_trees).collect())
    }
}
