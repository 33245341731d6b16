//! Gradient Boosting Trainer
//!
//! Second-order boosting with logistic loss and exact greedy splits.
//! Fully deterministic: features are scanned in column order, ties keep the
//! first split found, and no sampling is involved.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::tree::{sigmoid, GbdtModel, Node, Tree};
use crate::error::DatasetError;

/// Smallest gain that still counts as an improvement
const MIN_SPLIT_GAIN: f64 = 1e-12;

/// Boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// L2 regularization on leaf weights
    pub lambda: f64,
    /// Minimum hessian sum per child
    pub min_child_weight: f64,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 6,
            learning_rate: 0.3,
            lambda: 1.0,
            min_child_weight: 1.0,
        }
    }
}

impl GbdtConfig {
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.n_trees == 0 {
            return Err(DatasetError::InvalidConfig("n_trees must be > 0".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(DatasetError::InvalidConfig("learning_rate must be > 0".into()));
        }
        if !(self.lambda >= 0.0) || !(self.min_child_weight >= 0.0) {
            return Err(DatasetError::InvalidConfig(
                "lambda and min_child_weight must be >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Per-row gradient statistics
struct GradPair {
    grad: f64,
    hess: f64,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

pub struct GbdtTrainer {
    config: GbdtConfig,
}

impl GbdtTrainer {
    pub fn new(config: GbdtConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GbdtConfig {
        &self.config
    }

    /// Fit on a row-major design matrix and 0/1 labels
    pub fn fit(&self, features: &Array2<f64>, labels: &[f64]) -> Result<GbdtModel, DatasetError> {
        self.config.validate()?;

        let (rows, cols) = features.dim();
        if rows == 0 || cols == 0 {
            return Err(DatasetError::Empty);
        }
        if labels.len() != rows {
            return Err(DatasetError::LabelCountMismatch {
                rows,
                labels: labels.len(),
            });
        }

        let positive_rate = (labels.iter().sum::<f64>() / rows as f64).clamp(1e-6, 1.0 - 1e-6);
        let base_score = (positive_rate / (1.0 - positive_rate)).ln();

        let mut scores = vec![base_score; rows];
        let mut trees = Vec::with_capacity(self.config.n_trees);
        let all_rows: Vec<usize> = (0..rows).collect();

        for round in 0..self.config.n_trees {
            let pairs: Vec<GradPair> = scores
                .iter()
                .zip(labels)
                .map(|(score, label)| {
                    let p = sigmoid(*score);
                    GradPair {
                        grad: p - label,
                        hess: (p * (1.0 - p)).max(1e-16),
                    }
                })
                .collect();

            let mut nodes = Vec::new();
            self.build_node(features, &pairs, all_rows.clone(), 0, &mut nodes);
            let tree = Tree::new(nodes);

            for (i, score) in scores.iter_mut().enumerate() {
                *score += tree.predict_with(|f| features[[i, f]]);
            }

            log::debug!("Round {}: {} leaves", round + 1, tree.leaf_count());
            trees.push(tree);
        }

        Ok(GbdtModel::new(base_score, cols, trees))
    }

    /// Grow the subtree for `rows`, appending nodes in pre-order.
    /// Returns the index of the subtree root.
    fn build_node(
        &self,
        features: &Array2<f64>,
        pairs: &[GradPair],
        rows: Vec<usize>,
        depth: usize,
        nodes: &mut Vec<Node>,
    ) -> usize {
        let (g, h) = rows
            .iter()
            .fold((0.0, 0.0), |(g, h), &r| (g + pairs[r].grad, h + pairs[r].hess));

        let index = nodes.len();
        nodes.push(Node::Leaf {
            value: self.leaf_weight(g, h),
        });

        if depth >= self.config.max_depth || rows.len() < 2 {
            return index;
        }

        let Some(best) = self.find_split(features, pairs, &rows, g, h) else {
            return index;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| features[[r, best.feature]] < best.threshold);

        let left = self.build_node(features, pairs, left_rows, depth + 1, nodes);
        let right = self.build_node(features, pairs, right_rows, depth + 1, nodes);

        nodes[index] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };

        index
    }

    fn find_split(
        &self,
        features: &Array2<f64>,
        pairs: &[GradPair],
        rows: &[usize],
        g: f64,
        h: f64,
    ) -> Option<BestSplit> {
        let lambda = self.config.lambda;
        let parent = g * g / (h + lambda);
        let mut best: Option<BestSplit> = None;
        let mut sorted = rows.to_vec();

        for feature in 0..features.ncols() {
            sorted.sort_by(|&a, &b| features[[a, feature]].total_cmp(&features[[b, feature]]));

            let (mut gl, mut hl) = (0.0, 0.0);
            for k in 0..sorted.len() - 1 {
                let r = sorted[k];
                gl += pairs[r].grad;
                hl += pairs[r].hess;

                let here = features[[r, feature]];
                let next = features[[sorted[k + 1], feature]];
                if here == next {
                    continue;
                }

                let (gr, hr) = (g - gl, h - hl);
                if hl < self.config.min_child_weight || hr < self.config.min_child_weight {
                    continue;
                }

                let gain = 0.5 * (gl * gl / (hl + lambda) + gr * gr / (hr + lambda) - parent);
                if gain > MIN_SPLIT_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: split_point(here, next),
                        gain,
                    });
                }
            }
        }

        best
    }

    fn leaf_weight(&self, g: f64, h: f64) -> f64 {
        -g / (h + self.config.lambda) * self.config.learning_rate
    }
}

/// Threshold between two adjacent sorted values. `here` must route left,
/// so a midpoint that rounds down onto `here` is replaced by `next`.
fn split_point(here: f64, next: f64) -> f64 {
    let mid = here + (next - here) / 2.0;
    if mid <= here {
        next
    } else {
        mid
    }
}

impl Default for GbdtTrainer {
    fn default() -> Self {
        Self::new(GbdtConfig::default())
    }
}
