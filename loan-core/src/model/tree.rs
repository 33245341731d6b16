//! Gradient-Boosted Tree Ensemble - Inference
//!
//! Flat node arrays, root at index 0, children always after their parent.
//! `x[feature] < threshold` goes left, everything else goes right.
//!
//! The raw score is `base_score + Σ leaf`, the class-1 probability is its
//! sigmoid.

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;

/// Logistic link
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Single regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Stump with a constant output
    pub fn leaf(value: f64) -> Self {
        Self::new(vec![Node::Leaf { value }])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Output for a feature vector
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.predict_with(|f| features.get(f).copied().unwrap_or(0.0))
    }

    /// Output with features read through `feature_at` (used by the trainer
    /// to score matrix rows in place)
    pub(crate) fn predict_with<F: Fn(usize) -> f64>(&self, feature_at: F) -> f64 {
        let mut index = 0;

        while let Some(node) = self.nodes.get(index) {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    index = if feature_at(*feature) < *threshold { *left } else { *right };
                }
            }
        }

        0.0
    }

    /// Structural checks for trees read from disk
    fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(format!("node {}: non-finite leaf", i));
                }
                Node::Split { feature, threshold, left, right } => {
                    if *feature >= feature_count {
                        return Err(format!("node {}: feature {} out of range", i, feature));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {}: non-finite threshold", i));
                    }
                    // Children after parent: traversal always terminates
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {}: bad child index {}", i, child));
                        }
                    }
                }
                Node::Leaf { .. } => {}
            }
        }

        Ok(())
    }
}

/// Boosted ensemble for binary classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtModel {
    /// Initial log-odds
    pub base_score: f64,
    /// Input width the trees were fit on
    pub feature_count: usize,
    pub trees: Vec<Tree>,
}

impl GbdtModel {
    pub fn new(base_score: f64, feature_count: usize, trees: Vec<Tree>) -> Self {
        Self {
            base_score,
            feature_count,
            trees,
        }
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Log-odds for class 1
    pub fn raw_score(&self, features: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(features)).sum::<f64>()
    }

    /// Probability of class 1
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.raw_score(features))
    }

    /// Structural checks for models read from disk
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if !self.base_score.is_finite() {
            return Err(ArtifactError::MalformedModel("non-finite base score".to_string()));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count)
                .map_err(|e| ArtifactError::MalformedModel(format!("tree {}: {}", i, e)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
        Tree::new(vec![
            Node::Split { feature, threshold, left: 1, right: 2 },
            Node::Leaf { value: left },
            Node::Leaf { value: right },
        ])
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn test_tree_routing() {
        let tree = stump(0, 50.0, -1.0, 1.0);
        assert_eq!(tree.predict(&[30.0]), -1.0);
        assert_eq!(tree.predict(&[50.0]), 1.0); // equal goes right
        assert_eq!(tree.predict(&[70.0]), 1.0);
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_two_tree_model_score() {
        let model = GbdtModel::new(0.25, 2, vec![stump(0, 50.0, 1.0, 2.0), stump(1, 30.0, -0.5, 0.5)]);

        // Tree1 left (1.0), Tree2 left (-0.5)
        assert!((model.raw_score(&[30.0, 20.0]) - 0.75).abs() < 1e-12);
        // Tree1 right (2.0), Tree2 right (0.5)
        assert!((model.raw_score(&[60.0, 40.0]) - 2.75).abs() < 1e-12);
        assert!((model.predict_proba(&[30.0, 20.0]) - sigmoid(0.75)).abs() < 1e-12);
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let model = GbdtModel::new(0.0, 1, vec![stump(0, 1.0, 0.1, 0.2), Tree::leaf(0.3)]);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_feature_out_of_range() {
        let model = GbdtModel::new(0.0, 1, vec![stump(3, 1.0, 0.1, 0.2)]);
        assert!(matches!(model.validate(), Err(ArtifactError::MalformedModel(_))));
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let tree = Tree::new(vec![
            Node::Split { feature: 0, threshold: 1.0, left: 0, right: 1 },
            Node::Leaf { value: 0.0 },
        ]);
        let model = GbdtModel::new(0.0, 1, vec![tree]);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let tree = stump(0, 1.5, -0.25, 0.25);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["nodes"][0]["split"]["threshold"], 1.5);
        assert_eq!(json["nodes"][1]["leaf"]["value"], -0.25);
    }
}
