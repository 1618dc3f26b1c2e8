//! Random-forest inference over exported decision trees
//!
//! Trees use the flat array layout of a fitted CART tree: node `i` is a leaf
//! when `children_left[i] == -1`, otherwise samples with
//! `x[feature[i]] <= threshold[i]` descend to `children_left[i]`.

use pillsquad_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const LEAF: i64 = -1;

/// One exported decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights
    pub value: Vec<Vec<f32>>,
}

impl DecisionTree {
    fn validate(&self, n_classes: usize) -> Result<()> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(Error::data_load("decision tree has no nodes"));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(Error::data_load("decision tree arrays differ in length"));
        }
        if self.value.iter().any(|v| v.len() != n_classes) {
            return Err(Error::data_load(format!(
                "decision tree leaf values must have {} classes",
                n_classes
            )));
        }
        let in_range = |child: i64| child == LEAF || (child > 0 && (child as usize) < n);
        if !self.children_left.iter().chain(&self.children_right).all(|&c| in_range(c)) {
            return Err(Error::data_load("decision tree child index out of range"));
        }
        let half_leaf = self
            .children_left
            .iter()
            .zip(&self.children_right)
            .position(|(&l, &r)| (l == LEAF) != (r == LEAF));
        if let Some(node) = half_leaf {
            return Err(Error::data_load(format!(
                "decision tree node {node} has exactly one leaf marker"
            )));
        }
        Ok(())
    }

    /// Leaf class distribution for one sample
    fn leaf_distribution(&self, features: &[f32]) -> Result<Vec<f32>> {
        let mut node = 0usize;
        // A valid tree reaches a leaf in at most `len` steps.
        for _ in 0..self.children_left.len() {
            let left = self.children_left[node];
            if left == LEAF {
                let counts = &self.value[node];
                let total: f32 = counts.iter().sum();
                return Ok(if total > 0.0 {
                    counts.iter().map(|c| c / total).collect()
                } else {
                    counts.clone()
                });
            }

            let feature = self.feature[node];
            let x = usize::try_from(feature)
                .ok()
                .and_then(|f| features.get(f))
                .ok_or_else(|| {
                    Error::classifier(format!(
                        "tree references feature {} but the row has {} columns",
                        feature,
                        features.len()
                    ))
                })?;

            let next = if f64::from(*x) <= self.threshold[node] {
                left
            } else {
                self.children_right[node]
            };
            node = usize::try_from(next)
                .ok()
                .filter(|&i| i < self.children_left.len())
                .ok_or_else(|| Error::classifier(format!("invalid child index {next}")))?;
        }

        Err(Error::classifier("decision tree contains a cycle"))
    }
}

/// Ensemble of decision trees with soft voting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Load an exported forest from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::data_load(format!("failed to read forest {}: {}", path.display(), e))
        })?;
        let forest: RandomForest = serde_json::from_str(&content).map_err(|e| {
            Error::data_load(format!("failed to parse forest {}: {}", path.display(), e))
        })?;
        forest.validate()?;
        Ok(forest)
    }

    /// Check structural consistency of every tree
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::data_load("random forest has no trees"));
        }
        if self.n_classes < 2 {
            return Err(Error::data_load("random forest needs at least two classes"));
        }
        self.trees.iter().try_for_each(|t| t.validate(self.n_classes))
    }

    /// Mean of the per-tree leaf distributions
    pub fn predict_proba(&self, features: &[f32]) -> Result<Vec<f32>> {
        let mut proba = vec![0.0f32; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_distribution(features)?) {
                *acc += p;
            }
        }

        let n = self.trees.len() as f32;
        proba.iter_mut().for_each(|p| *p /= n);
        Ok(proba)
    }
}
