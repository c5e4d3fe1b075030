//! Bagged ensemble of decision trees

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};
use super::{FitError, ModelError};

/// Forest hyperparameters.
///
/// Defaults: 100 fully grown trees, bootstrap sampling, `sqrt(n_features)`
/// candidate features per split, seed 42.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// `None` means `floor(sqrt(n_features))`
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub params: ForestParams,
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on `features` / `target` (labels in `0..n_classes`).
    pub fn fit<R: AsRef<[f64]>>(
        features: &[R],
        target: &[usize],
        n_classes: usize,
        params: &ForestParams,
    ) -> Result<Self, FitError> {
        if features.is_empty() {
            return Err(FitError::EmptyDataset);
        }
        if features.len() != target.len() {
            return Err(FitError::LengthMismatch {
                features: features.len(),
                target: target.len(),
            });
        }
        if params.n_trees == 0 {
            return Err(FitError::InvalidParams("n_trees must be at least 1".to_string()));
        }
        if n_classes < 2 {
            return Err(FitError::InvalidParams(format!("need at least 2 classes, got {n_classes}")));
        }

        let n_features = features[0].as_ref().len();
        if n_features == 0 {
            return Err(FitError::InvalidParams("rows have no features".to_string()));
        }
        for (idx, row) in features.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_features {
                return Err(FitError::RaggedRow { row: idx, expected: n_features, actual: row.len() });
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(FitError::NonFinite { row: idx });
            }
        }
        if let Some(&label) = target.iter().find(|&&y| y >= n_classes) {
            return Err(FitError::UnknownLabel { label, n_classes });
        }

        let max_features = params
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize)
            .clamp(1, n_features);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            min_samples_leaf: params.min_samples_leaf.max(1),
            max_features,
        };

        tracing::debug!(
            n_trees = params.n_trees,
            max_features,
            rows = features.len(),
            "Fitting random forest"
        );

        let n = features.len();
        let mut seeder = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let mut rng = StdRng::seed_from_u64(seeder.gen());
            let sample: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            trees.push(DecisionTree::fit(features, target, sample, n_classes, &tree_params, &mut rng)?);
        }

        Ok(Self {
            params: params.clone(),
            n_features,
            n_classes,
            trees,
        })
    }

    /// Mean of the per-tree leaf distributions
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput);
        }
        if self.trees.is_empty() {
            return Err(ModelError::Corrupt("forest has no trees".to_string()));
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let dist = tree.leaf_distribution(row)?;
            if dist.len() != self.n_classes {
                return Err(ModelError::Corrupt(format!(
                    "leaf distribution has {} classes, expected {}",
                    dist.len(),
                    self.n_classes
                )));
            }
            for (p, d) in proba.iter_mut().zip(dist) {
                *p += d;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    /// Most probable class; the lowest index wins ties
    pub fn predict(&self, row: &[f64]) -> Result<usize, ModelError> {
        Ok(argmax(&self.predict_proba(row)?))
    }

    /// Predict every row, stopping at the first failure
    pub fn predict_many<R: AsRef<[f64]>>(&self, rows: &[R]) -> Result<Vec<usize>, ModelError> {
        rows.iter().map(|row| self.predict(row.as_ref())).collect()
    }

    /// Validate structural invariants after deserialization
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if self.n_classes < 2 {
            return Err(format!("forest has {} classes", self.n_classes));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            if tree.n_features != self.n_features || tree.n_classes != self.n_classes {
                return Err(format!("tree {idx} shape does not match forest"));
            }
            tree.validate().map_err(|e| format!("tree {idx}: {e}"))?;
        }
        Ok(())
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f64::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}
