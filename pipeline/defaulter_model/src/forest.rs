//! Random forest classifier: bootstrap-aggregated CART trees with per-split
//! feature subsampling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::tree::{DecisionTree, TreeParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features tried per split; `None` means `floor(sqrt(n_features))`
    pub max_features: Option<usize>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    classes: Vec<u8>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(x: &[Vec<f64>], y: &[u8], params: ForestParams) -> Result<Self, ModelError> {
        if x.len() != y.len() {
            return Err(ModelError::LengthMismatch {
                features: x.len(),
                labels: y.len(),
            });
        }
        let Some(first) = x.first() else {
            return Err(ModelError::EmptyTrainingSet);
        };
        let n_features = first.len();
        if let Some(bad) = x.iter().find(|r| r.len() != n_features) {
            return Err(ModelError::FeatureCount {
                expected: n_features,
                got: bad.len(),
            });
        }

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let y_idx: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            max_features: params
                .max_features
                .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
                .clamp(1, n_features.max(1)),
        };

        let n = x.len();
        let mut seeds = StdRng::seed_from_u64(params.seed);
        let trees = (0..params.n_estimators)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(seeds.gen());
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, &y_idx, &sample, classes.len(), tree_params, &mut rng)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Fitted {} trees on {} rows x {} features, classes {:?}, max depth {}, {} nodes",
            trees.len(),
            n,
            n_features,
            classes,
            trees.iter().map(DecisionTree::depth).max().unwrap_or(0),
            trees.iter().map(DecisionTree::node_count).sum::<usize>()
        );
        Ok(Self {
            params,
            classes,
            n_features,
            trees,
        })
    }

    pub fn classes(&self) -> &[u8] {
        &self.classes
    }

    /// Width of the rows the forest was fitted on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean of the trees' leaf distributions, indexed like [`Self::classes`].
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                got: row.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        let mut acc = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (a, p) in acc.iter_mut().zip(tree.predict_proba(row)) {
                *a += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(acc.into_iter().map(|a| a / n).collect())
    }

    /// Most probable class; the lower label wins ties.
    pub fn predict(&self, row: &[f64]) -> Result<u8, ModelError> {
        let proba = self.predict_proba(row)?;
        let mut best = 0;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }
        Ok(self.classes[best])
    }

    pub fn predict_batch(&self, x: &[Vec<f64>]) -> Result<Vec<u8>, ModelError> {
        x.iter().map(|r| self.predict(r)).collect()
    }
}
