//! Seeded train/test partitioning.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitParams {
    pub test_ratio: f64,
    pub seed: u64,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

/// Row-aligned train/test features and labels, plus the source row indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub x_train: Vec<Vec<f64>>,
    pub x_test: Vec<Vec<f64>>,
    pub y_train: Vec<u8>,
    pub y_test: Vec<u8>,
    pub train_rows: Vec<usize>,
    pub test_rows: Vec<usize>,
}

/// Shuffle row indices with `params.seed`; the first `ceil(n * test_ratio)`
/// become the test set and the rest the training set.
pub fn train_test_split(
    x: &[Vec<f64>],
    y: &[u8],
    params: SplitParams,
) -> Result<Split, ModelError> {
    if x.len() != y.len() {
        return Err(ModelError::LengthMismatch {
            features: x.len(),
            labels: y.len(),
        });
    }
    let n = x.len();
    let n_test = (n as f64 * params.test_ratio).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ModelError::EmptySplit {
            rows: n,
            ratio: params.test_ratio,
        });
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(params.seed));
    let (test_rows, train_rows) = order.split_at(n_test);

    let pick_x =
        |rows: &[usize]| -> Vec<Vec<f64>> { rows.iter().map(|&i| x[i].clone()).collect() };
    let pick_y = |rows: &[usize]| -> Vec<u8> { rows.iter().map(|&i| y[i]).collect() };
    Ok(Split {
        x_train: pick_x(train_rows),
        x_test: pick_x(test_rows),
        y_train: pick_y(train_rows),
        y_test: pick_y(test_rows),
        train_rows: train_rows.to_vec(),
        test_rows: test_rows.to_vec(),
    })
}
