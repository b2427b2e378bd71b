//! CART decision tree (Gini impurity) used as the forest's base learner.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features considered per split
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted tree stored as a flat node arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    n_classes: usize,
    params: TreeParams,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    /// Grow a tree over the rows listed in `sample` (repeats allowed).
    ///
    /// `y` holds class indices in `0..n_classes`.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        sample: &[usize],
        n_classes: usize,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut b = Builder {
            x,
            y,
            n_classes,
            params,
            rng,
            nodes: Vec::new(),
        };
        b.grow(sample.to_vec(), 0);
        Self { nodes: b.nodes }
    }

    /// Class distribution of the leaf `row` lands in. NaN features route right.
    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], i: usize) -> usize {
            match &nodes[i] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

impl Builder<'_> {
    fn grow(&mut self, sample: Vec<usize>, depth: usize) -> usize {
        let counts = self.counts(&sample);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);

        let split = if pure || depth_reached || sample.len() < self.params.min_samples_split {
            None
        } else {
            self.best_split(&sample)
        };

        let Some(Candidate {
            feature, threshold, ..
        }) = split
        else {
            return self.leaf(&counts, sample.len());
        };

        let (left, right): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|&i| self.x[i][feature] <= threshold);

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });
        let left = self.grow(left, depth + 1);
        let right = self.grow(right, depth + 1);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    fn leaf(&mut self, counts: &[usize], n: usize) -> usize {
        let distribution = counts.iter().map(|&c| c as f64 / n as f64).collect();
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn counts(&self, sample: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in sample {
            counts[self.y[i]] += 1;
        }
        counts
    }

    /// Visit features in random order until `max_features` non-constant ones
    /// have been scored; keep the lowest weighted Gini.
    fn best_split(&mut self, sample: &[usize]) -> Option<Candidate> {
        let n_features = self.x.first().map_or(0, Vec::len);
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<Candidate> = None;
        let mut scored = 0;
        for f in features {
            if scored >= self.params.max_features {
                break;
            }
            if let Some(c) = self.best_threshold(sample, f) {
                scored += 1;
                if best.as_ref().map_or(true, |b| c.impurity < b.impurity) {
                    best = Some(c);
                }
            }
        }
        best
    }

    fn best_threshold(&self, sample: &[usize], feature: usize) -> Option<Candidate> {
        let mut values: Vec<(f64, usize)> = Vec::with_capacity(sample.len());
        let mut nan_counts = vec![0usize; self.n_classes];
        for &i in sample {
            let v = self.x[i][feature];
            if v.is_nan() {
                nan_counts[self.y[i]] += 1;
            } else {
                values.push((v, self.y[i]));
            }
        }
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = sample.len() as f64;
        let mut total = nan_counts;
        for &(_, c) in &values {
            total[c] += 1;
        }
        let mut left = vec![0usize; self.n_classes];
        let mut best: Option<Candidate> = None;

        for k in 0..values.len().saturating_sub(1) {
            left[values[k].1] += 1;
            let (lo, hi) = (values[k].0, values[k + 1].0);
            if lo == hi {
                continue;
            }
            let right: Vec<usize> = total.iter().zip(&left).map(|(t, l)| t - l).collect();
            let nl = (k + 1) as f64;
            let nr = n - nl;
            let impurity = (nl * gini(&left, nl) + nr * gini(&right, nr)) / n;
            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mid = lo + (hi - lo) / 2.0;
                best = Some(Candidate {
                    feature,
                    threshold: if mid < hi { mid } else { lo },
                    impurity,
                });
            }
        }
        best
    }
}

fn gini(counts: &[usize], n: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            max_features: 2,
        }
    }

    #[test]
    fn separates_on_threshold() {
        let x = vec![vec![1.0, 0.0], vec![2.0, 0.0], vec![10.0, 0.0], vec![11.0, 0.0]];
        let y = vec![0, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(7);
        let t = DecisionTree::fit(&x, &y, &[0, 1, 2, 3], 2, params(), &mut rng);
        assert_eq!(t.predict_proba(&[1.5, 0.0]), &[1.0, 0.0]);
        assert_eq!(t.predict_proba(&[9.0, 0.0]), &[0.0, 1.0]);
        assert_eq!(t.depth(), 1);
        assert_eq!(t.node_count(), 3);
    }

    #[test]
    fn nan_routes_right() {
        let x = vec![vec![1.0], vec![f64::NAN], vec![5.0], vec![6.0]];
        let y = vec![0, 1, 1, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let p = TreeParams {
            max_features: 1,
            ..params()
        };
        let t = DecisionTree::fit(&x, &y, &[0, 1, 2, 3], 2, p, &mut rng);
        assert_eq!(t.predict_proba(&[f64::NAN]), &[0.0, 1.0]);
        assert_eq!(t.predict_proba(&[0.5]), &[1.0, 0.0]);
    }

    #[test]
    fn constant_features_make_a_leaf() {
        let x = vec![vec![3.0], vec![3.0], vec![3.0]];
        let y = vec![0, 1, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let t = DecisionTree::fit(&x, &y, &[0, 1, 2], 2, params(), &mut rng);
        assert_eq!(t.node_count(), 1);
        let p = t.predict_proba(&[3.0]);
        assert!((p[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn depth_limit() {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let y = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let sample: Vec<usize> = (0..8).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let p = TreeParams {
            max_depth: Some(2),
            max_features: 1,
            ..params()
        };
        let t = DecisionTree::fit(&x, &y, &sample, 2, p, &mut rng);
        assert!(t.depth() <= 2);
    }
}
