//! Classification metrics: accuracy and the per-class precision/recall/F1
//! report printed by the evaluator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fraction of positions where `predicted` equals `actual`.
pub fn accuracy(actual: &[u8], predicted: &[u8]) -> f64 {
    let total = actual.len().min(predicted.len());
    if total == 0 {
        return 0.0;
    }
    let hits = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a == p)
        .count();
    hits as f64 / total as f64
}

/// One-vs-rest counts for a single class.
fn confusion(actual: &[u8], predicted: &[u8], class: u8) -> (u64, u64, u64) {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for (&a, &p) in actual.iter().zip(predicted) {
        match (p == class, a == class) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
            (false, false) => {}
        }
    }
    (tp, fp, fn_)
}

fn ratio(num: u64, denom: u64) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassScores>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    /// Scores for every label present in either `actual` or `predicted`, in
    /// ascending label order.
    pub fn new(actual: &[u8], predicted: &[u8]) -> Self {
        let mut labels: Vec<u8> = actual.iter().chain(predicted).copied().collect();
        labels.sort_unstable();
        labels.dedup();

        let classes: Vec<ClassScores> = labels
            .iter()
            .map(|&c| {
                let (tp, fp, fn_) = confusion(actual, predicted, c);
                let precision = ratio(tp, tp + fp);
                let recall = ratio(tp, tp + fn_);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassScores {
                    label: c.to_string(),
                    precision,
                    recall,
                    f1,
                    support: (tp + fn_) as usize,
                }
            })
            .collect();

        let total: usize = classes.iter().map(|c| c.support).sum();
        let k = classes.len().max(1) as f64;
        let mean = |f: fn(&ClassScores) -> f64| classes.iter().map(f).sum::<f64>() / k;
        let weighted = |f: fn(&ClassScores) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>() / total as f64
            }
        };

        let macro_avg = ClassScores {
            label: "macro avg".into(),
            precision: mean(|c| c.precision),
            recall: mean(|c| c.recall),
            f1: mean(|c| c.f1),
            support: total,
        };
        let weighted_avg = ClassScores {
            label: "weighted avg".into(),
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
            support: total,
        };

        Self {
            accuracy: accuracy(actual, predicted),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn class(&self, label: &str) -> Option<&ClassScores> {
        self.classes.iter().find(|c| c.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .chain(std::iter::once(self.weighted_avg.label.len()))
            .max()
            .unwrap_or(0);
        let row = |f: &mut fmt::Formatter<'_>, s: &ClassScores| {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                s.label, s.precision, s.recall, s.f1, s.support
            )
        };

        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            row(f, c)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, &self.macro_avg)?;
        row(f, &self.weighted_avg)
    }
}
