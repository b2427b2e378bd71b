//! Re-run a persisted model over a derived table and report per-class scores.

use defaulter_data::DerivedTable;
use serde::{Deserialize, Serialize};

use crate::artifact::ModelArtifact;
use crate::error::ModelError;
use crate::metrics::ClassificationReport;
use crate::split::train_test_split;

/// Which rows of the derived table are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationScope {
    /// Every row, including the ones the model was trained on.
    #[default]
    Full,
    /// Only the held-out rows, re-split with the artifact's split parameters.
    HeldOut,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub scope: EvaluationScope,
    pub rows: usize,
    pub report: ClassificationReport,
}

pub fn evaluate(
    artifact: &ModelArtifact,
    table: &DerivedTable,
    scope: EvaluationScope,
) -> Result<Evaluation, ModelError> {
    let (x, y) = match scope {
        EvaluationScope::Full => (table.features(), table.labels()),
        EvaluationScope::HeldOut => {
            let split = train_test_split(
                &table.features(),
                &table.labels(),
                artifact.metadata.split,
            )?;
            (split.x_test, split.y_test)
        }
    };
    let predicted = artifact.forest.predict_batch(&x)?;
    log::info!("Evaluated {} rows ({:?})", x.len(), scope);
    Ok(Evaluation {
        scope,
        rows: x.len(),
        report: ClassificationReport::new(&y, &predicted),
    })
}
