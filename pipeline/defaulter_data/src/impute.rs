//! Per-column missing-value policies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::columns;
use crate::table::RawTable;

/// How missing cells of one column are filled before derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputePolicy {
    /// Keep missing cells missing.
    Leave,
    /// Copy the previous row's value; leading gaps stay missing.
    ForwardFill,
    /// Forward-fill, then substitute the given value for leading gaps.
    ForwardFillOr(String),
    /// Substitute the given value for every missing cell.
    Constant(String),
}

/// Policy per column name, with a fallback for unlisted columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputationTable {
    #[serde(default = "default_fallback")]
    pub fallback: ImputePolicy,
    #[serde(default, flatten)]
    pub columns: BTreeMap<String, ImputePolicy>,
}

fn default_fallback() -> ImputePolicy {
    ImputePolicy::ForwardFill
}

impl Default for ImputationTable {
    fn default() -> Self {
        let mut columns = BTreeMap::new();
        for name in [columns::AHD_CLIENT, columns::MEDICAL_COVER] {
            columns.insert(
                name.to_string(),
                ImputePolicy::ForwardFillOr(columns::DEFAULT_FLAG.to_string()),
            );
        }
        Self {
            fallback: default_fallback(),
            columns,
        }
    }
}

impl ImputationTable {
    /// An empty table that applies `fallback` everywhere.
    pub fn uniform(fallback: ImputePolicy) -> Self {
        Self {
            fallback,
            columns: BTreeMap::new(),
        }
    }

    pub fn with_policy(mut self, column: &str, policy: ImputePolicy) -> Self {
        self.columns.insert(column.to_string(), policy);
        self
    }

    /// Overlay `overrides` on top of this table.
    pub fn merged(mut self, overrides: &BTreeMap<String, ImputePolicy>) -> Self {
        for (k, v) in overrides {
            self.columns.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn policy_for(&self, column: &str) -> &ImputePolicy {
        self.columns.get(column).unwrap_or(&self.fallback)
    }

    /// Fill missing cells of every column in place, in row order.
    pub fn apply(&self, table: &mut RawTable) {
        let policies: Vec<ImputePolicy> = table
            .columns()
            .iter()
            .map(|c| self.policy_for(c).clone())
            .collect();
        for (col, policy) in policies.iter().enumerate() {
            fill_column(table, col, policy);
        }
    }
}

fn fill_column(table: &mut RawTable, col: usize, policy: &ImputePolicy) {
    let mut last: Option<String> = None;
    for row in table.rows_mut() {
        let slot = &mut row[col];
        match policy {
            ImputePolicy::Leave => {}
            ImputePolicy::Constant(v) => {
                if slot.is_none() {
                    *slot = Some(v.clone());
                }
            }
            ImputePolicy::ForwardFill | ImputePolicy::ForwardFillOr(_) => {
                if slot.is_none() {
                    *slot = match (&last, policy) {
                        (Some(prev), _) => Some(prev.clone()),
                        (None, ImputePolicy::ForwardFillOr(v)) => Some(v.clone()),
                        (None, _) => None,
                    };
                } else {
                    last = slot.clone();
                }
            }
        }
    }
}
