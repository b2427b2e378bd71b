//! Versioned category-to-code mapping for the label-encoded columns.
//!
//! Codes are assigned once, from the sorted set of labels seen at training
//! time, and then travel with the model so that evaluation and serving encode
//! exactly as training did.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Current layout of [`Codebook`].
pub const CODEBOOK_VERSION: u32 = 1;

/// Label -> code for one column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryMap {
    codes: BTreeMap<String, u32>,
}

impl CategoryMap {
    /// Assign codes 0..n in sorted label order.
    pub fn fit<'a, I: IntoIterator<Item = &'a str>>(labels: I) -> Self {
        let sorted: BTreeSet<&str> = labels.into_iter().collect();
        let codes = sorted
            .into_iter()
            .enumerate()
            .map(|(i, l)| (l.to_string(), i as u32))
            .collect();
        Self { codes }
    }

    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codebook {
    pub version: u32,
    columns: BTreeMap<String, CategoryMap>,
}

impl Default for Codebook {
    fn default() -> Self {
        Self {
            version: CODEBOOK_VERSION,
            columns: BTreeMap::new(),
        }
    }
}

impl Codebook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, column: &str, map: CategoryMap) -> Self {
        self.columns.insert(column.to_string(), map);
        self
    }

    pub fn column(&self, column: &str) -> Option<&CategoryMap> {
        self.columns.get(column)
    }

    pub fn encode(&self, column: &str, label: &str) -> Result<u32, DataError> {
        self.columns
            .get(column)
            .and_then(|m| m.code(label))
            .ok_or_else(|| DataError::UnknownCategory {
                column: column.to_string(),
                value: label.to_string(),
            })
    }
}
