//! Per-table structure comparison

use crate::source::TableSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Column-level discrepancies between two versions of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDiffResult {
    pub score: f64,
    /// Columns only in B
    pub missing_in_a: BTreeSet<String>,
    /// Columns only in A
    pub missing_in_b: BTreeSet<String>,
    pub type_mismatches: BTreeSet<String>,
}

impl StructureDiffResult {
    pub fn has_changes(&self) -> bool {
        !self.missing_in_a.is_empty()
            || !self.missing_in_b.is_empty()
            || !self.type_mismatches.is_empty()
    }
}

pub struct StructureDiffer;

impl StructureDiffer {
    /// Compare column names and declared types. Types are compared as raw
    /// strings, case-sensitively.
    pub fn compare(a: &TableSchema, b: &TableSchema) -> StructureDiffResult {
        let names_a: BTreeSet<&String> = a.columns.keys().collect();
        let names_b: BTreeSet<&String> = b.columns.keys().collect();
        let union = names_a.union(&names_b).count();

        let missing_in_a: BTreeSet<String> =
            names_b.difference(&names_a).map(|c| c.to_string()).collect();
        let missing_in_b: BTreeSet<String> =
            names_a.difference(&names_b).map(|c| c.to_string()).collect();
        let type_mismatches: BTreeSet<String> = names_a
            .intersection(&names_b)
            .filter(|c| a.columns[c.as_str()].declared_type != b.columns[c.as_str()].declared_type)
            .map(|c| c.to_string())
            .collect();

        let score = if union == 0 {
            0.0
        } else {
            (missing_in_a.len() + missing_in_b.len() + type_mismatches.len()) as f64 / union as f64
        };

        StructureDiffResult {
            score,
            missing_in_a,
            missing_in_b,
            type_mismatches,
        }
    }

    /// Columns present in both schemas, in A's declaration order
    pub fn common_columns(a: &TableSchema, b: &TableSchema) -> Vec<String> {
        a.columns
            .keys()
            .filter(|c| b.columns.contains_key(c.as_str()))
            .cloned()
            .collect()
    }
}
