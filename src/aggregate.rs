//! Weighted aggregation of per-table results into a comparison report

use crate::config::ScoreWeights;
use crate::content::ContentDiffResult;
use crate::structure::StructureDiffResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Which tables each side has
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePresence {
    pub total_tables: usize,
    pub common_tables: BTreeSet<String>,
    /// Tables only in B
    pub missing_in_a: BTreeSet<String>,
    /// Tables only in A
    pub missing_in_b: BTreeSet<String>,
    pub score: f64,
}

impl TablePresence {
    pub fn new(tables_a: &BTreeSet<String>, tables_b: &BTreeSet<String>) -> Self {
        let total_tables = tables_a.union(tables_b).count();
        let common_tables: BTreeSet<String> = tables_a.intersection(tables_b).cloned().collect();
        let missing_in_a: BTreeSet<String> = tables_b.difference(tables_a).cloned().collect();
        let missing_in_b: BTreeSet<String> = tables_a.difference(tables_b).cloned().collect();

        let score = if total_tables == 0 {
            0.0
        } else {
            (missing_in_a.len() + missing_in_b.len()) as f64 / total_tables as f64
        };

        Self {
            total_tables,
            common_tables,
            missing_in_a,
            missing_in_b,
            score,
        }
    }
}

/// Structure and content results of one common table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableComparison {
    pub structure: StructureDiffResult,
    pub content: ContentDiffResult,
    /// Set when the table could not be compared and was scored as maximally different
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl TableComparison {
    pub fn faulted(mut structure: StructureDiffResult, fault: impl Into<String>) -> Self {
        structure.score = 1.0;
        Self {
            structure,
            content: ContentDiffResult::maximal(),
            fault: Some(fault.into()),
        }
    }
}

/// Result of one comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub run_id: Uuid,
    pub source_a: String,
    pub source_b: String,
    /// 0 = identical, 1 = completely different
    pub overall_score: f64,
    pub similarity: f64,
    pub avg_structure_score: f64,
    pub avg_data_score: f64,
    pub presence: TablePresence,
    pub tables: BTreeMap<String, TableComparison>,
}

impl ComparisonReport {
    pub fn is_identical(&self) -> bool {
        self.overall_score == 0.0
    }

    pub fn table(&self, name: &str) -> Option<&TableComparison> {
        self.tables.get(name)
    }

    pub fn faulted_tables(&self) -> impl Iterator<Item = &str> {
        self.tables
            .iter()
            .filter(|(_, t)| t.fault.is_some())
            .map(|(name, _)| name.as_str())
    }
}

/// Folds the presence term and per-table results into the overall score
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateScorer {
    weights: ScoreWeights,
}

impl AggregateScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Mean structure and data scores; both 1.0 when there is no common table
    pub fn averages(tables: &BTreeMap<String, TableComparison>) -> (f64, f64) {
        if tables.is_empty() {
            return (1.0, 1.0);
        }
        let n = tables.len() as f64;
        let structure: f64 = tables.values().map(|t| t.structure.score).sum();
        let data: f64 = tables.values().map(|t| t.content.score).sum();
        (structure / n, data / n)
    }

    pub fn overall(&self, presence: f64, avg_structure: f64, avg_data: f64) -> f64 {
        let score = self.weights.presence * presence
            + self.weights.structure * avg_structure
            + self.weights.data * avg_data;
        score.clamp(0.0, 1.0)
    }

    pub fn score(
        &self,
        source_a: &str,
        source_b: &str,
        presence: TablePresence,
        tables: BTreeMap<String, TableComparison>,
    ) -> ComparisonReport {
        let (avg_structure_score, avg_data_score) = Self::averages(&tables);
        let overall_score = self.overall(presence.score, avg_structure_score, avg_data_score);

        log::info!(
            "Comparison complete. Overall difference score: {:.4}",
            overall_score
        );

        ComparisonReport {
            run_id: Uuid::new_v4(),
            source_a: source_a.to_string(),
            source_b: source_b.to_string(),
            overall_score,
            similarity: 1.0 - overall_score,
            avg_structure_score,
            avg_data_score,
            presence,
            tables,
        }
    }
}
