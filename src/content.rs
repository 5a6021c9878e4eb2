//! Per-table content comparison

use crate::sampler::TableSnapshot;
use crate::value::{column_kind, unify_column, CoercionMode, Value};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of comparing the rows of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDiffResult {
    /// (row_diff_score + content_diff_score) / 2, or 1.0 without common columns
    pub score: f64,
    pub row_count_diff: usize,
    pub row_diff_score: f64,
    pub content_diff_score: f64,
    pub no_common_columns: bool,
    pub rows_a: usize,
    pub rows_b: usize,
    pub rows_compared: usize,
    pub mismatched_cells: usize,
    pub sampled: bool,
    /// Columns whose value kinds could not be unified; every cell counted as a mismatch
    pub ununified_columns: Vec<String>,
}

impl ContentDiffResult {
    /// Result recorded for a table whose comparison failed
    pub fn maximal() -> Self {
        Self {
            score: 1.0,
            row_count_diff: 0,
            row_diff_score: 1.0,
            content_diff_score: 1.0,
            no_common_columns: false,
            rows_a: 0,
            rows_b: 0,
            rows_compared: 0,
            mismatched_cells: 0,
            sampled: false,
            ununified_columns: Vec::new(),
        }
    }
}

/// Counts cell mismatches between positionally aligned rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentDiffer {
    mode: CoercionMode,
}

struct ColumnTally {
    mismatched: usize,
    ununified: bool,
}

impl ContentDiffer {
    pub fn new(mode: CoercionMode) -> Self {
        Self { mode }
    }

    pub fn compare(
        &self,
        a: &TableSnapshot,
        b: &TableSnapshot,
        common_columns: &[String],
    ) -> ContentDiffResult {
        let (n1, n2) = (a.total_rows, b.total_rows);
        let row_count_diff = n1.abs_diff(n2);
        let max_rows = n1.max(n2);
        let row_diff_score = if max_rows > 0 {
            row_count_diff as f64 / max_rows as f64
        } else {
            0.0
        };
        let sampled = a.sampled || b.sampled;

        if common_columns.is_empty() {
            log::debug!("No common columns found between tables");
            return ContentDiffResult {
                score: 1.0,
                row_count_diff,
                row_diff_score,
                content_diff_score: 1.0,
                no_common_columns: true,
                rows_a: n1,
                rows_b: n2,
                rows_compared: 0,
                mismatched_cells: 0,
                sampled,
                ununified_columns: Vec::new(),
            };
        }

        let rows_compared = a.rows.len().min(b.rows.len());
        let tallies: Vec<ColumnTally> = common_columns
            .par_iter()
            .map(|column| self.compare_column(column, a, b, rows_compared))
            .collect();

        let mismatched_cells: usize = tallies.iter().map(|t| t.mismatched).sum();
        let ununified_columns = common_columns
            .iter()
            .zip(&tallies)
            .filter(|(_, t)| t.ununified)
            .map(|(c, _)| c.clone())
            .collect();

        // No aligned rows means nothing to compare, even when both sides are empty
        let content_diff_score = if rows_compared > 0 {
            mismatched_cells as f64 / (rows_compared * common_columns.len()) as f64
        } else {
            1.0
        };

        let score = (row_diff_score + content_diff_score) / 2.0;
        log::debug!("Data difference score: {}", score);

        ContentDiffResult {
            score,
            row_count_diff,
            row_diff_score,
            content_diff_score,
            no_common_columns: false,
            rows_a: n1,
            rows_b: n2,
            rows_compared,
            mismatched_cells,
            sampled,
            ununified_columns,
        }
    }

    fn compare_column(
        &self,
        column: &str,
        a: &TableSnapshot,
        b: &TableSnapshot,
        rows: usize,
    ) -> ColumnTally {
        let cells_a: Vec<&Value> = a.rows[..rows].iter().map(|r| cell(r, column)).collect();
        let cells_b: Vec<&Value> = b.rows[..rows].iter().map(|r| cell(r, column)).collect();

        let target = match unify_column(
            column,
            column_kind(cells_a.iter().copied()),
            column_kind(cells_b.iter().copied()),
            self.mode,
        ) {
            Ok(kind) => kind,
            Err(e) => {
                log::warn!("{}, treating all {} cells as different", e, rows);
                return ColumnTally {
                    mismatched: rows,
                    ununified: true,
                };
            }
        };

        let mismatched = cells_a
            .iter()
            .zip(&cells_b)
            .filter(|(x, y)| match (x.is_null(), y.is_null()) {
                (true, true) => false,
                (false, false) => match (x.coerce(target), y.coerce(target)) {
                    (Some(x), Some(y)) => !x.same_as(&y),
                    _ => true,
                },
                _ => true,
            })
            .count();

        ColumnTally {
            mismatched,
            ununified: false,
        }
    }
}

static NULL: Value = Value::Null;

fn cell<'a>(row: &'a crate::value::Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&NULL)
}
