//! Row selection for content comparison of large tables

use crate::error::Result;
use crate::source::DataSource;
use crate::value::Row;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::ops::ControlFlow;

/// Rows to read from one side of a table comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RowSelection {
    All,
    /// Ascending row positions
    Indices(Vec<usize>),
}

impl RowSelection {
    pub fn len(&self, total_rows: usize) -> usize {
        match self {
            Self::All => total_rows,
            Self::Indices(indices) => indices.len(),
        }
    }
}

/// Which rows of each side take part in the comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SamplePlan {
    pub left: RowSelection,
    pub right: RowSelection,
    pub sampled: bool,
}

/// Rows read for one side, together with the full table size
#[derive(Debug, Clone, Default)]
pub struct TableSnapshot {
    pub rows: Vec<Row>,
    pub total_rows: usize,
    pub sampled: bool,
}

impl TableSnapshot {
    /// A snapshot holding every row of the table
    pub fn full(rows: Vec<Row>) -> Self {
        Self {
            total_rows: rows.len(),
            rows,
            sampled: false,
        }
    }
}

/// Chooses full or sampled comparison. The same seed and row counts always
/// select the same rows.
#[derive(Debug, Clone, Copy)]
pub struct ContentSampler {
    cap: usize,
    seed: u64,
}

impl Default for ContentSampler {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SAMPLE_CAP, crate::DEFAULT_SAMPLE_SEED)
    }
}

impl ContentSampler {
    pub fn new(cap: usize, seed: u64) -> Self {
        Self { cap, seed }
    }

    pub fn plan(&self, left_rows: usize, right_rows: usize) -> SamplePlan {
        if left_rows.max(right_rows) <= self.cap {
            return SamplePlan {
                left: RowSelection::All,
                right: RowSelection::All,
                sampled: false,
            };
        }

        let size = self.cap.min(left_rows).min(right_rows);
        log::info!(
            "Large table detected ({} / {} rows), sampling {} rows per side",
            left_rows,
            right_rows,
            size
        );
        SamplePlan {
            left: self.side(left_rows, size),
            right: self.side(right_rows, size),
            sampled: true,
        }
    }

    fn side(&self, total: usize, size: usize) -> RowSelection {
        if total > size {
            RowSelection::Indices(self.select(total, size))
        } else {
            RowSelection::All
        }
    }

    /// `size` distinct positions out of `total`, ascending
    pub fn select(&self, total: usize, size: usize) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut indices = rand::seq::index::sample(&mut rng, total, size.min(total)).into_vec();
        indices.sort_unstable();
        indices
    }

    /// Stream `table` from `source`, keeping only the selected rows
    pub fn fetch(
        source: &dyn DataSource,
        table: &str,
        columns: &[String],
        selection: &RowSelection,
        total_rows: usize,
    ) -> Result<TableSnapshot> {
        let mut rows = Vec::with_capacity(selection.len(total_rows));

        match selection {
            RowSelection::All => {
                source.stream_rows(table, columns, &mut |row| {
                    rows.push(row);
                    ControlFlow::Continue(())
                })?;
            }
            RowSelection::Indices(indices) => {
                let mut wanted = indices.iter().copied().peekable();
                let mut position = 0usize;
                source.stream_rows(table, columns, &mut |row| {
                    if wanted.peek() == Some(&position) {
                        rows.push(row);
                        wanted.next();
                    }
                    position += 1;
                    if wanted.peek().is_none() {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                })?;
            }
        }

        Ok(TableSnapshot {
            rows,
            total_rows,
            sampled: matches!(selection, RowSelection::Indices(_)),
        })
    }
}
