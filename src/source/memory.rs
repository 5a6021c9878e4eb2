//! In-memory tables, for embedding callers and tests

use super::{DataSource, TableSchema};
use crate::error::Result;
use crate::value::{Row, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;

#[derive(Debug, Clone)]
struct MemoryTable {
    schema: TableSchema,
    rows: Vec<Row>,
}

/// A data source backed by rows held in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    label: String,
    tables: BTreeMap<String, MemoryTable>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Add a table from its `(column, declared_type)` pairs and positional rows.
    /// Row values are matched to columns by position.
    pub fn with_table(
        mut self,
        name: &str,
        columns: &[(&str, &str)],
        rows: Vec<Vec<Value>>,
    ) -> Self {
        let schema = TableSchema::from_pairs(name, columns.iter().copied());
        let names = schema.column_names();
        let rows = rows
            .into_iter()
            .map(|values| names.iter().cloned().zip(values).collect::<Row>())
            .collect();
        self.tables
            .insert(name.to_string(), MemoryTable { schema, rows });
        self
    }
}

impl DataSource for MemorySource {
    fn label(&self) -> &str {
        &self.label
    }

    fn list_tables(&self) -> Result<BTreeSet<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn get_columns(&self, table: &str) -> Result<TableSchema> {
        Ok(self
            .tables
            .get(table)
            .map(|t| t.schema.clone())
            .unwrap_or_else(|| TableSchema::new(table)))
    }

    fn row_count(&self, table: &str) -> Result<usize> {
        Ok(self.tables.get(table).map_or(0, |t| t.rows.len()))
    }

    fn stream_rows(
        &self,
        table: &str,
        columns: &[String],
        visit: &mut dyn FnMut(Row) -> ControlFlow<()>,
    ) -> Result<()> {
        let Some(table) = self.tables.get(table) else {
            return Ok(());
        };
        for row in &table.rows {
            let projected = columns
                .iter()
                .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                .collect::<Row>();
            if visit(projected).is_break() {
                break;
            }
        }
        Ok(())
    }
}
