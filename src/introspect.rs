//! Schema introspection over data sources

use crate::error::{DbdiffError, Result};
use crate::source::{DataSource, TableSchema};
use serde::Serialize;
use std::collections::BTreeSet;

/// Table names to restrict a comparison to
pub type TableFilter = BTreeSet<String>;

/// Schema plus row count of one table, for inspection output
#[derive(Debug, Clone, Serialize)]
pub struct TableDescription {
    pub schema: TableSchema,
    pub row_count: usize,
}

/// Reads table names and column definitions from a source
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Tables of `source`, restricted to `filter` when one is given.
    /// Filtered names the source lacks are simply absent from the result.
    pub fn list_tables(
        source: &dyn DataSource,
        filter: Option<&TableFilter>,
    ) -> Result<BTreeSet<String>> {
        let tables = source.list_tables()?;
        Ok(match filter {
            Some(filter) => tables.intersection(filter).cloned().collect(),
            None => tables,
        })
    }

    pub fn get_columns(source: &dyn DataSource, table: &str) -> Result<TableSchema> {
        source.get_columns(table).map_err(|e| match e {
            DbdiffError::Introspection { .. } | DbdiffError::Connection { .. } => e,
            other => DbdiffError::introspection(table, other),
        })
    }

    /// Every table of `source` with its columns and row count
    pub fn describe(source: &dyn DataSource) -> Result<Vec<TableDescription>> {
        let mut descriptions = Vec::new();
        for table in source.list_tables()? {
            let schema = Self::get_columns(source, &table)?;
            let row_count = source
                .row_count(&table)
                .map_err(|e| DbdiffError::introspection(&table, e))?;
            descriptions.push(TableDescription { schema, row_count });
        }
        Ok(descriptions)
    }
}

/// Parse a comma separated table list, ignoring blanks
pub fn parse_table_filter(s: &str) -> TableFilter {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
