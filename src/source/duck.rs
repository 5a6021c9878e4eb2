//! DuckDB database files

use super::{quote_ident, select_sql, DataSource, HandlePool, TableSchema};
use crate::error::{DbdiffError, Result};
use crate::value::{Row, Value};
use duckdb::types::ValueRef;
use duckdb::{params, AccessMode, Config, Connection};
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A DuckDB file opened read-only. Workers get cloned connections to the
/// same database instance.
pub struct DuckDbSource {
    label: String,
    pool: HandlePool<Connection>,
}

impl DuckDbSource {
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_parallelism(path, super::default_parallelism())
    }

    /// Keep at most `parallelism` idle connections, one per table worker
    pub fn with_parallelism(path: &Path, parallelism: usize) -> Result<Self> {
        let label = path.display().to_string();
        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(|e| DbdiffError::connection(label.clone(), e))?;
        let base = Connection::open_with_flags(path, config)
            .map_err(|e| DbdiffError::connection(label.clone(), e))?;

        let base = Arc::new(Mutex::new(base));
        let open_label = label.clone();
        let pool = HandlePool::new(
            move || {
                base.lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .try_clone()
                    .map_err(|e| DbdiffError::connection(open_label.clone(), e))
            },
            parallelism,
        );

        log::info!("Connected to DuckDB database: {}", label);
        Ok(Self { label, pool })
    }
}

/// Convert a DuckDB cell into the closed value model
fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Integer(b as i64),
        ValueRef::TinyInt(i) => Value::Integer(i as i64),
        ValueRef::SmallInt(i) => Value::Integer(i as i64),
        ValueRef::Int(i) => Value::Integer(i as i64),
        ValueRef::BigInt(i) => Value::Integer(i),
        ValueRef::UTinyInt(i) => Value::Integer(i as i64),
        ValueRef::USmallInt(i) => Value::Integer(i as i64),
        ValueRef::UInt(i) => Value::Integer(i as i64),
        ValueRef::UBigInt(i) => i64::try_from(i)
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        ValueRef::HugeInt(i) => i64::try_from(i)
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        ValueRef::Float(f) => Value::Real(f as f64),
        ValueRef::Double(f) => Value::Real(f),
        ValueRef::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>().map(Value::Real).unwrap_or(Value::Text(text))
        }
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        // Dates, times, nested types: compared through a stable text form
        other => Value::Text(format!("{:?}", other)),
    }
}

impl DataSource for DuckDbSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn list_tables(&self) -> Result<BTreeSet<String>> {
        let conn = self.pool.checkout()?;
        let mut stmt = conn
            .prepare(
                "SELECT table_name FROM information_schema.tables
                 WHERE table_schema = 'main' AND table_type = 'BASE TABLE'",
            )
            .map_err(|e| DbdiffError::connection(self.label.clone(), e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<duckdb::Result<BTreeSet<_>>>())
            .map_err(|e| DbdiffError::connection(self.label.clone(), e))?;

        log::debug!("{}: found tables {:?}", self.label, names);
        Ok(names)
    }

    fn get_columns(&self, table: &str) -> Result<TableSchema> {
        let conn = self.pool.checkout()?;
        let mut stmt = conn
            .prepare(
                "SELECT column_name, data_type FROM information_schema.columns
                 WHERE table_schema = 'main' AND table_name = ?
                 ORDER BY ordinal_position",
            )
            .map_err(|e| DbdiffError::introspection(table, e))?;
        let pairs = stmt
            .query_map(params![table], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .and_then(|rows| rows.collect::<duckdb::Result<Vec<_>>>())
            .map_err(|e| DbdiffError::introspection(table, e))?;

        Ok(TableSchema::from_pairs(table, pairs))
    }

    fn row_count(&self, table: &str) -> Result<usize> {
        let conn = self.pool.checkout()?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }

    fn stream_rows(
        &self,
        table: &str,
        columns: &[String],
        visit: &mut dyn FnMut(Row) -> ControlFlow<()>,
    ) -> Result<()> {
        let conn = self.pool.checkout()?;
        let mut stmt = conn.prepare(&select_sql(table, columns))?;
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            let mut record = Row::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                record.insert(column.clone(), to_value(row.get_ref(i)?));
            }
            if visit(record).is_break() {
                break;
            }
        }
        Ok(())
    }
}
