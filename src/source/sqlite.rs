//! SQLite database files

use super::{quote_ident, select_sql, DataSource, HandlePool, TableSchema};
use crate::error::{DbdiffError, Result};
use crate::value::{Row, Value};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use std::path::Path;

/// A SQLite file opened read-only, one pooled connection per worker
pub struct SqliteSource {
    label: String,
    pool: HandlePool<Connection>,
}

impl SqliteSource {
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_parallelism(path, super::default_parallelism())
    }

    /// Keep at most `parallelism` idle connections, one per table worker
    pub fn with_parallelism(path: &Path, parallelism: usize) -> Result<Self> {
        let label = path.display().to_string();
        let db_path = path.to_path_buf();
        let open_label = label.clone();

        let pool = HandlePool::new(
            move || {
                Connection::open_with_flags(
                    &db_path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(|e| DbdiffError::connection(open_label.clone(), e))
            },
            parallelism,
        );

        let source = Self { label, pool };
        source.verify()?;
        log::info!("Connected to SQLite database: {}", source.label);
        Ok(source)
    }

    /// SQLite opens lazily; touch the catalog so a non-database file fails here
    fn verify(&self) -> Result<()> {
        let conn = self.pool.checkout()?;
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| DbdiffError::connection(self.label.clone(), e))?;
        Ok(())
    }
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

impl DataSource for SqliteSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn list_tables(&self) -> Result<BTreeSet<String>> {
        let conn = self.pool.checkout()?;
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            )
            .map_err(|e| DbdiffError::connection(self.label.clone(), e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<BTreeSet<_>>>())
            .map_err(|e| DbdiffError::connection(self.label.clone(), e))?;

        log::debug!("{}: found tables {:?}", self.label, names);
        Ok(names)
    }

    fn get_columns(&self, table: &str) -> Result<TableSchema> {
        let conn = self.pool.checkout()?;
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DbdiffError::introspection(table, e))?;
        let pairs = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
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
