//! Read-only relational data sources

mod duck;
mod memory;
mod pool;
mod sqlite;

pub use self::duck::DuckDbSource;
pub use self::memory::MemorySource;
pub use self::pool::{HandlePool, PooledHandle};
pub use self::sqlite::SqliteSource;

use crate::error::{DbdiffError, Result};
use crate::value::Row;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::ops::ControlFlow;
use std::path::Path;

/// A column name with its declared type, exactly as the source reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub declared_type: String,
}

/// Columns of one table, keyed by name in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: IndexMap<String, ColumnDefinition>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: IndexMap::new(),
        }
    }

    /// Build a schema from `(name, declared_type)` pairs
    pub fn from_pairs<N, T>(
        table: impl Into<String>,
        pairs: impl IntoIterator<Item = (N, T)>,
    ) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        let mut schema = Self::new(table);
        for (name, declared_type) in pairs {
            schema.add_column(name, declared_type);
        }
        schema
    }

    pub fn add_column(&mut self, name: impl Into<String>, declared_type: impl Into<String>) {
        let name = name.into();
        self.columns.insert(
            name.clone(),
            ColumnDefinition {
                name,
                declared_type: declared_type.into(),
            },
        );
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Read-only access to a relational dataset.
///
/// Implementations must be shareable across table workers; backends whose
/// connections are not thread safe hand out one pooled connection per call.
pub trait DataSource: Send + Sync {
    /// Human-readable name used in reports and errors
    fn label(&self) -> &str;

    fn list_tables(&self) -> Result<BTreeSet<String>>;

    /// Column definitions of `table`. An unknown table yields an empty schema.
    fn get_columns(&self, table: &str) -> Result<TableSchema>;

    fn row_count(&self, table: &str) -> Result<usize>;

    /// Visit the rows of `table` in source iteration order, projected to
    /// `columns`. Each call restarts from the first row; the visitor may stop
    /// early by returning `ControlFlow::Break`.
    fn stream_rows(
        &self,
        table: &str,
        columns: &[String],
        visit: &mut dyn FnMut(Row) -> ControlFlow<()>,
    ) -> Result<()>;
}

/// Backend used to open a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceBackend {
    #[default]
    Auto,
    Sqlite,
    DuckDb,
}

impl SourceBackend {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "sqlite" => Ok(Self::Sqlite),
            "duckdb" => Ok(Self::DuckDb),
            _ => Err(format!(
                "Invalid backend: {}. Use 'auto', 'sqlite', or 'duckdb'",
                s
            )),
        }
    }

    /// Detect the backend from the file header, falling back to the extension
    pub fn detect(path: &Path) -> Result<Self> {
        let mut header = [0u8; 16];
        let read = File::open(path)
            .and_then(|mut f| f.read(&mut header))
            .map_err(|e| DbdiffError::connection(path.display().to_string(), e))?;
        let header = &header[..read];

        if header.starts_with(b"SQLite format 3\0") {
            return Ok(Self::Sqlite);
        }
        if header.len() >= 12 && &header[8..12] == b"DUCK" {
            return Ok(Self::DuckDb);
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match extension.as_deref() {
            Some("duckdb") | Some("ddb") => Ok(Self::DuckDb),
            Some("db") | Some("sqlite") | Some("sqlite3") => Ok(Self::Sqlite),
            _ => Err(DbdiffError::UnsupportedSource {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Worker count used when none is configured: the global rayon pool size
pub fn default_parallelism() -> usize {
    rayon::current_num_threads()
}

/// Open a database file read-only with the requested backend
pub fn open_source(path: &Path, backend: SourceBackend) -> Result<Box<dyn DataSource>> {
    open_source_with(path, backend, default_parallelism())
}

/// Open a database file read-only, pooling at most `parallelism` idle
/// connections for the table workers of a run
pub fn open_source_with(
    path: &Path,
    backend: SourceBackend,
    parallelism: usize,
) -> Result<Box<dyn DataSource>> {
    if !path.is_file() {
        return Err(DbdiffError::connection(
            path.display().to_string(),
            "file not found",
        ));
    }

    log::debug!("Opening {} as {:?}", path.display(), backend);
    match backend {
        SourceBackend::Auto => open_source_with(path, SourceBackend::detect(path)?, parallelism),
        SourceBackend::Sqlite => Ok(Box::new(SqliteSource::with_parallelism(path, parallelism)?)),
        SourceBackend::DuckDb => Ok(Box::new(DuckDbSource::with_parallelism(path, parallelism)?)),
    }
}

/// Double-quote an identifier for SQL, escaping embedded quotes
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `SELECT` statement projecting `columns` of `table`
pub(crate) fn select_sql(table: &str, columns: &[String]) -> String {
    let projection = if columns.is_empty() {
        "1".to_string()
    } else {
        columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("SELECT {} FROM {}", projection, quote_ident(table))
}
