//! Error types for dbdiff operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbdiffError>;

#[derive(Error, Debug)]
pub enum DbdiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot open data source '{source_label}': {message}")]
    Connection {
        source_label: String,
        message: String,
    },

    #[error("Failed to introspect table '{table}': {message}")]
    Introspection { table: String, message: String },

    #[error("Cannot unify column '{column}': {left} vs {right}")]
    TypeUnification {
        column: String,
        left: String,
        right: String,
    },

    #[error("Unsupported data source: {path}")]
    UnsupportedSource { path: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data processing error: {message}")]
    DataProcessing { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Comparison cancelled")]
    Cancelled,

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl DbdiffError {
    pub fn connection(source_label: impl Into<String>, msg: impl ToString) -> Self {
        Self::Connection {
            source_label: source_label.into(),
            message: msg.to_string(),
        }
    }

    pub fn introspection(table: impl Into<String>, msg: impl ToString) -> Self {
        Self::Introspection {
            table: table.into(),
            message: msg.to_string(),
        }
    }

    pub fn type_unification(
        column: impl Into<String>,
        left: impl ToString,
        right: impl ToString,
    ) -> Self {
        Self::TypeUnification {
            column: column.into(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn data_processing(msg: impl Into<String>) -> Self {
        Self::DataProcessing {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// True when the run was stopped by its cancellation token
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
