//! Common test utilities and helpers

use dbdiff::source::MemorySource;
use dbdiff::value::Value;
use dbdiff::{DbdiffError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for creating temporary database files
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a SQLite database by running `sql` against a fresh file
    pub fn create_sqlite(&self, name: &str, sql: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        let conn = rusqlite::Connection::open(&path)?;
        conn.execute_batch(sql)?;
        Ok(path)
    }

    /// Create a DuckDB database by running `sql` against a fresh file.
    /// The writer is closed before returning so the file can be opened read-only.
    pub fn create_duckdb(&self, name: &str, sql: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        {
            let conn = duckdb::Connection::open(&path)?;
            conn.execute_batch(sql)?;
        }
        Ok(path)
    }

    /// SQLite table `name(id INTEGER, value TEXT)` with `rows` rows
    pub fn create_large_sqlite(&self, file: &str, table: &str, rows: usize) -> Result<PathBuf> {
        let path = self.root().join(file);
        let mut conn = rusqlite::Connection::open(&path)?;
        conn.execute_batch(&format!("CREATE TABLE {} (id INTEGER, value TEXT);", table))?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {} VALUES (?1, ?2)", table))?;
            for i in 0..rows {
                stmt.execute(rusqlite::params![i as i64, format!("value_{}", i)])?;
            }
        }
        tx.commit()?;
        Ok(path)
    }

    /// Create a corrupted file for testing error handling
    pub fn create_corrupted_file(&self, name: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, b"\x00\x01\x02\x03invalid_data\xff\xfe")?;
        Ok(path)
    }

    pub fn path_str(&self, name: &str) -> String {
        self.root().join(name).display().to_string()
    }
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a dbdiff command and return the result
    pub fn run_command(&self, args: &[&str]) -> Result<()> {
        use clap::Parser;
        use dbdiff::cli::Cli;
        use dbdiff::commands::execute_command;

        let mut cmd_args = vec!["dbdiff"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args)
            .map_err(|e| DbdiffError::invalid_input(e.to_string()))?;
        execute_command(cli.command)
    }

    /// Run a command and expect it to succeed
    pub fn expect_success(&self, args: &[&str]) {
        self.run_command(args).expect("Command should succeed");
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> DbdiffError {
        self.run_command(args).expect_err("Command should fail")
    }
}

/// Sample data generators for testing
pub mod sample_data {
    use super::*;

    pub const USERS_A_SQL: &str = "
        CREATE TABLE users (id INTEGER, name TEXT);
        INSERT INTO users VALUES (1, 'a'), (2, 'b');
    ";

    pub const USERS_B_SQL: &str = "
        CREATE TABLE users (id INTEGER, name TEXT, email TEXT);
        INSERT INTO users VALUES (1, 'a', NULL);
    ";

    pub const SHOP_SQL: &str = "
        CREATE TABLE customers (id INTEGER, name TEXT, city TEXT);
        INSERT INTO customers VALUES (1, 'Alice', 'Paris'), (2, 'Bob', 'Berlin'), (3, 'Chloé', '北京');
        CREATE TABLE orders (id INTEGER, customer_id INTEGER, total DOUBLE);
        INSERT INTO orders VALUES (10, 1, 19.99), (11, 2, 5.5), (12, 1, 100.0);
    ";

    /// In-memory equivalent of `USERS_A_SQL`
    pub fn users_a() -> MemorySource {
        MemorySource::new("a").with_table(
            "users",
            &[("id", "INTEGER"), ("name", "TEXT")],
            vec![
                vec![Value::Integer(1), Value::Text("a".into())],
                vec![Value::Integer(2), Value::Text("b".into())],
            ],
        )
    }

    /// In-memory equivalent of `USERS_B_SQL`
    pub fn users_b() -> MemorySource {
        MemorySource::new("b").with_table(
            "users",
            &[("id", "INTEGER"), ("name", "TEXT"), ("email", "TEXT")],
            vec![vec![Value::Integer(1), Value::Text("a".into()), Value::Null]],
        )
    }

    /// Single-column table with `n` integer rows
    pub fn numbers(label: &str, table: &str, n: usize) -> MemorySource {
        let rows = (0..n).map(|i| vec![Value::Integer(i as i64)]).collect();
        MemorySource::new(label).with_table(table, &[("n", "INTEGER")], rows)
    }
}

/// Assert two scores are equal within floating point noise
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
