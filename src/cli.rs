//! Command-line interface for dbdiff

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dbdiff")]
#[command(about = "Scores how different two relational databases are")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two databases and report their difference score
    Compare {
        /// First database file (A)
        source_a: PathBuf,

        /// Second database file (B)
        source_b: PathBuf,

        /// Comma separated list of tables to compare (defaults to all)
        #[arg(long)]
        tables: Option<String>,

        /// Backend: "auto", "sqlite", or "duckdb"
        #[arg(long, default_value = "auto")]
        backend: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Row count above which tables are sampled (must be > 0)
        #[arg(long, value_parser = validate_sample_cap)]
        sample_cap: Option<usize>,

        /// Seed for row sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Type coercion: "strict", "numeric", or "textual"
        #[arg(long)]
        coercion: Option<String>,

        /// Worker threads for table comparison (defaults to all cores)
        #[arg(long, value_parser = validate_threads)]
        threads: Option<usize>,

        /// Quiet output (scores only)
        #[arg(long)]
        quiet: bool,
    },

    /// List the tables and columns of one database
    Inspect {
        /// Database file
        source: PathBuf,

        /// Backend: "auto", "sqlite", or "duckdb"
        #[arg(long, default_value = "auto")]
        backend: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },
}

/// Parse output format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Validate that the sample cap is greater than 0
fn validate_sample_cap(s: &str) -> Result<usize, String> {
    let cap: usize = s
        .parse()
        .map_err(|_| format!("Invalid sample cap: '{}'. Must be a positive integer.", s))?;

    if cap == 0 {
        return Err("Sample cap must be greater than 0".to_string());
    }

    Ok(cap)
}

fn validate_threads(s: &str) -> Result<usize, String> {
    let threads: usize = s
        .parse()
        .map_err(|_| format!("Invalid thread count: '{}'. Must be a positive integer.", s))?;

    if threads == 0 {
        return Err("Thread count must be greater than 0".to_string());
    }

    Ok(threads)
}
