//! # dbdiff
//!
//! Scores how different two relational datasets are, by table presence,
//! per-table structure and per-table content, and folds the three into one
//! weighted difference score and its complementary similarity.

pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod introspect;
pub mod output;
pub mod progress;
pub mod sampler;
pub mod source;
pub mod structure;
pub mod value;

pub use aggregate::{ComparisonReport, TableComparison, TablePresence};
pub use config::ComparisonConfig;
pub use engine::{compare, CancellationToken, ComparisonEngine, ComparisonRequest};
pub use error::{DbdiffError, Result};
pub use source::{open_source, DataSource, SourceBackend};

/// Tables with more rows than this on either side are compared on a sample
pub const DEFAULT_SAMPLE_CAP: usize = 10000;

/// Seed of the row sampler
pub const DEFAULT_SAMPLE_SEED: u64 = 42;
