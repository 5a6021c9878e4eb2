//! Unit tests for CLI argument parsing and validation

use clap::Parser;
use dbdiff::cli::{Cli, Commands, OutputFormat};
use std::path::PathBuf;

#[test]
fn test_cli_compare_defaults() {
    let cli = Cli::try_parse_from(["dbdiff", "compare", "a.db", "b.db"]).unwrap();
    match cli.command {
        Commands::Compare {
            source_a,
            source_b,
            tables,
            backend,
            format,
            output,
            config,
            sample_cap,
            seed,
            coercion,
            threads,
            quiet,
        } => {
            assert_eq!(source_a, PathBuf::from("a.db"));
            assert_eq!(source_b, PathBuf::from("b.db"));
            assert!(tables.is_none());
            assert_eq!(backend, "auto");
            assert_eq!(format, "pretty");
            assert!(output.is_none());
            assert!(config.is_none());
            assert!(sample_cap.is_none());
            assert!(seed.is_none());
            assert!(coercion.is_none());
            assert!(threads.is_none());
            assert!(!quiet);
        }
        _ => panic!("Expected Compare command"),
    }
    assert!(!cli.verbose);
}

#[test]
fn test_cli_compare_with_options() {
    let cli = Cli::try_parse_from([
        "dbdiff",
        "compare",
        "a.duckdb",
        "b.duckdb",
        "--backend",
        "duckdb",
        "--format",
        "json",
        "--seed",
        "7",
        "--coercion",
        "textual",
        "--threads",
        "2",
        "--quiet",
        "--verbose",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Commands::Compare {
            backend,
            format,
            seed,
            coercion,
            threads,
            quiet,
            ..
        } => {
            assert_eq!(backend, "duckdb");
            assert_eq!(format, "json");
            assert_eq!(seed, Some(7));
            assert_eq!(coercion.as_deref(), Some("textual"));
            assert_eq!(threads, Some(2));
            assert!(quiet);
        }
        _ => panic!("Expected Compare command"),
    }
}

#[test]
fn test_cli_rejects_zero_sample_cap() {
    let zero_cap = ["dbdiff", "compare", "a.db", "b.db", "--sample-cap", "0"];
    assert!(Cli::try_parse_from(zero_cap).is_err());
    let zero_threads = ["dbdiff", "compare", "a.db", "b.db", "--threads", "0"];
    assert!(Cli::try_parse_from(zero_threads).is_err());
}

#[test]
fn test_cli_compare_requires_two_sources() {
    assert!(Cli::try_parse_from(["dbdiff", "compare", "a.db"]).is_err());
}

#[test]
fn test_cli_inspect_command() {
    let cli = Cli::try_parse_from(["dbdiff", "inspect", "shop.db", "--format", "json"]).unwrap();
    match cli.command {
        Commands::Inspect { source, backend, format } => {
            assert_eq!(source, PathBuf::from("shop.db"));
            assert_eq!(backend, "auto");
            assert_eq!(format, "json");
        }
        _ => panic!("Expected Inspect command"),
    }
}

#[test]
fn test_output_format_parse() {
    assert_eq!(OutputFormat::parse("Pretty"), Ok(OutputFormat::Pretty));
    assert_eq!(OutputFormat::parse("json"), Ok(OutputFormat::Json));
    assert!(OutputFormat::parse("csv").is_err());
}
