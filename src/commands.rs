//! Command implementations for dbdiff CLI

use crate::cli::{Commands, OutputFormat};
use crate::config::ComparisonConfig;
use crate::engine::{ComparisonEngine, ComparisonRequest};
use crate::error::{DbdiffError, Result};
use crate::introspect::{parse_table_filter, SchemaIntrospector};
use crate::output::{JsonFormatter, OutputManager, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::source::{open_source, open_source_with, SourceBackend};
use crate::value::CoercionMode;
use std::path::{Path, PathBuf};

/// Options of the compare command after argument parsing
struct CompareOptions {
    tables: Option<String>,
    backend: String,
    format: String,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    sample_cap: Option<usize>,
    seed: Option<u64>,
    coercion: Option<String>,
    threads: Option<usize>,
    quiet: bool,
}

/// Execute a command
pub fn execute_command(command: Commands) -> Result<()> {
    match command {
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
        } => compare_command(
            &source_a,
            &source_b,
            CompareOptions {
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
            },
        ),
        Commands::Inspect {
            source,
            backend,
            format,
        } => inspect_command(&source, &backend, &format),
    }
}

/// Compare two databases
fn compare_command(source_a: &Path, source_b: &Path, options: CompareOptions) -> Result<()> {
    let output_format = OutputFormat::parse(&options.format).map_err(DbdiffError::invalid_input)?;
    let backend = SourceBackend::parse(&options.backend).map_err(DbdiffError::invalid_input)?;
    let config = build_config(&options)?;
    let parallelism = config.effective_parallelism();
    let engine = ComparisonEngine::new(config)?;

    let a = open_source_with(source_a, backend, parallelism)?;
    let b = open_source_with(source_b, backend, parallelism)?;

    let mut request = ComparisonRequest::new(a.as_ref(), b.as_ref());
    if let Some(tables) = options.tables.as_deref() {
        let filter = parse_table_filter(tables);
        if filter.is_empty() {
            return Err(DbdiffError::invalid_input("--tables names no table"));
        }
        request = request.with_tables(filter);
    }

    let report = if options.quiet {
        engine.compare(&request)?
    } else {
        let progress = ProgressReporter::new_for_compare();
        engine.compare(&request.with_progress(&progress))?
    };

    let rendered = match output_format {
        OutputFormat::Json => JsonFormatter::format_report(&report)?,
        OutputFormat::Pretty => PrettyPrinter::render_report(&report),
    };

    if let Some(path) = options.output.as_deref() {
        OutputManager::export(path, &rendered)?;
        if !options.quiet {
            println!("✅ Report saved to {}", path.display());
        }
        return Ok(());
    }

    match (output_format, options.quiet) {
        (OutputFormat::Pretty, true) => PrettyPrinter::print_summary(&report),
        _ => print!("{}", ensure_newline(rendered)),
    }

    for table in report.faulted_tables() {
        log::warn!("Table '{}' could not be compared and was scored as fully different", table);
    }
    Ok(())
}

/// Config file first, then command-line overrides
fn build_config(options: &CompareOptions) -> Result<ComparisonConfig> {
    let mut config = match options.config.as_deref() {
        Some(path) => ComparisonConfig::load(path)?,
        None => ComparisonConfig::default(),
    };

    if let Some(cap) = options.sample_cap {
        config.sample_cap = cap;
    }
    if let Some(seed) = options.seed {
        config.sample_seed = seed;
    }
    if let Some(coercion) = options.coercion.as_deref() {
        config.coercion = CoercionMode::parse(coercion).map_err(DbdiffError::invalid_input)?;
    }
    if let Some(threads) = options.threads {
        config.parallelism = Some(threads);
    }

    config.validate()?;
    Ok(config)
}

/// Show the tables of one database
fn inspect_command(source: &Path, backend: &str, format: &str) -> Result<()> {
    let output_format = OutputFormat::parse(format).map_err(DbdiffError::invalid_input)?;
    let backend = SourceBackend::parse(backend).map_err(DbdiffError::invalid_input)?;

    let source = open_source(source, backend)?;
    let tables = SchemaIntrospector::describe(source.as_ref())?;

    match output_format {
        OutputFormat::Pretty => PrettyPrinter::print_inspection(source.label(), &tables),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "source": source.label(),
                "tables": tables,
            });
            println!("{}", JsonFormatter::format(&json)?);
        }
    }
    Ok(())
}

fn ensure_newline(mut s: String) -> String {
    if !s.ends_with('\n') {
        s.push('\n');
    }
    s
}
