//! Comparison runs: introspection, per-table fan-out, aggregation

use crate::aggregate::{AggregateScorer, ComparisonReport, TableComparison, TablePresence};
use crate::config::ComparisonConfig;
use crate::content::ContentDiffer;
use crate::error::{DbdiffError, Result};
use crate::introspect::{SchemaIntrospector, TableFilter};
use crate::progress::{ComparisonPhase, NoProgress, ProgressEvent, ProgressSink};
use crate::sampler::{ContentSampler, TableSnapshot};
use crate::source::{DataSource, TableSchema};
use crate::structure::{StructureDiffResult, StructureDiffer};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop flag, checked between tables
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(DbdiffError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Inputs of one comparison run
pub struct ComparisonRequest<'a> {
    pub source_a: &'a dyn DataSource,
    pub source_b: &'a dyn DataSource,
    pub table_filter: Option<TableFilter>,
    pub cancel: CancellationToken,
    pub progress: &'a dyn ProgressSink,
}

impl<'a> ComparisonRequest<'a> {
    pub fn new(source_a: &'a dyn DataSource, source_b: &'a dyn DataSource) -> Self {
        Self {
            source_a,
            source_b,
            table_filter: None,
            cancel: CancellationToken::new(),
            progress: &NoProgress,
        }
    }

    pub fn with_tables(mut self, filter: TableFilter) -> Self {
        self.table_filter = Some(filter);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }
}

/// Schemas of one common table on both sides
struct TablePair {
    name: String,
    schema_a: TableSchema,
    schema_b: TableSchema,
    structure: StructureDiffResult,
}

/// Runs comparisons with a fixed configuration. Holds no per-run state.
#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine {
    config: ComparisonConfig,
}

impl ComparisonEngine {
    pub fn new(config: ComparisonConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Run one comparison. The progress sink sees the run return to `Idle`
    /// whether it produced a report, failed or was cancelled.
    pub fn compare(&self, request: &ComparisonRequest<'_>) -> Result<ComparisonReport> {
        let outcome = self.run(request);
        request
            .progress
            .notify(&ProgressEvent::Phase(ComparisonPhase::Idle));
        outcome
    }

    fn run(&self, request: &ComparisonRequest<'_>) -> Result<ComparisonReport> {
        let (a, b) = (request.source_a, request.source_b);
        let progress = request.progress;
        let filter = request.table_filter.as_ref();

        progress.notify(&ProgressEvent::Phase(ComparisonPhase::Connected));
        log::info!("Starting comparison: {} vs {}", a.label(), b.label());

        let tables_a = SchemaIntrospector::list_tables(a, filter)?;
        let tables_b = SchemaIntrospector::list_tables(b, filter)?;
        let presence = TablePresence::new(&tables_a, &tables_b);

        log::info!(
            "Found {} total tables, {} common tables",
            presence.total_tables,
            presence.common_tables.len()
        );
        log::info!(
            "{} tables missing in A, {} tables missing in B",
            presence.missing_in_a.len(),
            presence.missing_in_b.len()
        );
        progress.notify(&ProgressEvent::TablesDiscovered {
            common: presence.common_tables.len(),
            total: presence.total_tables,
        });

        let pairs = presence
            .common_tables
            .iter()
            .map(|name| -> Result<TablePair> {
                request.cancel.check()?;
                let schema_a = SchemaIntrospector::get_columns(a, name)?;
                let schema_b = SchemaIntrospector::get_columns(b, name)?;
                let structure = StructureDiffer::compare(&schema_a, &schema_b);
                log::debug!("Table {} structure difference: {}", name, structure.score);
                Ok(TablePair {
                    name: name.clone(),
                    schema_a,
                    schema_b,
                    structure,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        progress.notify(&ProgressEvent::Phase(ComparisonPhase::SchemaCompared));

        let tables = self.compare_tables(request, pairs)?;

        // Join barrier: every table result is in, unless the run was stopped
        request.cancel.check()?;
        progress.notify(&ProgressEvent::Phase(ComparisonPhase::DataCompared));

        let report =
            AggregateScorer::new(self.config.weights).score(a.label(), b.label(), presence, tables);
        progress.notify(&ProgressEvent::Phase(ComparisonPhase::Reported));
        Ok(report)
    }

    fn compare_tables(
        &self,
        request: &ComparisonRequest<'_>,
        pairs: Vec<TablePair>,
    ) -> Result<BTreeMap<String, TableComparison>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.effective_parallelism())
            .build()
            .map_err(|e| DbdiffError::config(format!("Failed to build thread pool: {}", e)))?;

        let results: Vec<Result<(String, TableComparison)>> = pool.install(|| {
            pairs
                .into_par_iter()
                .map(|pair| -> Result<(String, TableComparison)> {
                    request.cancel.check()?;
                    Ok((pair.name.clone(), self.compare_table_isolated(request, pair)))
                })
                .collect()
        });

        results.into_iter().collect()
    }

    /// A failing or panicking table is recorded as maximally different
    fn compare_table_isolated(
        &self,
        request: &ComparisonRequest<'_>,
        pair: TablePair,
    ) -> TableComparison {
        let progress = request.progress;
        progress.notify(&ProgressEvent::TableStarted {
            table: pair.name.clone(),
        });

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.compare_table(request, &pair)))
            .unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(DbdiffError::data_processing(format!("panic: {}", message)))
            });

        match outcome {
            Ok(table) => {
                progress.notify(&ProgressEvent::TableFinished {
                    table: pair.name.clone(),
                    structure_score: table.structure.score,
                    data_score: table.content.score,
                });
                table
            }
            Err(e) => {
                log::error!("Comparing table {} failed: {}", pair.name, e);
                progress.notify(&ProgressEvent::TableFailed {
                    table: pair.name.clone(),
                    message: e.to_string(),
                });
                TableComparison::faulted(pair.structure, e.to_string())
            }
        }
    }

    fn compare_table(
        &self,
        request: &ComparisonRequest<'_>,
        pair: &TablePair,
    ) -> Result<TableComparison> {
        let (a, b) = (request.source_a, request.source_b);
        log::info!("Comparing table: {}", pair.name);

        let common = StructureDiffer::common_columns(&pair.schema_a, &pair.schema_b);
        let n1 = a.row_count(&pair.name)?;
        let n2 = b.row_count(&pair.name)?;

        let differ = ContentDiffer::new(self.config.coercion);
        let content = if common.is_empty() {
            differ.compare(
                &TableSnapshot { total_rows: n1, ..Default::default() },
                &TableSnapshot { total_rows: n2, ..Default::default() },
                &common,
            )
        } else {
            let sampler = ContentSampler::new(self.config.sample_cap, self.config.sample_seed);
            let plan = sampler.plan(n1, n2);
            let rows_a = ContentSampler::fetch(a, &pair.name, &common, &plan.left, n1)?;
            let rows_b = ContentSampler::fetch(b, &pair.name, &common, &plan.right, n2)?;
            differ.compare(&rows_a, &rows_b, &common)
        };

        Ok(TableComparison {
            structure: pair.structure.clone(),
            content,
            fault: None,
        })
    }
}

/// Compare two sources with the default configuration
pub fn compare(
    source_a: &dyn DataSource,
    source_b: &dyn DataSource,
    table_filter: Option<TableFilter>,
) -> Result<ComparisonReport> {
    let mut request = ComparisonRequest::new(source_a, source_b);
    request.table_filter = table_filter;
    ComparisonEngine::default().compare(&request)
}
