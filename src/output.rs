//! Output formatting utilities

use crate::aggregate::ComparisonReport;
use crate::error::Result;
use crate::introspect::TableDescription;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Human-readable rendering of reports
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print a one-line summary, for quiet mode
    pub fn print_summary(report: &ComparisonReport) {
        println!("overall_score={:.4}", report.overall_score);
        println!("similarity={:.4}", report.similarity);
    }

    pub fn render_report(report: &ComparisonReport) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = Self::write_report(&mut out, report);
        out
    }

    fn write_report(out: &mut String, report: &ComparisonReport) -> std::fmt::Result {
        writeln!(out, "🔍 Database Comparison: {} → {}", report.source_a, report.source_b)?;
        writeln!(
            out,
            "├─ Overall difference: {:.4} (0 = identical, 1 = completely different)",
            report.overall_score
        )?;
        writeln!(
            out,
            "├─ Similarity: {:.4} (1 = identical, 0 = completely different)",
            report.similarity
        )?;

        let presence = &report.presence;
        writeln!(out, "├─ Table presence: {:.4}", presence.score)?;
        writeln!(out, "│  ├─ Total tables: {}", presence.total_tables)?;
        writeln!(out, "│  ├─ Common tables: {}", presence.common_tables.len())?;
        writeln!(out, "│  ├─ Only in B: {}", join_or_none(&presence.missing_in_a))?;
        writeln!(out, "│  └─ Only in A: {}", join_or_none(&presence.missing_in_b))?;

        if report.tables.is_empty() {
            writeln!(out, "└─ No common tables to compare")?;
            return Ok(());
        }

        writeln!(out, "└─ Tables:")?;
        let count = report.tables.len();
        for (i, (name, table)) in report.tables.iter().enumerate() {
            let last = i == count - 1;
            let (branch, indent) = if last {
                ("   └─", "      ")
            } else {
                ("   ├─", "   │  ")
            };
            let marker = if table.fault.is_some() {
                "⚠️ "
            } else if table.structure.score == 0.0 && table.content.score == 0.0 {
                "✅"
            } else {
                "❌"
            };
            writeln!(out, "{} {} {}", branch, marker, name)?;

            if let Some(fault) = &table.fault {
                writeln!(out, "{}└─ Not compared: {}", indent, fault)?;
                continue;
            }

            let s = &table.structure;
            writeln!(out, "{}├─ Structure difference: {:.4}", indent, s.score)?;
            if !s.missing_in_a.is_empty() {
                let names = join(&s.missing_in_a);
                writeln!(out, "{}│  ├─ Columns only in B: {}", indent, names)?;
            }
            if !s.missing_in_b.is_empty() {
                let names = join(&s.missing_in_b);
                writeln!(out, "{}│  ├─ Columns only in A: {}", indent, names)?;
            }
            if !s.type_mismatches.is_empty() {
                let names = join(&s.type_mismatches);
                writeln!(out, "{}│  ├─ Type mismatches: {}", indent, names)?;
            }

            let c = &table.content;
            writeln!(out, "{}└─ Data difference: {:.4}", indent, c.score)?;
            writeln!(
                out,
                "{}   ├─ Rows: {} vs {} (difference {})",
                indent, c.rows_a, c.rows_b, c.row_count_diff
            )?;
            if c.no_common_columns {
                writeln!(out, "{}   └─ No common columns for data comparison", indent)?;
            } else {
                if !c.ununified_columns.is_empty() {
                    writeln!(
                        out,
                        "{}   ├─ Incomparable columns: {}",
                        indent,
                        c.ununified_columns.join(", ")
                    )?;
                }
                writeln!(
                    out,
                    "{}   └─ Content difference: {:.4} over {} rows{}",
                    indent,
                    c.content_diff_score,
                    c.rows_compared,
                    if c.sampled { " (sampled)" } else { "" }
                )?;
            }
        }
        Ok(())
    }

    /// Print the tables of one source
    pub fn print_inspection(label: &str, tables: &[TableDescription]) {
        println!("🗄️  {}", label);
        if tables.is_empty() {
            println!("└─ No tables found.");
            return;
        }
        for (i, table) in tables.iter().enumerate() {
            let last = i == tables.len() - 1;
            let (branch, indent) = if last { ("└─", "   ") } else { ("├─", "│  ") };
            println!("{} {} ({} rows)", branch, table.schema.table, table.row_count);
            let columns = table.schema.columns.values().collect::<Vec<_>>();
            for (j, column) in columns.iter().enumerate() {
                let prefix = if j == columns.len() - 1 { "└─" } else { "├─" };
                println!("{}{} {}: {}", indent, prefix, column.name, column.declared_type);
            }
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Report wrapped with the time it was rendered
    pub fn format_report(report: &ComparisonReport) -> Result<String> {
        let json = serde_json::json!({
            "generated": chrono::Utc::now(),
            "report": report,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

/// Writes rendered reports to files
pub struct OutputManager;

impl OutputManager {
    pub fn export(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        log::info!("Report saved to {}", path.display());
        Ok(())
    }
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn join_or_none(names: &BTreeSet<String>) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        join(names)
    }
}
