//! Progress notification for comparison runs

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::Duration;

/// Lifecycle of one comparison run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonPhase {
    Idle,
    Connected,
    SchemaCompared,
    DataCompared,
    Reported,
}

/// Notification emitted while a comparison runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ProgressEvent {
    Phase(ComparisonPhase),
    TablesDiscovered { common: usize, total: usize },
    TableStarted { table: String },
    TableFinished { table: String, structure_score: f64, data_score: f64 },
    TableFailed { table: String, message: String },
}

/// Receiver of progress events. Called from worker threads.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: &ProgressEvent);
}

/// Discards every event
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&self, _event: &ProgressEvent) {}
}

/// Forwards events to another thread; a closed receiver is ignored
impl ProgressSink for Mutex<Sender<ProgressEvent>> {
    fn notify(&self, event: &ProgressEvent) {
        let sender = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = sender.send(event.clone());
    }
}

/// Terminal progress bars for the CLI
#[derive(Debug)]
pub struct ProgressReporter {
    multi: MultiProgress,
    schema_pb: Mutex<Option<ProgressBar>>,
    tables_pb: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new_for_compare() -> Self {
        let multi = MultiProgress::new();
        let schema_pb = multi.add(create_spinner("Reading schemas..."));
        Self {
            multi,
            schema_pb: Mutex::new(Some(schema_pb)),
            tables_pb: Mutex::new(None),
        }
    }

    fn finish_schema(&self, message: &str) {
        if let Some(pb) = lock(&self.schema_pb).take() {
            pb.finish_with_message(message.to_string());
        }
    }

    fn start_tables(&self, total: u64) {
        let pb = self.multi.add(create_progress_bar(total, "Comparing tables"));
        *lock(&self.tables_pb) = Some(pb);
    }

    fn with_tables_pb(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(pb) = lock(&self.tables_pb).as_ref() {
            f(pb);
        }
    }

    fn finish_tables(&self, message: &str) {
        if let Some(pb) = lock(&self.tables_pb).take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl ProgressSink for ProgressReporter {
    fn notify(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::TablesDiscovered { common, total } => {
                self.finish_schema(&format!("{} tables found, {} in common", total, common));
                self.start_tables(*common as u64);
            }
            ProgressEvent::TableStarted { table } => {
                self.with_tables_pb(|pb| pb.set_message(table.clone()));
            }
            ProgressEvent::TableFinished { .. } => self.with_tables_pb(|pb| pb.inc(1)),
            ProgressEvent::TableFailed { table, .. } => {
                self.with_tables_pb(|pb| {
                    pb.println(format!("⚠️  Table '{}' could not be compared", table));
                    pb.inc(1);
                });
            }
            ProgressEvent::Phase(ComparisonPhase::DataCompared) => {
                self.finish_tables("Tables compared");
            }
            ProgressEvent::Phase(_) => {}
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        // Ensure all progress bars are cleaned up silently
        if let Some(pb) = lock(&self.schema_pb).take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = lock(&self.tables_pb).take() {
            pb.finish_and_clear();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
