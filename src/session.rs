//! Session lifecycle: the contract the host test runner drives
//!
//! One `PerfSession` lives per logical worker. The host calls
//! `initialize` before any sampling, `finalize_test` once per test
//! instance, and `analyze_results` once at worker shutdown; the session
//! never initiates those itself. Sampling calls are synchronous and touch
//! only the in-memory cache; storage I/O happens in `initialize`,
//! `finalize_test` (flush) and `analyze_results`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::analyzer::{AnalyzeFilters, Analyzer, SummaryRecord};
use crate::cache::PairingCache;
use crate::console::ConsoleReporter;
use crate::id::IdGenerator;
use crate::options::Options;
use crate::record::SessionMarker;
use crate::store::{self, LogStore};

/// Shared durable log file name inside the results directory
pub const LOG_FILE_NAME: &str = "performance-log.txt";

/// Per-worker measurement session
#[derive(Debug)]
pub struct PerfSession {
    instance_id: String,
    options: Options,
    store: LogStore,
    cache: PairingCache,
    results_dir: PathBuf,
}

impl PerfSession {
    /// Create a session with a fresh instance id. Call [`initialize`]
    /// before sampling.
    ///
    /// [`initialize`]: PerfSession::initialize
    pub fn new(options: Options) -> Self {
        Self {
            instance_id: IdGenerator::new().get_id_with_prefix("inst"),
            options,
            store: LogStore::new(),
            cache: PairingCache::new(),
            results_dir: PathBuf::from(store::DEFAULT_RESULTS_DIR),
        }
    }

    /// Prepare the results directory and write the session marker line.
    /// With `disable_append_to_existing_file` the log is truncated first,
    /// otherwise the marker appends to whatever is already there.
    pub fn initialize(&mut self) -> Result<()> {
        self.results_dir = store::ensure_results_dir(self.options.results_dir.as_deref())
            .context("failed to prepare results directory")?;

        let marker = SessionMarker {
            start_display_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            instance_id: self.instance_id.clone(),
        };
        let line = serde_json::to_string(&marker).context("failed to serialize session marker")?;

        let path = self.log_path();
        if self.options.disable_append_to_existing_file {
            self.store
                .write(&path, &format!("{line}\n"))
                .context("failed to reset performance log")?;
        } else {
            self.store
                .append_line(&path, &line)
                .context("failed to append session marker")?;
        }
        Ok(())
    }

    /// Open a checkpoint for `step_name`. Never fails, never blocks.
    pub fn sample_start(&mut self, step_name: &str) {
        self.cache.sample_start(step_name, &self.instance_id);
    }

    /// Close the oldest open checkpoint for `step_name`. Never fails,
    /// never blocks; without a matching start this silently records an
    /// orphan that produces no result.
    pub fn sample_end(&mut self, step_name: &str) {
        self.cache.sample_end(step_name, &self.instance_id);
    }

    /// Duration in milliseconds of the first resolved pair for
    /// `step_name`, 0.0 if none resolved yet
    pub fn get_sample_time(&self, step_name: &str) -> f64 {
        self.cache.get_sample_time(step_name)
    }

    /// Flush all matched pairs of the finished test to the shared log.
    /// Append failures drop individual records and are not fatal.
    pub fn finalize_test(&mut self, execution_context: &str, test_passed: bool) {
        let path = self.log_path();
        self.cache
            .flush(&self.store, &path, execution_context, test_passed);
    }

    /// Aggregate the full log, persist JSON/CSV/HTML summaries, print the
    /// console table, and return the summaries. An empty or fully
    /// filtered log reports nothing and returns an empty vec.
    pub fn analyze_results(&self, worker_index: usize) -> Vec<SummaryRecord> {
        let reporter = ConsoleReporter::new(self.options.suppress_console_results);
        let filters = AnalyzeFilters {
            drop_failed_tests: self.options.drop_results_from_failed_test,
            recent_days: self.options.recent_days,
            split_by_context: self.options.analyze_by_context,
        };
        let output_base = self.results_dir.join(&self.options.results_file_name);

        let summaries = Analyzer::new(self.store).analyze(&self.log_path(), &output_base, &filters);
        if summaries.is_empty() {
            return summaries;
        }

        let recent = if self.options.recent_days > 0.0 {
            format!("[recent days: {}]", self.options.recent_days)
        } else {
            String::new()
        };
        reporter.info(
            &format!("\nPerformance results{recent} (worker[{worker_index}]):\n"),
            false,
        );
        reporter.table(&summaries);
        reporter.info(
            &format!(
                "\nPerformance results saved to: {}.json/.csv/.html\n",
                output_base.display()
            ),
            true,
        );
        summaries
    }

    /// Path of the shared durable log
    pub fn log_path(&self) -> PathBuf {
        self.results_dir.join(LOG_FILE_NAME)
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }
}
