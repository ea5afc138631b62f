//! Log aggregation: filters, grouping, and per-step summary statistics
//!
//! The analyzer reads the whole durable log, drops what the filters say to
//! drop, groups the surviving records by step name (optionally also by
//! execution context), and computes one summary per group. Groups keep the
//! first-seen order of distinct keys and record order within a group follows
//! log arrival order, so earliest/latest display times mirror the log, not a
//! re-sort by time.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::csv_output;
use crate::html_output;
use crate::record::StepRecord;
use crate::stats;
use crate::store::LogStore;

/// Execution context reported when grouping does not split by context
pub const GENERAL_CONTEXT: &str = "general";

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Read-time filters. Both filters apply independently; a record must pass
/// every enabled filter to survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeFilters {
    /// Drop records whose test did not pass
    pub drop_failed_tests: bool,
    /// Drop records older than this many days (0 disables the filter)
    pub recent_days: f64,
    /// Group by (name, execution context) instead of name alone
    pub split_by_context: bool,
}

/// Aggregated statistics for one group of step records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub name: String,
    #[serde(rename = "brName")]
    pub execution_context: String,
    /// Mean duration, milliseconds
    pub avg_time: f64,
    /// Standard error of the mean duration
    pub sem: f64,
    /// Number of records in the group
    pub repeats: usize,
    pub min_value: f64,
    pub max_value: f64,
    /// Display time of the first record in log order
    pub earliest_time: String,
    /// Display time of the last record in log order
    pub latest_time: String,
    /// Memory delta statistics, megabytes
    pub avg_memory: f64,
    pub min_memory: f64,
    pub max_memory: f64,
    /// CPU delta statistics, milliseconds
    pub avg_cpu: f64,
    pub min_cpu: f64,
    pub max_cpu: f64,
}

/// Reads the durable log and derives summary records
#[derive(Debug, Default, Clone, Copy)]
pub struct Analyzer {
    store: LogStore,
}

impl Analyzer {
    pub fn new(store: LogStore) -> Self {
        Self { store }
    }

    /// Run the full pipeline: load, filter, group, summarize, persist.
    ///
    /// Persists `<output_base>.json`, `.csv`, and `.html` unless the result
    /// set is empty, in which case nothing is written. Every failure along
    /// the way degrades to fewer (or no) results; none is fatal.
    pub fn analyze(
        &self,
        log_path: &Path,
        output_base: &Path,
        filters: &AnalyzeFilters,
    ) -> Vec<SummaryRecord> {
        let records = self.load_records(log_path);
        let records = apply_filters(records, filters, Utc::now().timestamp_millis());
        let summaries = summarize(&records, filters.split_by_context);
        if !summaries.is_empty() {
            self.persist(&summaries, output_base);
        }
        summaries
    }

    /// Parse the log, one record per line. Unparseable lines and lines
    /// without an `id` (the session marker) are skipped; an unreadable log
    /// yields no records.
    pub fn load_records(&self, log_path: &Path) -> Vec<StepRecord> {
        let lines = match self.store.read_lines(log_path) {
            Ok(lines) => lines,
            Err(err) => {
                tracing::warn!(%err, "performance log unreadable, nothing to analyze");
                return Vec::new();
            }
        };

        lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<StepRecord>(line).ok())
            .collect()
    }

    fn persist(&self, summaries: &[SummaryRecord], output_base: &Path) {
        let json_path = output_base.with_extension("json");
        match serde_json::to_string(summaries) {
            Ok(json) => {
                if let Err(err) = self.store.write(&json_path, &json) {
                    tracing::warn!(%err, "failed to write JSON summary");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize summaries"),
        }

        let csv_path = output_base.with_extension("csv");
        if let Err(err) = self.store.write(&csv_path, &csv_output::render(summaries)) {
            tracing::warn!(%err, "failed to write CSV summary");
        }

        let html_path = output_base.with_extension("html");
        if let Err(err) = self.store.write(&html_path, &html_output::render(summaries)) {
            tracing::warn!(%err, "failed to write HTML report");
        }
    }
}

/// Apply the recency and failed-test filters. Filters compose: a record
/// must pass both to remain.
pub fn apply_filters(
    records: Vec<StepRecord>,
    filters: &AnalyzeFilters,
    now_ms: i64,
) -> Vec<StepRecord> {
    let cutoff_ms = now_ms - (filters.recent_days * MILLIS_PER_DAY) as i64;
    records
        .into_iter()
        .filter(|r| filters.recent_days <= 0.0 || r.start_time >= cutoff_ms)
        .filter(|r| !filters.drop_failed_tests || r.is_test_passed)
        .collect()
}

/// Group records and compute one summary per group. Grouping is stable:
/// first-seen key order, record order preserved within a group.
pub fn summarize(records: &[StepRecord], split_by_context: bool) -> Vec<SummaryRecord> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<&StepRecord>> = HashMap::new();

    for record in records {
        let context = if split_by_context {
            record.execution_context.clone()
        } else {
            GENERAL_CONTEXT.to_string()
        };
        let key = (record.name.clone(), context);
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key.clone());
                Vec::new()
            })
            .push(record);
    }

    order
        .iter()
        .map(|key| {
            // Every key in `order` has a group by construction
            let group = &groups[key];
            summarize_group(&key.0, &key.1, group)
        })
        .collect()
}

fn summarize_group(name: &str, context: &str, group: &[&StepRecord]) -> SummaryRecord {
    let durations: Vec<f64> = group.iter().map(|r| r.duration as f64).collect();
    let memory: Vec<f64> = group.iter().map(|r| r.memory_difference as f64).collect();
    let cpu: Vec<f64> = group.iter().map(|r| r.cpu_difference as f64).collect();

    SummaryRecord {
        name: name.to_string(),
        execution_context: context.to_string(),
        avg_time: stats::round2(stats::mean(&durations)),
        sem: stats::round2(stats::standard_error(&durations)),
        repeats: group.len(),
        min_value: stats::min(&durations),
        max_value: stats::max(&durations),
        earliest_time: group
            .first()
            .map(|r| r.start_display_time.clone())
            .unwrap_or_default(),
        latest_time: group
            .last()
            .map(|r| r.start_display_time.clone())
            .unwrap_or_default(),
        avg_memory: stats::bytes_to_mb(stats::mean(&memory)),
        min_memory: stats::bytes_to_mb(stats::min(&memory)),
        max_memory: stats::bytes_to_mb(stats::max(&memory)),
        avg_cpu: stats::micros_to_ms(stats::mean(&cpu)),
        min_cpu: stats::micros_to_ms(stats::min(&cpu)),
        max_cpu: stats::micros_to_ms(stats::max(&cpu)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(name: &str, context: &str, duration: i64, passed: bool) -> StepRecord {
        StepRecord {
            id: format!("id-{name}-{duration}"),
            instance_id: "inst-1".to_string(),
            name: name.to_string(),
            execution_context: context.to_string(),
            start_time: 1_000_000,
            end_time: 1_000_000 + duration,
            start_display_time: format!("t-{duration}"),
            duration,
            is_test_passed: passed,
            start_memory_usage: 0,
            end_memory_usage: 0,
            memory_difference: duration * 1024,
            start_cpu_usage: 0,
            end_cpu_usage: 0,
            cpu_difference: duration * 10,
        }
    }

    #[test]
    fn test_summarize_single_group_example() {
        let records = vec![record("A", "", 100, true), record("A", "", 200, true)];
        let summaries = summarize(&records, false);

        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.name, "A");
        assert_eq!(s.execution_context, "general");
        assert_eq!(s.avg_time, 150.0);
        assert_eq!(s.sem, 50.0);
        assert_eq!(s.repeats, 2);
        assert_eq!(s.min_value, 100.0);
        assert_eq!(s.max_value, 200.0);
    }

    #[test]
    fn test_summarize_single_record_sem_is_zero() {
        let summaries = summarize(&[record("A", "", 100, true)], false);
        assert_eq!(summaries[0].sem, 0.0);
        assert_eq!(summaries[0].repeats, 1);
    }

    #[test]
    fn test_summarize_preserves_first_seen_group_order() {
        let records = vec![
            record("B", "", 10, true),
            record("A", "", 20, true),
            record("B", "", 30, true),
        ];
        let summaries = summarize(&records, false);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "B");
        assert_eq!(summaries[1].name, "A");
    }

    #[test]
    fn test_earliest_and_latest_follow_log_order() {
        let records = vec![record("A", "", 300, true), record("A", "", 100, true)];
        let summaries = summarize(&records, false);
        // Not re-sorted by time: first/last in arrival order
        assert_eq!(summaries[0].earliest_time, "t-300");
        assert_eq!(summaries[0].latest_time, "t-100");
    }

    #[test]
    fn test_split_by_context_groups_separately() {
        let records = vec![
            record("A", "chromium", 100, true),
            record("A", "firefox", 300, true),
        ];
        let split = summarize(&records, true);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].execution_context, "chromium");
        assert_eq!(split[1].execution_context, "firefox");

        let merged = summarize(&records, false);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].execution_context, "general");
        assert_eq!(merged[0].avg_time, 200.0);
    }

    #[test]
    fn test_memory_and_cpu_conversions() {
        // 1 MiB and 2 MiB deltas; 10_000 us and 20_000 us CPU
        let mut a = record("A", "", 0, true);
        a.memory_difference = 1024 * 1024;
        a.cpu_difference = 10_000;
        let mut b = record("A", "", 0, true);
        b.memory_difference = 2 * 1024 * 1024;
        b.cpu_difference = 20_000;

        let s = &summarize(&[a, b], false)[0];
        assert_eq!(s.avg_memory, 1.5);
        assert_eq!(s.min_memory, 1.0);
        assert_eq!(s.max_memory, 2.0);
        assert_eq!(s.avg_cpu, 15.0);
        assert_eq!(s.min_cpu, 10.0);
        assert_eq!(s.max_cpu, 20.0);
    }

    #[test]
    fn test_drop_failed_filter() {
        let records = vec![record("A", "", 10, true), record("A", "", 999, false)];
        let filters = AnalyzeFilters {
            drop_failed_tests: true,
            ..Default::default()
        };
        let filtered = apply_filters(records, &filters, 2_000_000);
        assert_eq!(filtered.len(), 1);
        let s = &summarize(&filtered, false)[0];
        assert_eq!(s.avg_time, 10.0);
    }

    #[test]
    fn test_recent_days_filter() {
        let now_ms = 10 * 86_400_000;
        let mut old = record("A", "", 10, true);
        old.start_time = now_ms - 3 * 86_400_000; // 3 days old
        let mut fresh = record("A", "", 20, true);
        fresh.start_time = now_ms - 3_600_000; // 1 hour old

        let filters = AnalyzeFilters {
            recent_days: 1.0,
            ..Default::default()
        };
        let filtered = apply_filters(vec![old, fresh], &filters, now_ms);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].duration, 20);
    }

    #[test]
    fn test_filters_compose() {
        let now_ms = 10 * 86_400_000;
        let mut old_passed = record("A", "", 1, true);
        old_passed.start_time = now_ms - 2 * 86_400_000;
        let mut fresh_failed = record("A", "", 2, false);
        fresh_failed.start_time = now_ms - 1_000;
        let mut fresh_passed = record("A", "", 3, true);
        fresh_passed.start_time = now_ms - 2_000;

        let filters = AnalyzeFilters {
            drop_failed_tests: true,
            recent_days: 1.0,
            ..Default::default()
        };
        let filtered = apply_filters(vec![old_passed, fresh_failed, fresh_passed], &filters, now_ms);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].duration, 3);
    }

    #[test]
    fn test_zero_recent_days_keeps_everything() {
        let mut ancient = record("A", "", 1, true);
        ancient.start_time = 0;
        let filtered = apply_filters(vec![ancient], &AnalyzeFilters::default(), i64::MAX);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_load_records_skips_markers_and_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let store = LogStore::new();
        store
            .append_line(
                &path,
                r#"{"startDisplayTime":"2026-01-01 10:00:00","instanceID":"inst-1"}"#,
            )
            .unwrap();
        store
            .append_line(&path, &serde_json::to_string(&record("A", "", 5, true)).unwrap())
            .unwrap();
        store.append_line(&path, "{not json at all").unwrap();
        store.append_line(&path, "").unwrap();

        let records = Analyzer::new(store).load_records(&path);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "A");
    }

    #[test]
    fn test_analyze_empty_log_yields_no_summaries_and_no_output() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("log.txt");
        let base = dir.path().join("results");
        let store = LogStore::new();
        store.append_line(&log, "").unwrap();

        let summaries = Analyzer::new(store).analyze(&log, &base, &AnalyzeFilters::default());
        assert!(summaries.is_empty());
        assert!(!base.with_extension("json").exists());
        assert!(!base.with_extension("csv").exists());
    }

    #[test]
    fn test_analyze_missing_log_is_empty_not_error() {
        let dir = tempdir().unwrap();
        let summaries = Analyzer::new(LogStore::new()).analyze(
            &dir.path().join("absent.txt"),
            &dir.path().join("results"),
            &AnalyzeFilters::default(),
        );
        assert!(summaries.is_empty());
    }

    #[test]
    fn test_analyze_persists_all_three_outputs() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("log.txt");
        let base = dir.path().join("results");
        let store = LogStore::new();
        for r in [record("A", "", 100, true), record("A", "", 200, true)] {
            store
                .append_line(&log, &serde_json::to_string(&r).unwrap())
                .unwrap();
        }

        let summaries = Analyzer::new(store).analyze(&log, &base, &AnalyzeFilters::default());
        assert_eq!(summaries.len(), 1);
        assert!(base.with_extension("json").exists());
        assert!(base.with_extension("csv").exists());
        assert!(base.with_extension("html").exists());

        let json = std::fs::read_to_string(base.with_extension("json")).unwrap();
        let parsed: Vec<SummaryRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summaries);
    }

    #[test]
    fn test_summary_wire_field_names() {
        let s = &summarize(&[record("A", "ctx", 100, true)], true)[0];
        let json = serde_json::to_string(s).unwrap();
        assert!(json.contains("\"brName\":\"ctx\""));
        assert!(json.contains("\"avgTime\""));
        assert!(json.contains("\"minValue\""));
        assert!(json.contains("\"earliestTime\""));
        assert!(json.contains("\"avgMemory\""));
        assert!(json.contains("\"avgCpu\""));
    }
}
