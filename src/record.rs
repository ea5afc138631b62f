//! Durable log records: one matched start/end pair per NDJSON line
//!
//! The log file is append-only. Records are immutable once written and are
//! never mutated or deleted, only filtered at read time by the analyzer.
//! Field names on the wire stay camelCase so logs written by older runs
//! keep parsing.

use crate::checkpoint::Checkpoint;
use serde::{Deserialize, Serialize};

/// A persisted, matched start/end pair with computed deltas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Pair id; required on read, lines without it are not records
    pub id: String,
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub name: String,
    /// Execution context the test ran under (e.g. a browser name)
    #[serde(rename = "brName", default)]
    pub execution_context: String,
    /// Start wall clock, epoch milliseconds
    #[serde(default)]
    pub start_time: i64,
    /// End wall clock, epoch milliseconds
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub start_display_time: String,
    /// `end_time - start_time`, milliseconds
    #[serde(default)]
    pub duration: i64,
    #[serde(default = "default_true")]
    pub is_test_passed: bool,
    #[serde(default)]
    pub start_memory_usage: u64,
    #[serde(default)]
    pub end_memory_usage: u64,
    /// End minus start resident-set size, bytes (may be negative)
    #[serde(default)]
    pub memory_difference: i64,
    #[serde(default)]
    pub start_cpu_usage: u64,
    #[serde(default)]
    pub end_cpu_usage: u64,
    /// End minus start cumulative CPU time, microseconds
    #[serde(default)]
    pub cpu_difference: i64,
}

fn default_true() -> bool {
    true
}

impl StepRecord {
    /// Build a durable record from a matched checkpoint pair
    pub fn from_pair(
        start: &Checkpoint,
        end: &Checkpoint,
        execution_context: &str,
        test_passed: bool,
    ) -> Self {
        Self {
            id: start.id.clone(),
            instance_id: start.instance_id.clone(),
            name: end.name.clone(),
            execution_context: execution_context.to_string(),
            start_time: start.timestamp_ms,
            end_time: end.timestamp_ms,
            start_display_time: start.display_time.clone(),
            duration: end.timestamp_ms - start.timestamp_ms,
            is_test_passed: test_passed,
            start_memory_usage: start.memory_bytes,
            end_memory_usage: end.memory_bytes,
            memory_difference: end.memory_bytes as i64 - start.memory_bytes as i64,
            start_cpu_usage: start.cpu_micros,
            end_cpu_usage: end.cpu_micros,
            cpu_difference: end.cpu_micros as i64 - start.cpu_micros as i64,
        }
    }
}

/// First line of a session: informational only, carries no `id` and is
/// skipped by the analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMarker {
    #[serde(rename = "startDisplayTime")]
    pub start_display_time: String,
    #[serde(rename = "instanceID")]
    pub instance_id: String,
}
