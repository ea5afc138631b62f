//! Checkpoint recording: one timestamped start or end sample per call
//!
//! A checkpoint captures the wall clock, the process resident-set size, and
//! the cumulative CPU time at the moment a test brackets a measured step.
//! Resource capture never fails a sampling call: if `getrusage` is
//! unavailable the usage fields are recorded as 0.

use chrono::Local;
use nix::sys::resource::{getrusage, UsageWho};

/// Whether a checkpoint opens or closes a measured step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Start,
    End,
}

/// A single start or end sample, transient and memory-only
#[derive(Debug, Clone)]
pub struct Checkpoint {
    /// Pair id: assigned at start time, propagated to the matching end.
    /// Empty for an end that never found its start.
    pub id: String,
    /// Owning test execution; concurrent tests never share an instance id
    pub instance_id: String,
    /// Step name as passed by the caller
    pub name: String,
    pub kind: StepKind,
    /// Wall clock, epoch milliseconds
    pub timestamp_ms: i64,
    /// Human-readable local time, informational only
    pub display_time: String,
    /// Resident-set size in bytes at capture time (0 if unavailable)
    pub memory_bytes: u64,
    /// Cumulative CPU time (user + system) in microseconds (0 if unavailable)
    pub cpu_micros: u64,
}

impl Checkpoint {
    /// Capture a checkpoint with the current wall clock and resource usage
    pub fn capture(kind: StepKind, id: String, name: &str, instance_id: &str) -> Self {
        let now = Local::now();
        Self {
            id,
            instance_id: instance_id.to_string(),
            name: name.to_string(),
            kind,
            timestamp_ms: now.timestamp_millis(),
            display_time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            memory_bytes: resident_memory_bytes(),
            cpu_micros: cpu_time_micros(),
        }
    }
}

/// Resident-set size of the current process in bytes, 0 if unavailable
pub fn resident_memory_bytes() -> u64 {
    match getrusage(UsageWho::RUSAGE_SELF) {
        // ru_maxrss is reported in kilobytes on Linux
        Ok(usage) => u64::try_from(usage.max_rss()).unwrap_or(0) * 1024,
        Err(_) => 0,
    }
}

/// Cumulative CPU time (user + system) of the current process in
/// microseconds, 0 if unavailable
pub fn cpu_time_micros() -> u64 {
    match getrusage(UsageWho::RUSAGE_SELF) {
        Ok(usage) => {
            let user = usage.user_time();
            let sys = usage.system_time();
            let total = (user.tv_sec() as i64 + sys.tv_sec() as i64) * 1_000_000
                + user.tv_usec() as i64
                + sys.tv_usec() as i64;
            u64::try_from(total).unwrap_or(0)
        }
        Err(_) => 0,
    }
}
