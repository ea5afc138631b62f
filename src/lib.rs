//! Cronista - step-level performance measurement for concurrent test runs
//!
//! This library instruments test executions to measure wall-clock duration,
//! memory delta, and CPU-time delta between named checkpoints, pairs
//! repeated and concurrent samples correctly, persists matched records to a
//! shared append-only log, and aggregates them into summary statistics.

pub mod analyzer;
pub mod cache;
pub mod checkpoint;
pub mod cli;
pub mod console;
pub mod csv_output;
pub mod html_output;
pub mod id;
pub mod options;
pub mod record;
pub mod session;
pub mod stats;
pub mod store;
