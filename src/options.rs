//! Configuration surface consumed by a session
//!
//! Constructed once by the host and passed into the session; nothing here
//! is read from ambient global state. Serde aliases keep the field names
//! used by existing host configurations working.

use serde::{Deserialize, Serialize};

/// Session configuration, all fields optional with defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Overwrite the existing log at initialize time instead of appending
    pub disable_append_to_existing_file: bool,
    /// Exclude records from failed tests when analyzing
    pub drop_results_from_failed_test: bool,
    /// Split analysis groups by execution context (e.g. browser)
    #[serde(alias = "analyzeByBrowser")]
    pub analyze_by_context: bool,
    /// Results directory; illegal or missing values fall back to
    /// `performance-results`
    #[serde(alias = "performanceResultsDirectoryName")]
    pub results_dir: Option<String>,
    /// Base name (no extension) for the summary output files
    #[serde(alias = "performanceResultsFileName")]
    pub results_file_name: String,
    /// Silence the console table (mandatory messages still print)
    pub suppress_console_results: bool,
    /// Only analyze records from the last N days; 0 means no recency filter
    pub recent_days: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            disable_append_to_existing_file: false,
            drop_results_from_failed_test: false,
            analyze_by_context: false,
            results_dir: None,
            results_file_name: "performance-results".to_string(),
            suppress_console_results: false,
            recent_days: 0.0,
        }
    }
}
