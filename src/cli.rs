//! CLI argument parsing for Cronista

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cronista")]
#[command(version)]
#[command(about = "Aggregate step-level performance measurements from test runs", long_about = None)]
pub struct Cli {
    /// Directory holding the performance log written by instrumented runs
    #[arg(
        short = 'd',
        long = "results-dir",
        value_name = "DIR",
        default_value = "performance-results"
    )]
    pub results_dir: String,

    /// Base name (no extension) for the summary output files
    #[arg(
        short = 'o',
        long = "output",
        value_name = "NAME",
        default_value = "performance-results"
    )]
    pub output: String,

    /// Only include records from the last N days (0 = no recency filter)
    #[arg(long = "recent-days", value_name = "DAYS", default_value = "0")]
    pub recent_days: f64,

    /// Exclude records from failed tests
    #[arg(long = "drop-failed")]
    pub drop_failed: bool,

    /// Group results by execution context as well as step name
    #[arg(long = "by-context")]
    pub by_context: bool,

    /// Suppress the console summary table
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}
