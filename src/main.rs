use std::path::Path;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cronista::analyzer::{AnalyzeFilters, Analyzer};
use cronista::cli::Cli;
use cronista::console::ConsoleReporter;
use cronista::session::LOG_FILE_NAME;
use cronista::store::LogStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let results_dir = Path::new(&cli.results_dir);
    let log_path = results_dir.join(LOG_FILE_NAME);
    if !log_path.exists() {
        bail!("no performance log at {}", log_path.display());
    }

    let filters = AnalyzeFilters {
        drop_failed_tests: cli.drop_failed,
        recent_days: cli.recent_days,
        split_by_context: cli.by_context,
    };
    let output_base = results_dir.join(&cli.output);
    let summaries = Analyzer::new(LogStore::new()).analyze(&log_path, &output_base, &filters);

    let reporter = ConsoleReporter::new(cli.quiet);
    if summaries.is_empty() {
        reporter.info("No performance records to report.", false);
        return Ok(());
    }

    let recent = if cli.recent_days > 0.0 {
        format!(" [recent days: {}]", cli.recent_days)
    } else {
        String::new()
    };
    reporter.info(&format!("\nPerformance results{recent}:\n"), false);
    reporter.table(&summaries);
    reporter.info(
        &format!(
            "\nPerformance results saved to: {}.json/.csv/.html\n",
            output_base.display()
        ),
        true,
    );
    Ok(())
}
