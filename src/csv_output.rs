//! CSV output for summary records
//!
//! Spreadsheet-friendly sibling of the JSON summary: one row per group,
//! header row from the field names, built by hand to keep the dependency
//! surface small.

use crate::analyzer::SummaryRecord;

const HEADER: &str = "name,brName,avgTime,sem,repeats,minValue,maxValue,\
earliestTime,latestTime,avgMemory,minMemory,maxMemory,avgCpu,minCpu,maxCpu";

/// Render summary records as CSV with a header row
pub fn render(summaries: &[SummaryRecord]) -> String {
    let mut output = String::new();
    output.push_str(HEADER);
    output.push('\n');

    for summary in summaries {
        output.push_str(&format_row(summary));
        output.push('\n');
    }

    output
}

/// Escape a CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_row(summary: &SummaryRecord) -> String {
    let fields = [
        escape_field(&summary.name),
        escape_field(&summary.execution_context),
        summary.avg_time.to_string(),
        summary.sem.to_string(),
        summary.repeats.to_string(),
        summary.min_value.to_string(),
        summary.max_value.to_string(),
        escape_field(&summary.earliest_time),
        escape_field(&summary.latest_time),
        summary.avg_memory.to_string(),
        summary.min_memory.to_string(),
        summary.max_memory.to_string(),
        summary.avg_cpu.to_string(),
        summary.min_cpu.to_string(),
        summary.max_cpu.to_string(),
    ];
    fields.join(",")
}
