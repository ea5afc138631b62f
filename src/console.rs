//! Console reporting for analysis results
//!
//! Prints the summary table and progress messages. Output can be
//! suppressed by configuration; messages flagged mandatory print anyway.

use crate::analyzer::SummaryRecord;

/// Prints analysis output unless suppressed
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    suppress: bool,
}

impl ConsoleReporter {
    pub fn new(suppress: bool) -> Self {
        Self { suppress }
    }

    /// Print a message; `mandatory` bypasses suppression
    pub fn info(&self, message: &str, mandatory: bool) {
        if !self.suppress || mandatory {
            println!("{message}");
        }
    }

    /// Print the summary table
    pub fn table(&self, summaries: &[SummaryRecord]) {
        if !self.suppress {
            print!("{}", render_table(summaries));
        }
    }
}

/// Render the summaries as an aligned text table
pub fn render_table(summaries: &[SummaryRecord]) -> String {
    let name_width = summaries
        .iter()
        .map(|s| s.name.len())
        .chain(std::iter::once("step".len()))
        .max()
        .unwrap_or(4);
    let ctx_width = summaries
        .iter()
        .map(|s| s.execution_context.len())
        .chain(std::iter::once("context".len()))
        .max()
        .unwrap_or(7);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<name_width$}  {:<ctx_width$}  {:>10}  {:>8}  {:>7}  {:>10}  {:>10}  {:>9}  {:>9}\n",
        "step", "context", "avg ms", "sem", "samples", "min ms", "max ms", "mem MB", "cpu ms",
    ));
    out.push_str(&format!(
        "{}  {}  {}  {}  {}  {}  {}  {}  {}\n",
        "-".repeat(name_width),
        "-".repeat(ctx_width),
        "-".repeat(10),
        "-".repeat(8),
        "-".repeat(7),
        "-".repeat(10),
        "-".repeat(10),
        "-".repeat(9),
        "-".repeat(9),
    ));

    for s in summaries {
        out.push_str(&format!(
            "{:<name_width$}  {:<ctx_width$}  {:>10.2}  {:>8.2}  {:>7}  {:>10.2}  {:>10.2}  {:>9.2}  {:>9.2}\n",
            s.name,
            s.execution_context,
            s.avg_time,
            s.sem,
            s.repeats,
            s.min_value,
            s.max_value,
            s.avg_memory,
            s.avg_cpu,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> SummaryRecord {
        SummaryRecord {
            name: name.to_string(),
            execution_context: "general".to_string(),
            avg_time: 150.0,
            sem: 50.0,
            repeats: 2,
            min_value: 100.0,
            max_value: 200.0,
            earliest_time: String::new(),
            latest_time: String::new(),
            avg_memory: 1.5,
            min_memory: 1.0,
            max_memory: 2.0,
            avg_cpu: 15.0,
            min_cpu: 10.0,
            max_cpu: 20.0,
        }
    }

    #[test]
    fn test_table_has_header_separator_and_rows() {
        let table = render_table(&[summary("login"), summary("checkout")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("step"));
        assert!(lines[0].contains("avg ms"));
        assert!(lines[1].starts_with('-'));
        assert!(lines[2].starts_with("login"));
        assert!(lines[3].starts_with("checkout"));
    }

    #[test]
    fn test_table_aligns_to_longest_name() {
        let table = render_table(&[summary("a-rather-long-step-name")]);
        let header = table.lines().next().unwrap();
        assert!(header.starts_with("step"));
        // Context column starts after the longest name plus two spaces
        assert!(header.contains("context"));
    }

    #[test]
    fn test_table_formats_values() {
        let table = render_table(&[summary("x")]);
        assert!(table.contains("150.00"));
        assert!(table.contains("50.00"));
    }

    #[test]
    fn test_empty_table_is_header_only() {
        let table = render_table(&[]);
        assert_eq!(table.lines().count(), 2);
    }
}
