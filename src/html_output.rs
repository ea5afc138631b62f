//! Standalone HTML report for summary records
//!
//! Renders the summary set as a single self-contained page: a bar chart of
//! average durations (bars scaled against the slowest step, colored per
//! execution context) and a full statistics table. No external assets.

use chrono::Local;

use crate::analyzer::SummaryRecord;

/// Render summary records as a standalone HTML page
pub fn render(summaries: &[SummaryRecord]) -> String {
    let mut sorted: Vec<&SummaryRecord> = summaries.iter().collect();
    sorted.sort_by(|a, b| {
        b.avg_time
            .partial_cmp(&a.avg_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let max_avg = sorted.first().map(|s| s.avg_time).unwrap_or(0.0);
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>Performance Results - {timestamp}</title>\n"
    ));
    html.push_str("<style>");
    html.push_str(styles());
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(&format!("<h1>Performance Results - {timestamp}</h1>\n"));

    html.push_str("<h2>Average Duration (ms)</h2>\n<div class=\"chart\">\n");
    for summary in &sorted {
        html.push_str(&format_bar(summary, max_avg));
    }
    html.push_str("</div>\n");

    html.push_str("<h2>Details</h2>\n");
    html.push_str(&format_table(&sorted));
    html.push_str("</body>\n</html>\n");
    html
}

/// Escape HTML special characters
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Bar color per execution context, matching the browser palette the chart
/// has always used; anything else gets the fallback color
fn context_color(context: &str) -> &'static str {
    match context {
        "chromium" => "rgba(66, 133, 244, 0.6)",
        "firefox" => "rgba(255, 99, 71, 0.6)",
        "webkit" => "rgba(76, 175, 80, 0.6)",
        _ => "rgba(152, 251, 152, 0.6)",
    }
}

fn format_bar(summary: &SummaryRecord, max_avg: f64) -> String {
    let percent = if max_avg > 0.0 {
        (summary.avg_time / max_avg * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    format!(
        "<div class=\"bar-row\"><span class=\"bar-label\">{} ({})</span>\
<div class=\"bar\" style=\"width:{:.1}%;background-color:{}\">\
{:.2} &plusmn; {:.2}</div></div>\n",
        escape_html(&summary.name),
        escape_html(&summary.execution_context),
        percent,
        context_color(&summary.execution_context),
        summary.avg_time,
        summary.sem,
    )
}

fn format_table(sorted: &[&SummaryRecord]) -> String {
    let mut table = String::from(
        "<table>\n<tr><th>Step</th><th>Context</th><th>Avg (ms)</th><th>SEM</th>\
<th>Samples</th><th>Min</th><th>Max</th><th>Avg Mem (MB)</th><th>Avg CPU (ms)</th>\
<th>Earliest</th><th>Latest</th></tr>\n",
    );
    for s in sorted {
        table.push_str(&format!(
            "<tr><td class=\"step\">{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td>\
<td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&s.name),
            escape_html(&s.execution_context),
            s.avg_time,
            s.sem,
            s.repeats,
            s.min_value,
            s.max_value,
            s.avg_memory,
            s.avg_cpu,
            escape_html(&s.earliest_time),
            escape_html(&s.latest_time),
        ));
    }
    table.push_str("</table>\n");
    table
}

fn styles() -> &'static str {
    r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        .chart {
            background-color: white;
            padding: 16px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        .bar-row {
            margin: 6px 0;
        }
        .bar-label {
            display: inline-block;
            width: 260px;
            font-family: monospace;
            vertical-align: middle;
        }
        .bar {
            display: inline-block;
            min-width: 2px;
            padding: 2px 6px;
            color: #222;
            font-family: monospace;
            vertical-align: middle;
        }
        table {
            border-collapse: collapse;
            width: 100%;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 8px;
            text-align: left;
        }
        th {
            background-color: #4a90d9;
            color: white;
            font-weight: bold;
        }
        tr:nth-child(even) {
            background-color: #f9f9f9;
        }
        .step {
            color: #0066cc;
            font-weight: bold;
            font-family: monospace;
        }
    "#
}
