//! Human-readable output: console summary and markdown performance report

use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::Local;

use crate::aggregate::AggregateRow;
use crate::result::BenchmarkResult;

/// Width of the longest bar in the report chart
const BAR_WIDTH: usize = 40;

/// One line per `(corpus, strategy)` pair, taken from its first run
pub fn summary_lines(results: &[BenchmarkResult]) -> Vec<String> {
    let mut seen = HashSet::new();

    results
        .iter()
        .filter(|r| seen.insert(r.key()))
        .map(|r| {
            format!(
                "{} - {}: {} occurrences in {} ms",
                r.corpus_name, r.strategy_label, r.occurrences, r.elapsed_ms
            )
        })
        .collect()
}

/// Markdown report of mean times with a text bar chart
pub fn render_markdown(rows: &[AggregateRow]) -> String {
    let mut report = String::new();

    report.push_str("# Mean Time per Corpus and Strategy\n\n");
    let _ = writeln!(report, "**Generated:** {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));

    report.push_str("## Summary Table\n\n");
    report.push_str("| Corpus | Strategy | Mean (ms) | Samples | Occurrences |\n");
    report.push_str("|--------|----------|-----------|---------|-------------|\n");
    for row in rows {
        let _ = writeln!(
            report,
            "| {} | {} | {:.2} | {} | {} |",
            row.corpus_name, row.strategy_label, row.mean_ms, row.samples, row.example_occurrences
        );
    }

    report.push_str("\n## Mean Time (ms)\n\n```text\n");
    report.push_str(&bar_chart(rows));
    report.push_str("```\n");

    report
}

/// Horizontal bars labelled `corpus | strategy`, scaled to the largest mean
pub fn bar_chart(rows: &[AggregateRow]) -> String {
    let labels: Vec<String> = rows
        .iter()
        .map(|r| format!("{} | {}", r.corpus_name, r.strategy_label))
        .collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);
    let max_mean = rows.iter().map(|r| r.mean_ms).fold(0.0_f64, f64::max);

    let mut chart = String::new();
    for (label, row) in labels.iter().zip(rows) {
        let len = if max_mean > 0.0 {
            ((row.mean_ms / max_mean) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            chart,
            "{:<width$} {} {:.2}",
            label,
            "#".repeat(len),
            row.mean_ms,
            width = label_width
        );
    }
    chart
}
