//! Aggregation of the result table
//!
//! Reads `Arquivo,Metodo,Ocorrencias,Tempo_ms` rows leniently, groups them by
//! `(corpus, strategy)` and produces the mean time, sample count and an
//! example occurrence count per group. Malformed rows are skipped with a
//! warning naming their line.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{BufRead, BufReader, Read};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::result::BenchmarkResult;
use crate::sink::parse_row;

/// Header row of the aggregate table
pub const AGGREGATE_HEADER: &str = "Arquivo,Metodo,TempoMedio_ms,Amostras,Ocorrencias_exemplo";

/// Summary of every run sharing a `(corpus, strategy)` key
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub corpus_name: String,
    pub strategy_label: String,
    pub mean_ms: f64,
    pub samples: usize,
    /// Occurrence count of the last run seen for this key
    pub example_occurrences: u64,
}

#[derive(Default)]
struct Accumulator {
    total_ms: u128,
    samples: usize,
    occurrences: u64,
}

/// Aggregated rows, sorted by `(corpus, strategy)`
pub fn aggregate(results: &[BenchmarkResult]) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<(&str, &str), Accumulator> = BTreeMap::new();

    for r in results {
        let acc = groups.entry(r.key()).or_default();
        acc.total_ms += u128::from(r.elapsed_ms);
        acc.samples += 1;
        acc.occurrences = r.occurrences;
    }

    groups
        .into_iter()
        .map(|((corpus, strategy), acc)| AggregateRow {
            corpus_name: corpus.to_string(),
            strategy_label: strategy.to_string(),
            mean_ms: acc.total_ms as f64 / acc.samples as f64,
            samples: acc.samples,
            example_occurrences: acc.occurrences,
        })
        .collect()
}

/// Leniently read a result table, skipping malformed rows
///
/// The first line is taken as the header and not validated. Blank lines are
/// ignored. Fails only on I/O errors or a completely empty input.
pub fn read_lenient(reader: impl Read) -> Result<Vec<BenchmarkResult>> {
    let mut lines = BufReader::new(reader).lines();

    match lines.next() {
        Some(header) => {
            header.context("Failed to read header")?;
        }
        None => anyhow::bail!("Result table is empty"),
    }

    let mut results = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line.context("Failed to read row")?;
        let line_number = idx + 2;
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(&line, line_number) {
            Ok(result) => results.push(result),
            Err(e) => log::warn!("Skipping malformed row ({}): {}", e, line),
        }
    }

    Ok(results)
}

/// Read a result table and aggregate it. Errors when no valid row remains.
pub fn aggregate_table(reader: impl Read) -> Result<Vec<AggregateRow>> {
    let results = read_lenient(reader)?;
    let rows = aggregate(&results);
    if rows.is_empty() {
        anyhow::bail!("No aggregated data; check the result table");
    }
    Ok(rows)
}

/// Render aggregate rows as CSV text, header included
pub fn render_aggregate_csv(rows: &[AggregateRow]) -> String {
    let mut out = String::from(AGGREGATE_HEADER);
    out.push('\n');
    for row in rows {
        let _ = writeln!(
            out,
            "{},{},{:.2},{},{}",
            row.corpus_name, row.strategy_label, row.mean_ms, row.samples, row.example_occurrences
        );
    }
    out
}
