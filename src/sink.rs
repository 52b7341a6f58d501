//! Result sinks and the result CSV format
//!
//! The result table has the header `Arquivo,Metodo,Ocorrencias,Tempo_ms` and
//! one row per run. Values are not quoted; commas in the corpus name are
//! replaced with `_` so the column count stays fixed.

use std::fmt::Write as _;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::result::BenchmarkResult;

/// Header row of the result table
pub const RESULTS_HEADER: &str = "Arquivo,Metodo,Ocorrencias,Tempo_ms";

/// Consumer of the ordered result list produced by a benchmark run
pub trait ResultSink {
    fn consume(&mut self, results: &[BenchmarkResult]) -> Result<()>;
}

/// A row of the result table that could not be parsed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("line {line}: expected at least 4 columns, found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("line {line}: invalid number in column {column}: '{value}'")]
    Number {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Render results as CSV text, header included
pub fn render_csv(results: &[BenchmarkResult]) -> String {
    let mut out = String::from(RESULTS_HEADER);
    out.push('\n');
    for r in results {
        let _ = writeln!(
            out,
            "{},{},{},{}",
            r.corpus_name.replace(',', "_"),
            r.strategy_label,
            r.occurrences,
            r.elapsed_ms
        );
    }
    out
}

/// Parse one data row. `line` is the 1-based line number used in errors.
pub fn parse_row(row: &str, line: usize) -> Result<BenchmarkResult, RowError> {
    let parts: Vec<&str> = row.split(',').collect();
    if parts.len() < 4 {
        return Err(RowError::ColumnCount {
            line,
            found: parts.len(),
        });
    }

    let number = |column: &'static str, value: &str| {
        value.trim().parse::<u64>().map_err(|_| RowError::Number {
            line,
            column,
            value: value.trim().to_string(),
        })
    };

    Ok(BenchmarkResult {
        corpus_name: parts[0].trim().to_string(),
        strategy_label: parts[1].trim().to_string(),
        occurrences: number("Ocorrencias", parts[2])?,
        elapsed_ms: number("Tempo_ms", parts[3])?,
    })
}

/// Strictly read a result table: any malformed row is an error
pub fn read_results(reader: impl Read) -> Result<Vec<BenchmarkResult>> {
    let mut lines = BufReader::new(reader).lines();

    match lines.next() {
        Some(header) => {
            let header = header.context("Failed to read result header")?;
            if header.trim() != RESULTS_HEADER {
                anyhow::bail!("Unexpected result header: '{}'", header);
            }
        }
        None => anyhow::bail!("Result table is empty"),
    }

    let mut results = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line.context("Failed to read result row")?;
        if line.trim().is_empty() {
            continue;
        }
        results.push(parse_row(&line, idx + 2)?);
    }
    Ok(results)
}

/// Writes the result table to a file, replacing any previous content
#[derive(Clone, Debug)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvSink {
    fn consume(&mut self, results: &[BenchmarkResult]) -> Result<()> {
        let mut file = std::fs::File::create(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        file.write_all(render_csv(results).as_bytes())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        log::info!("Results written to {}", self.path.display());
        Ok(())
    }
}

/// Writes the full result list as pretty-printed JSON
#[derive(Clone, Debug)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultSink for JsonSink {
    fn consume(&mut self, results: &[BenchmarkResult]) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        log::info!("Results saved to {}", self.path.display());
        Ok(())
    }
}

/// Keeps results in memory for library callers that post-process them
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub results: Vec<BenchmarkResult>,
}

impl ResultSink for MemorySink {
    fn consume(&mut self, results: &[BenchmarkResult]) -> Result<()> {
        self.results.extend_from_slice(results);
        Ok(())
    }
}
