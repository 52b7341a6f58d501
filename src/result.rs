//! Benchmark result records

use serde::{Deserialize, Serialize};

/// One timed, counted run of one strategy against one corpus
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub corpus_name: String,
    pub strategy_label: String,
    pub occurrences: u64,
    pub elapsed_ms: u64,
}

impl BenchmarkResult {
    pub fn new(
        corpus_name: impl Into<String>,
        strategy_label: impl Into<String>,
        occurrences: u64,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            corpus_name: corpus_name.into(),
            strategy_label: strategy_label.into(),
            occurrences,
            elapsed_ms,
        }
    }

    /// Grouping key shared by the console summary and the aggregator
    pub fn key(&self) -> (&str, &str) {
        (&self.corpus_name, &self.strategy_label)
    }
}
