//! Statistical analysis of repeated strategy runs
//!
//! Mean, median, standard deviation, coefficient of variation, a 95%
//! confidence interval and IQR outliers over per-run throughput.

use serde::{Deserialize, Serialize};

/// One timed count of a strategy over a corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub strategy_label: String,
    pub elapsed_ms: f64,
    pub bytes_scanned: u64,
    pub occurrences: u64,
    pub throughput_mb_per_sec: f64,
}

impl BenchmarkRun {
    pub fn new(strategy_label: impl Into<String>, elapsed_ms: f64, bytes_scanned: u64, occurrences: u64) -> Self {
        // Sub-microsecond runs would otherwise divide by zero
        let seconds = (elapsed_ms / 1000.0).max(1e-9);
        Self {
            strategy_label: strategy_label.into(),
            elapsed_ms,
            bytes_scanned,
            occurrences,
            throughput_mb_per_sec: bytes_scanned as f64 / 1e6 / seconds,
        }
    }
}

/// Statistical summary of multiple runs
#[derive(Debug, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub strategy_label: String,
    pub num_runs: usize,
    pub mean_throughput: f64,
    pub median_throughput: f64,
    pub std_dev: f64,
    pub coefficient_of_variation: f64,
    pub confidence_interval_95: (f64, f64),
    pub min_throughput: f64,
    pub max_throughput: f64,
    pub outliers: Vec<f64>,
}

impl StatisticalSummary {
    /// Compute statistics from multiple benchmark runs
    pub fn from_runs(runs: &[BenchmarkRun]) -> Self {
        assert!(!runs.is_empty(), "Need at least one run");

        let strategy_label = runs[0].strategy_label.clone();
        let throughputs: Vec<f64> = runs.iter().map(|r| r.throughput_mb_per_sec).collect();
        let n = throughputs.len() as f64;

        let mean = throughputs.iter().sum::<f64>() / n;

        let mut sorted = throughputs.clone();
        sorted.sort_by(f64::total_cmp);
        let median = if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
        } else {
            sorted[sorted.len() / 2]
        };

        let variance = throughputs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };

        // Two-sided t-values for 95%, indexed by sample count
        let t_value = match throughputs.len() {
            1 => 12.706,
            2 => 4.303,
            3 => 3.182,
            4 => 2.776,
            5 => 2.571,
            6 => 2.447,
            7 => 2.365,
            8 => 2.306,
            9 => 2.262,
            10 => 2.228,
            _ => 1.96,
        };
        let margin = t_value * (std_dev / n.sqrt());

        let q1 = sorted[sorted.len() / 4];
        let q3 = sorted[3 * sorted.len() / 4];
        let iqr = q3 - q1;
        let (lower_bound, upper_bound) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
        let outliers = throughputs
            .iter()
            .filter(|&&x| x < lower_bound || x > upper_bound)
            .copied()
            .collect();

        StatisticalSummary {
            strategy_label,
            num_runs: throughputs.len(),
            mean_throughput: mean,
            median_throughput: median,
            std_dev,
            coefficient_of_variation: cv,
            confidence_interval_95: (mean - margin, mean + margin),
            min_throughput: sorted[0],
            max_throughput: sorted[sorted.len() - 1],
            outliers,
        }
    }

    /// Check if performance is stable (CV < 5%)
    pub fn is_stable(&self) -> bool {
        self.coefficient_of_variation < 0.05
    }
}

/// Format throughput in human-readable form
pub fn format_throughput(mb_per_sec: f64) -> String {
    if mb_per_sec >= 1e3 {
        format!("{:.2} GB/s", mb_per_sec / 1e3)
    } else {
        format!("{:.2} MB/s", mb_per_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(throughput: f64) -> BenchmarkRun {
        BenchmarkRun {
            strategy_label: "SerialCPU".to_string(),
            elapsed_ms: 10.0,
            bytes_scanned: 1_000_000,
            occurrences: 42,
            throughput_mb_per_sec: throughput,
        }
    }

    #[test]
    fn test_throughput_from_elapsed() {
        let r = BenchmarkRun::new("SerialCPU", 500.0, 100_000_000, 1);
        assert!((r.throughput_mb_per_sec - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_is_finite() {
        let r = BenchmarkRun::new("ParallelGPU", 0.0, 1_000, 1);
        assert!(r.throughput_mb_per_sec.is_finite());
    }

    #[test]
    fn test_mean_and_median() {
        let summary = StatisticalSummary::from_runs(&[run(100.0), run(200.0), run(300.0)]);
        assert_eq!(summary.mean_throughput, 200.0);
        assert_eq!(summary.median_throughput, 200.0);
        assert_eq!(summary.min_throughput, 100.0);
        assert_eq!(summary.max_throughput, 300.0);
    }

    #[test]
    fn test_median_even_count() {
        let summary = StatisticalSummary::from_runs(&[run(100.0), run(200.0), run(300.0), run(400.0)]);
        assert_eq!(summary.median_throughput, 250.0);
    }

    #[test]
    fn test_identical_runs_have_no_spread() {
        let summary = StatisticalSummary::from_runs(&[run(100.0), run(100.0)]);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.coefficient_of_variation, 0.0);
        assert!(summary.is_stable());
    }

    #[test]
    fn test_stability_check() {
        assert!(StatisticalSummary::from_runs(&[run(1000.0), run(1010.0)]).is_stable());
        assert!(!StatisticalSummary::from_runs(&[run(1000.0), run(2000.0)]).is_stable());
    }

    #[test]
    fn test_format_throughput() {
        assert_eq!(format_throughput(1500.0), "1.50 GB/s");
        assert_eq!(format_throughput(12.5), "12.50 MB/s");
    }
}
