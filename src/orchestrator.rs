//! Benchmark orchestration
//!
//! For every corpus, in configured order:
//!
//! ```text
//! Load ─▶ SerialCPU ×N ─▶ ParallelCPU_Cores_<w> ×N (each w, in order)
//!      ─▶ acquire GPU ─┬─▶ ParallelGPU ×N ─▶ release GPU ─▶ next corpus
//!                      └─▶ (unavailable) ───────────────────▶ next corpus
//! ```
//!
//! Runs are strictly sequential so that no two strategies compete for the
//! machine while being timed. A corpus that fails to load, or a GPU that
//! cannot be acquired, is logged and skipped; the rest of the matrix still
//! runs.

use std::path::Path;
use std::time::Instant;

use crate::config::BenchConfig;
use crate::corpus::Corpus;
use crate::gpu::{BackendProvider, ComputeBackend, DisabledProvider, OpenClProvider};
use crate::result::BenchmarkResult;
use crate::strategy::{GpuKernel, Scalar, SearchStrategy, StrategyError, ThreadPooled, GPU_LABEL};

/// A corpus that was not benchmarked
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedCorpus {
    pub name: String,
    pub reason: String,
}

/// A strategy that produced fewer than the configured number of runs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyFailure {
    pub corpus: String,
    pub strategy: String,
    pub reason: String,
}

/// Everything a benchmark run produced
#[derive(Clone, Debug, Default)]
pub struct BenchmarkReport {
    /// One entry per run, in execution order
    pub results: Vec<BenchmarkResult>,
    pub skipped_corpora: Vec<SkippedCorpus>,
    pub strategy_failures: Vec<StrategyFailure>,
}

impl BenchmarkReport {
    /// Results for one strategy label, in execution order
    pub fn results_for<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a BenchmarkResult> + 'a {
        self.results.iter().filter(move |r| r.strategy_label == label)
    }
}

/// Drives the corpus × strategy × repetition matrix
pub struct Orchestrator {
    config: BenchConfig,
    provider: Box<dyn BackendProvider>,
}

impl Orchestrator {
    /// Create an orchestrator using OpenCL, or no GPU when disabled in `config`
    pub fn new(config: BenchConfig) -> Self {
        let provider: Box<dyn BackendProvider> = if config.gpu_enabled() {
            Box::new(OpenClProvider::new(config.device_class()))
        } else {
            Box::new(DisabledProvider)
        };
        Self { config, provider }
    }

    /// Create an orchestrator with an explicit backend provider
    pub fn with_provider(config: BenchConfig, provider: Box<dyn BackendProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Benchmark every corpus path in order
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> BenchmarkReport {
        let mut report = BenchmarkReport::default();

        for path in paths {
            match Corpus::load(path) {
                Ok(corpus) => self.run_corpus(&corpus, &mut report),
                Err(e) => {
                    log::warn!("Skipping corpus: {}", e);
                    report.skipped_corpora.push(SkippedCorpus {
                        name: path.as_ref().display().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Benchmark one in-memory corpus, appending to `report`
    pub fn run_corpus(&self, corpus: &Corpus, report: &mut BenchmarkReport) {
        log::info!("Processing: {} ({} bytes)", corpus.name(), corpus.len());

        self.run_strategy(&mut Scalar, corpus, report);

        for &workers in self.config.worker_counts() {
            log::info!("Testing ParallelCPU with {} workers", workers);
            self.run_strategy(&mut ThreadPooled::new(workers), corpus, report);
        }

        self.run_gpu(corpus, report);
    }

    fn run_gpu(&self, corpus: &Corpus, report: &mut BenchmarkReport) {
        if !self.config.gpu_enabled() {
            log::debug!("GPU disabled, skipping ParallelGPU for {}", corpus.name());
            return;
        }

        let mut backend = match self.provider.acquire() {
            Ok(backend) => backend,
            Err(e) => {
                log::warn!("GPU not available for {}: {}", corpus.name(), e);
                report.strategy_failures.push(StrategyFailure {
                    corpus: corpus.name().to_string(),
                    strategy: GPU_LABEL.to_string(),
                    reason: e.to_string(),
                });
                return;
            }
        };

        log::info!("Testing ParallelGPU on {}", backend.device_name());
        self.run_strategy(&mut GpuKernel::new(backend.as_mut()), corpus, report);

        release_backend(backend.as_mut());
    }

    /// Run one strategy N times. Stops at the first failure, keeping the
    /// rows recorded before it.
    fn run_strategy(&self, strategy: &mut dyn SearchStrategy, corpus: &Corpus, report: &mut BenchmarkReport) {
        let label = strategy.label();

        for run in 1..=self.config.repetitions().get() {
            match time_run(strategy, corpus, &self.config) {
                Ok((occurrences, elapsed_ms)) => {
                    log::debug!(
                        "{} run {}: {} occurrences in {} ms",
                        label,
                        run,
                        occurrences,
                        elapsed_ms
                    );
                    report.results.push(BenchmarkResult::new(
                        corpus.name(),
                        label.as_str(),
                        occurrences,
                        elapsed_ms,
                    ));
                }
                Err(e) => {
                    log::warn!("{} failed on {} (run {}): {}", label, corpus.name(), run, e);
                    report.strategy_failures.push(StrategyFailure {
                        corpus: corpus.name().to_string(),
                        strategy: label.clone(),
                        reason: e.to_string(),
                    });
                    return;
                }
            }
        }
    }
}

/// Time a single `count` call with wall-clock milliseconds
fn time_run(
    strategy: &mut dyn SearchStrategy,
    corpus: &Corpus,
    config: &BenchConfig,
) -> Result<(u64, u64), StrategyError> {
    let start = Instant::now();
    let occurrences = strategy.count(corpus, config.target())?;
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok((occurrences, elapsed_ms))
}

fn release_backend(backend: &mut dyn ComputeBackend) {
    let report = backend.release();
    if report.is_clean() {
        log::debug!("Released GPU resources: {:?}", report.released);
    } else {
        log::warn!("Failed to release GPU resources: {:?}", report.failed);
    }
}
