//! Strategy Benchmark Suite
//!
//! Warm-up and measured runs of every counting strategy over synthetic
//! corpora of increasing size, with statistics on scan throughput.

mod statistical_analysis;

use std::num::NonZeroUsize;
use std::time::Instant;

use anyhow::Result;
use chrono::Local;
use statistical_analysis::{format_throughput, BenchmarkRun, StatisticalSummary};
use word_search_bench::gpu::{BackendProvider, ComputeBackend, DeviceClass, OpenClProvider};
use word_search_bench::{Corpus, GpuKernel, Scalar, SearchStrategy, SearchTarget, ThreadPooled};

const WARMUP_RUNS: usize = 3;
const MEASURED_RUNS: usize = 10;

/// Corpus sizes in bytes
const CORPUS_SIZES: [(&str, usize); 3] = [
    ("small_1MB", 1 << 20),
    ("medium_16MB", 16 << 20),
    ("large_64MB", 64 << 20),
];

/// Repeats a prose fragment until `size` bytes
fn synthetic_corpus(name: &str, size: usize) -> Corpus {
    const FRAGMENT: &str = "Call me Ishmael. The whale, the Whale! whalebone and sea\n";
    let text: Vec<u8> = FRAGMENT.bytes().cycle().take(size).collect();
    Corpus::new(name, text)
}

fn measure(strategy: &mut dyn SearchStrategy, corpus: &Corpus, target: &SearchTarget) -> Result<BenchmarkRun> {
    let start = Instant::now();
    let occurrences = strategy.count(corpus, target)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    Ok(BenchmarkRun::new(strategy.label(), elapsed_ms, corpus.len() as u64, occurrences))
}

fn benchmark_strategy(
    strategy: &mut dyn SearchStrategy,
    corpus: &Corpus,
    target: &SearchTarget,
) -> Result<StatisticalSummary> {
    println!("\n--- {} ---", strategy.label());

    for _ in 0..WARMUP_RUNS {
        measure(strategy, corpus, target)?;
    }

    let mut runs = Vec::with_capacity(MEASURED_RUNS);
    for i in 1..=MEASURED_RUNS {
        let run = measure(strategy, corpus, target)?;
        println!(
            "  Run {:2}: {:>12} ({} occurrences)",
            i,
            format_throughput(run.throughput_mb_per_sec),
            run.occurrences
        );
        runs.push(run);
    }

    let summary = StatisticalSummary::from_runs(&runs);
    println!("  Mean:   {}", format_throughput(summary.mean_throughput));
    println!("  Median: {}", format_throughput(summary.median_throughput));
    println!("  CV:     {:.2}%", summary.coefficient_of_variation * 100.0);
    println!(
        "  95% CI: [{}, {}]",
        format_throughput(summary.confidence_interval_95.0),
        format_throughput(summary.confidence_interval_95.1)
    );
    if !summary.outliers.is_empty() {
        println!("  Outliers: {} detected", summary.outliers.len());
    }
    if !summary.is_stable() {
        println!("  Performance is UNSTABLE (CV >= 5%)");
    }

    Ok(summary)
}

fn main() -> Result<()> {
    println!("=== Word Search Strategy Benchmarks ===");
    println!("Date: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let target = SearchTarget::new("whale")?;
    let available = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let mut worker_counts = vec![1, 4, available];
    worker_counts.dedup();

    let mut backend: Option<Box<dyn ComputeBackend>> = match OpenClProvider::new(DeviceClass::Gpu).acquire() {
        Ok(backend) => {
            println!("GPU: {}", backend.device_name());
            Some(backend)
        }
        Err(e) => {
            println!("GPU: unavailable ({}), skipping ParallelGPU", e);
            None
        }
    };

    let mut summaries = Vec::new();
    for (name, size) in CORPUS_SIZES {
        let corpus = synthetic_corpus(name, size);
        println!("\n=== Corpus: {} ({} bytes) ===", corpus.name(), corpus.len());

        summaries.push((name, benchmark_strategy(&mut Scalar, &corpus, &target)?));

        for &n in &worker_counts {
            if let Some(workers) = NonZeroUsize::new(n) {
                let mut pooled = ThreadPooled::new(workers);
                summaries.push((name, benchmark_strategy(&mut pooled, &corpus, &target)?));
            }
        }

        if let Some(backend) = backend.as_mut() {
            let mut gpu = GpuKernel::new(&mut **backend);
            summaries.push((name, benchmark_strategy(&mut gpu, &corpus, &target)?));
        }
    }

    if let Some(mut backend) = backend {
        let report = backend.release();
        if !report.is_clean() {
            println!("GPU release incomplete: {:?}", report.failed);
        }
    }

    println!("\n=== Summary (mean throughput) ===");
    for (corpus, summary) in &summaries {
        println!(
            "{:<12} {:<22} {:>12}",
            corpus,
            summary.strategy_label,
            format_throughput(summary.mean_throughput)
        );
    }

    Ok(())
}
