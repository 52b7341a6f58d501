//! Word Search Benchmark
//!
//! Measures how long it takes to count a target word in large text corpora
//! under three execution strategies:
//!
//! - **SerialCPU**: one thread, whitespace tokens, case-insensitive
//! - **ParallelCPU_Cores_n**: the same matching rule on a fresh `n`-thread pool
//! - **ParallelGPU**: an OpenCL kernel with one work item per byte offset,
//!   counting raw case-sensitive substring matches with an atomic counter
//!
//! # Architecture
//!
//! ```text
//! corpora ─▶ Orchestrator ─▶ SearchStrategy ×(repetitions) ─▶ BenchmarkResult list
//!                 │                                              │
//!                 └─ BackendProvider ─▶ ComputeBackend (GPU)     ├─▶ CsvSink / JsonSink
//!                                                                └─▶ aggregate ─▶ report
//! ```
//!
//! Failures are contained: a corpus that cannot be read or a GPU that cannot
//! be acquired is logged and skipped, and the remaining runs still produce
//! results.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use word_search_bench::{BenchConfig, Orchestrator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = BenchConfig::builder()
//!     .target("whale")
//!     .repetitions(3)
//!     .worker_counts(&[1, 4])
//!     .build()?;
//!
//! let report = Orchestrator::new(config).run(&["MobyDick-217452.txt"]);
//! for result in &report.results {
//!     println!("{} {} {}", result.strategy_label, result.occurrences, result.elapsed_ms);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod corpus;
pub mod orchestrator;
pub mod report;
pub mod result;
pub mod sink;
pub mod strategy;

pub mod gpu;

// Re-exports for convenience
pub use config::{BenchConfig, BenchConfigBuilder};
pub use corpus::{Corpus, LoadError, SearchTarget};
pub use gpu::{BackendProvider, ComputeBackend, DeviceClass, GpuError};
pub use orchestrator::{BenchmarkReport, Orchestrator};
pub use result::BenchmarkResult;
pub use sink::{CsvSink, ResultSink};
pub use strategy::{GpuKernel, Scalar, SearchStrategy, ThreadPooled};
