//! Benchmark configuration
//!
//! Word, repetition count, worker counts and device class are all fields,
//! with defaults that reproduce the standard experiment.

use std::num::NonZeroUsize;

use anyhow::Result;

use crate::corpus::SearchTarget;
use crate::gpu::DeviceClass;

/// Word searched for by default
pub const DEFAULT_TARGET: &str = "whale";

/// Timed runs per (corpus, strategy) pair by default
pub const DEFAULT_REPETITIONS: usize = 3;

/// Corpora benchmarked when none are given
pub const DEFAULT_CORPORA: [&str; 3] = [
    "MobyDick-217452.txt",
    "DonQuixote-388208.txt",
    "Dracula-165307.txt",
];

/// Default worker counts: 1, 4 and every available core, in that order
pub fn default_worker_counts() -> Vec<usize> {
    let available = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    vec![1, 4, available]
}

/// Validated benchmark configuration
#[derive(Clone, Debug)]
pub struct BenchConfig {
    target: SearchTarget,
    repetitions: NonZeroUsize,
    worker_counts: Vec<NonZeroUsize>,
    device_class: DeviceClass,
    gpu_enabled: bool,
}

impl BenchConfig {
    /// Create a new builder
    pub fn builder() -> BenchConfigBuilder {
        BenchConfigBuilder::new()
    }

    pub fn target(&self) -> &SearchTarget {
        &self.target
    }

    pub fn repetitions(&self) -> NonZeroUsize {
        self.repetitions
    }

    /// Worker counts in configured order
    pub fn worker_counts(&self) -> &[NonZeroUsize] {
        &self.worker_counts
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device_class
    }

    pub fn gpu_enabled(&self) -> bool {
        self.gpu_enabled
    }
}

/// Builder for [`BenchConfig`]
#[derive(Clone, Debug)]
pub struct BenchConfigBuilder {
    target: String,
    repetitions: usize,
    worker_counts: Vec<usize>,
    device_class: DeviceClass,
    gpu_enabled: bool,
}

impl BenchConfigBuilder {
    /// Create a builder pre-filled with the defaults
    pub fn new() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            repetitions: DEFAULT_REPETITIONS,
            worker_counts: default_worker_counts(),
            device_class: DeviceClass::default(),
            gpu_enabled: true,
        }
    }

    /// Set the word to search for
    pub fn target(mut self, word: impl Into<String>) -> Self {
        self.target = word.into();
        self
    }

    /// Set the number of timed runs per (corpus, strategy) pair
    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set the thread-pool sizes, benchmarked in the given order
    pub fn worker_counts(mut self, counts: &[usize]) -> Self {
        self.worker_counts = counts.to_vec();
        self
    }

    /// Set the device class requested from the compute platform
    pub fn device_class(mut self, class: DeviceClass) -> Self {
        self.device_class = class;
        self
    }

    /// Enable or disable the GPU strategy
    pub fn gpu_enabled(mut self, enabled: bool) -> Self {
        self.gpu_enabled = enabled;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<BenchConfig> {
        let target = SearchTarget::new(self.target)?;

        let repetitions = NonZeroUsize::new(self.repetitions)
            .ok_or_else(|| anyhow::anyhow!("Repetition count must be at least 1"))?;

        let worker_counts = self
            .worker_counts
            .iter()
            .map(|&n| {
                NonZeroUsize::new(n).ok_or_else(|| anyhow::anyhow!("Worker count must be at least 1"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BenchConfig {
            target,
            repetitions,
            worker_counts,
            device_class: self.device_class,
            gpu_enabled: self.gpu_enabled,
        })
    }
}

impl Default for BenchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::builder().build().unwrap();
        assert_eq!(config.target().as_str(), "whale");
        assert_eq!(config.repetitions().get(), 3);
        assert_eq!(config.worker_counts().len(), 3);
        assert_eq!(config.worker_counts()[0].get(), 1);
        assert_eq!(config.worker_counts()[1].get(), 4);
        assert_eq!(config.device_class(), DeviceClass::Gpu);
        assert!(config.gpu_enabled());
    }

    #[test]
    fn test_worker_order_is_preserved() {
        let config = BenchConfig::builder()
            .worker_counts(&[8, 2, 2, 1])
            .build()
            .unwrap();
        let counts: Vec<usize> = config.worker_counts().iter().map(|n| n.get()).collect();
        assert_eq!(counts, vec![8, 2, 2, 1]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(BenchConfig::builder().target("").build().is_err());
        assert!(BenchConfig::builder().repetitions(0).build().is_err());
        assert!(BenchConfig::builder().worker_counts(&[1, 0]).build().is_err());
    }

    #[test]
    fn test_empty_worker_list_allowed() {
        let config = BenchConfig::builder().worker_counts(&[]).build().unwrap();
        assert!(config.worker_counts().is_empty());
    }
}
