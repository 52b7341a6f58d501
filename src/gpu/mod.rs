//! GPU acceleration module
//!
//! This module owns the device side of the benchmark: acquiring a compute
//! context and the compiled counting kernel, dispatching one count per call,
//! and tearing everything down again.
//!
//! The orchestrator only sees two seams:
//!
//! - [`BackendProvider`] acquires a backend (once per corpus)
//! - [`ComputeBackend`] runs the kernel over a text/pattern pair and is
//!   released explicitly when the corpus is done
//!
//! The real implementation is OpenCL, compiled with the `opencl` feature.
//! Without it [`OpenClProvider`] always reports [`GpuError::NoPlatform`], so
//! the benchmark degrades to CPU strategies only.

#[cfg(feature = "opencl")]
mod opencl;

#[cfg(feature = "opencl")]
pub use opencl::OpenClBackend;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use thiserror::Error;

/// OpenCL C source of the counting kernel
pub const KERNEL_SOURCE: &str = include_str!("../../kernels/count_matches.cl");

/// Entry point inside [`KERNEL_SOURCE`]
pub const KERNEL_NAME: &str = "count_matches";

/// Errors raised while acquiring or using a GPU backend
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no compute platform available: {0}")]
    NoPlatform(String),

    #[error("no {class} device on platform {platform}")]
    NoDevice { class: DeviceClass, platform: String },

    #[error("failed to create compute context: {0}")]
    Context(String),

    #[error("failed to create command queue: {0}")]
    Queue(String),

    #[error("kernel build failed: {0}")]
    BuildFailure(String),

    #[error("kernel entry point `{name}` unavailable: {reason}")]
    KernelMissing { name: String, reason: String },

    #[error("dispatch failed during {stage}: {reason}")]
    Dispatch { stage: &'static str, reason: String },

    #[error("input of {0} bytes exceeds the kernel's 32-bit index range")]
    InputTooLarge(usize),

    #[error("backend resources already released")]
    Released,
}

impl GpuError {
    /// True when no usable device could be reached at all, as opposed to a
    /// device that was reached but failed to build or run the kernel.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            GpuError::NoPlatform(_) | GpuError::NoDevice { .. } | GpuError::Context(_) | GpuError::Queue(_)
        )
    }
}

/// Class of compute device requested from the platform
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    #[default]
    Gpu,
    Cpu,
    Accelerator,
    All,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceClass::Gpu => "gpu",
            DeviceClass::Cpu => "cpu",
            DeviceClass::Accelerator => "accelerator",
            DeviceClass::All => "all",
        };
        f.write_str(name)
    }
}

impl FromStr for DeviceClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gpu" => Ok(DeviceClass::Gpu),
            "cpu" => Ok(DeviceClass::Cpu),
            "accelerator" => Ok(DeviceClass::Accelerator),
            "all" => Ok(DeviceClass::All),
            other => anyhow::bail!("Unknown device class '{other}' (expected gpu, cpu, accelerator or all)"),
        }
    }
}

/// Outcome of a best-effort teardown
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    /// Resources that were released cleanly, in teardown order
    pub released: Vec<&'static str>,
    /// Resources whose release call failed
    pub failed: Vec<&'static str>,
}

impl ReleaseReport {
    /// True when every attempted release succeeded
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Release one resource without letting its failure stop the others.
///
/// opencl3 panics inside `Drop` when a release call fails, so the drop is
/// isolated with `catch_unwind`. An empty slot is skipped.
#[cfg_attr(not(feature = "opencl"), allow(dead_code))]
pub(crate) fn release_guarded<T>(label: &'static str, slot: &mut Option<T>, report: &mut ReleaseReport) {
    let Some(resource) = slot.take() else {
        return;
    };

    match panic::catch_unwind(AssertUnwindSafe(move || drop(resource))) {
        Ok(()) => report.released.push(label),
        Err(_) => {
            log::warn!("Failed to release {}", label);
            report.failed.push(label);
        }
    }
}

/// An acquired device context with a compiled counting kernel
pub trait ComputeBackend {
    /// Human-readable name of the selected device
    fn device_name(&self) -> &str;

    /// Count every byte offset where `pattern` occurs in `text`.
    ///
    /// Blocks until the device has finished and the result is back on the
    /// host. Per-call device buffers are released before returning, whether
    /// or not the dispatch succeeded.
    fn count_matches(&mut self, text: &[u8], pattern: &[u8]) -> Result<u64, GpuError>;

    /// Release kernel, program, queue and context, each independently.
    ///
    /// Calling this twice is harmless; the second call releases nothing.
    fn release(&mut self) -> ReleaseReport;
}

/// Source of GPU backends
pub trait BackendProvider {
    /// Acquire a fresh backend. Partially acquired resources are released
    /// before an error is returned.
    fn acquire(&self) -> Result<Box<dyn ComputeBackend>, GpuError>;
}

/// Acquires OpenCL backends on platform 0, device 0 of the configured class
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenClProvider {
    device_class: DeviceClass,
}

impl OpenClProvider {
    /// Create a provider for the given device class
    pub fn new(device_class: DeviceClass) -> Self {
        Self { device_class }
    }

    /// Device class requested on acquisition
    pub fn device_class(&self) -> DeviceClass {
        self.device_class
    }
}

impl BackendProvider for OpenClProvider {
    #[cfg(feature = "opencl")]
    fn acquire(&self) -> Result<Box<dyn ComputeBackend>, GpuError> {
        Ok(Box::new(OpenClBackend::acquire(self.device_class)?))
    }

    #[cfg(not(feature = "opencl"))]
    fn acquire(&self) -> Result<Box<dyn ComputeBackend>, GpuError> {
        Err(GpuError::NoPlatform(
            "built without the `opencl` feature".to_string(),
        ))
    }
}

/// Provider that never yields a backend
///
/// Used when the GPU is disabled by configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledProvider;

impl BackendProvider for DisabledProvider {
    fn acquire(&self) -> Result<Box<dyn ComputeBackend>, GpuError> {
        Err(GpuError::NoPlatform("GPU disabled by configuration".to_string()))
    }
}

/// Host reference for the kernel's matching rule
///
/// Counts offsets `i` in `0..=text.len() - pattern.len()` where the window
/// starting at `i` equals `pattern` byte for byte. Matches may overlap and
/// may sit inside larger words. An empty pattern matches nowhere.
pub fn reference_count(text: &[u8], pattern: &[u8]) -> u64 {
    if pattern.is_empty() || pattern.len() > text.len() {
        return 0;
    }

    text.windows(pattern.len())
        .filter(|window| *window == pattern)
        .count() as u64
}
