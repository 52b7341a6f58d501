//! Counting strategies
//!
//! Three interchangeable ways of counting a word in a corpus:
//!
//! | Strategy       | Label                     | Matching rule                          |
//! |----------------|---------------------------|----------------------------------------|
//! | [`Scalar`]     | `SerialCPU`               | whitespace tokens, case-folded         |
//! | [`ThreadPooled`] | `ParallelCPU_Cores_<n>` | same as `Scalar`, on an `n`-thread pool |
//! | [`GpuKernel`]  | `ParallelGPU`             | raw bytes, case-sensitive, overlapping |
//!
//! The CPU strategies agree with each other on every input. The GPU strategy
//! counts substrings and will usually report a different number.

use std::num::NonZeroUsize;

use rayon::prelude::*;
use thiserror::Error;

use crate::corpus::{Corpus, SearchTarget};
use crate::gpu::{ComputeBackend, GpuError};

/// Label of the serial CPU strategy
pub const SERIAL_LABEL: &str = "SerialCPU";

/// Label of the GPU strategy
pub const GPU_LABEL: &str = "ParallelGPU";

/// Label of the thread-pooled strategy for a given worker count
pub fn pooled_label(workers: NonZeroUsize) -> String {
    format!("ParallelCPU_Cores_{}", workers)
}

/// Failure of a single `count` call
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("failed to build a {workers}-thread pool: {source}")]
    Pool {
        workers: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// A named, callable way of counting a word in a corpus
pub trait SearchStrategy {
    /// Stable identifier written to result rows
    fn label(&self) -> String;

    /// Count occurrences of `target` in `corpus`
    fn count(&mut self, corpus: &Corpus, target: &SearchTarget) -> Result<u64, StrategyError>;
}

/// Token separator: ASCII space, `\t`, `\n`, vertical tab, form feed, `\r`
#[inline]
fn is_separator(b: &u8) -> bool {
    b.is_ascii_whitespace() || *b == 0x0B
}

/// Case folding of one character: uppercase, then lowercase of that.
///
/// Mappings that expand to several characters (`ß` → `SS`) leave the
/// character unchanged, so a token only matches a word of the same length.
fn fold(c: char) -> char {
    let upper = single_char(c.to_uppercase()).unwrap_or(c);
    single_char(upper.to_lowercase()).unwrap_or(upper)
}

fn single_char(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Whole-token, case-insensitive comparison against one word
///
/// The word is folded once. ASCII tokens take the byte path; anything else
/// is decoded and compared character by character, falling back to bytes
/// when the token is not valid UTF-8.
struct TokenMatcher<'a> {
    word: &'a [u8],
    folded: Option<Vec<char>>,
}

impl<'a> TokenMatcher<'a> {
    fn new(word: &'a [u8]) -> Self {
        let folded = std::str::from_utf8(word).ok().map(|w| w.chars().map(fold).collect());
        Self { word, folded }
    }

    fn matches(&self, token: &[u8]) -> bool {
        if token.is_empty() {
            return false;
        }
        if token.eq_ignore_ascii_case(self.word) {
            return true;
        }
        if token.is_ascii() && self.word.is_ascii() {
            return false;
        }

        match (std::str::from_utf8(token), &self.folded) {
            (Ok(token), Some(folded)) => {
                token.chars().count() == folded.len()
                    && token.chars().map(fold).zip(folded).all(|(a, &b)| a == b)
            }
            _ => false,
        }
    }
}

/// Count whitespace-separated tokens equal to `word`, ignoring case
///
/// Tokens are maximal runs of non-whitespace bytes; punctuation stays part of
/// the token, so `"Whale!"` does not match `"whale"`.
pub fn count_tokens(text: &[u8], word: &[u8]) -> u64 {
    let matcher = TokenMatcher::new(word);
    text.split(is_separator)
        .filter(|token| matcher.matches(token))
        .count() as u64
}

/// Parallel version of [`count_tokens`] on the current rayon pool
fn par_count_tokens(text: &[u8], word: &[u8]) -> u64 {
    let matcher = TokenMatcher::new(word);
    text.par_split(is_separator)
        .filter(|token| matcher.matches(token))
        .count() as u64
}

/// Single-threaded scan
#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar;

impl SearchStrategy for Scalar {
    fn label(&self) -> String {
        SERIAL_LABEL.to_string()
    }

    fn count(&mut self, corpus: &Corpus, target: &SearchTarget) -> Result<u64, StrategyError> {
        Ok(count_tokens(corpus.text(), target.as_bytes()))
    }
}

/// Multi-threaded scan on a pool created for exactly one call
///
/// Every `count` builds a fresh pool of `workers` threads and joins all of
/// them before returning, so no scheduler state survives between timed runs.
#[derive(Clone, Copy, Debug)]
pub struct ThreadPooled {
    workers: NonZeroUsize,
}

impl ThreadPooled {
    /// Create a strategy that counts on `workers` threads
    pub fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    /// Number of worker threads per call
    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }
}

impl SearchStrategy for ThreadPooled {
    fn label(&self) -> String {
        pooled_label(self.workers)
    }

    fn count(&mut self, corpus: &Corpus, target: &SearchTarget) -> Result<u64, StrategyError> {
        let text = corpus.text();
        let word = target.as_bytes();

        // build_scoped runs the workers inside a std::thread::scope, which
        // joins every one of them before this returns.
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers.get())
            .thread_name(|i| format!("count-worker-{}", i))
            .build_scoped(
                |thread| thread.run(),
                |pool| pool.install(|| par_count_tokens(text, word)),
            )
            .map_err(|source| StrategyError::Pool {
                workers: self.workers.get(),
                source,
            })
    }
}

/// Data-parallel substring count on an acquired GPU backend
pub struct GpuKernel<'a> {
    backend: &'a mut dyn ComputeBackend,
}

impl<'a> GpuKernel<'a> {
    /// Wrap a backend that stays owned by the caller
    pub fn new(backend: &'a mut dyn ComputeBackend) -> Self {
        Self { backend }
    }
}

impl SearchStrategy for GpuKernel<'_> {
    fn label(&self) -> String {
        GPU_LABEL.to_string()
    }

    fn count(&mut self, corpus: &Corpus, target: &SearchTarget) -> Result<u64, StrategyError> {
        Ok(self.backend.count_matches(corpus.text(), target.as_bytes())?)
    }
}
