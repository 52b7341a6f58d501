//! Corpus and search target types
//!
//! A corpus is one input text held entirely in memory as raw bytes. It is
//! loaded once per benchmarking pass and never mutated afterwards; every
//! strategy reads the same buffer.

use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Failure to bring a corpus into memory
#[derive(Debug, Error)]
pub enum LoadError {
    /// The path does not exist
    #[error("corpus file not found: {path}")]
    NotFound { path: String },

    /// The path exists but could not be read
    #[error("failed to read corpus {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// One input text, immutable once loaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corpus {
    name: String,
    text: Vec<u8>,
}

impl Corpus {
    /// Create a corpus from an already-loaded buffer
    pub fn new(name: impl Into<String>, text: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Load a corpus from disk. The corpus is named after the path as given.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let name = path.display().to_string();

        match std::fs::read(path) {
            Ok(text) => Ok(Self { name, text }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LoadError::NotFound { path: name }),
            Err(source) => Err(LoadError::Read { path: name, source }),
        }
    }

    /// Name used in result rows
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw text bytes
    #[inline]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Length of the text in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the text is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The single word every strategy looks for during a run
///
/// Case handling is strategy-specific: the CPU strategies compare whole
/// tokens case-insensitively, the GPU kernel compares raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTarget {
    word: String,
}

impl SearchTarget {
    /// Create a target word. Empty words are rejected.
    pub fn new(word: impl Into<String>) -> anyhow::Result<Self> {
        let word = word.into();
        if word.is_empty() {
            anyhow::bail!("Search target word must not be empty");
        }
        Ok(Self { word })
    }

    /// The word as configured
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.word
    }

    /// The word as a byte pattern
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.word.as_bytes()
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.word)
    }
}
