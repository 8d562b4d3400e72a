//! Chunk corpus files
//!
//! - `loader`: reads, validates and writes JSON/YAML chunk files
//! - `splitter`: turns raw scraped text into chunks

pub mod loader;
pub mod splitter;

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::errors::PipelineError;

pub use loader::{load, load_dir, load_file, write_file};
pub use splitter::{TextSplitter, DEFAULT_MAX_CHARS, DEFAULT_OVERLAP_CHARS};

/// Errors raised while reading or producing corpus files
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported corpus file {} (expected .json, .yaml or .yml)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid chunk in {}: {message}", path.display())]
    InvalidChunk { path: PathBuf, message: String },

    #[error("Duplicate chunk id '{id}' in {} and {}", first.display(), second.display())]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Failed to walk corpus directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid splitter settings: {0}")]
    InvalidSplitter(String),
}

impl From<CorpusError> for PipelineError {
    fn from(err: CorpusError) -> Self {
        Self::Corpus(err.to_string())
    }
}
