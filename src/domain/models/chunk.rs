//! Corpus chunks
//!
//! A chunk is the atomic retrievable passage: an id, its text and a flat
//! string-to-string metadata map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::index::IndexRecord;
use crate::domain::errors::{PipelineError, PipelineResult};

/// Metadata key holding the passage text on an index record.
pub const METADATA_TEXT: &str = "text";

/// Metadata key holding where a passage came from (URL or document name).
pub const METADATA_SOURCE: &str = "source";

/// Metadata key holding the advising topic a passage belongs to.
pub const METADATA_TOPIC: &str = "topic";

/// A unit of source text plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier; becomes the vector index record id.
    pub id: String,

    /// Passage text that gets embedded.
    pub text: String,

    /// Free-form metadata (`source`, `topic`, ...).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Chunk {
    /// Create a validated chunk without metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> PipelineResult<Self> {
        let chunk = Self {
            id: id.into(),
            text: text.into(),
            metadata: BTreeMap::new(),
        };
        chunk.validate()?;
        Ok(chunk)
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check the chunk invariants: non-empty id and non-blank text.
    ///
    /// Chunks deserialized from corpus files bypass [`Chunk::new`], so loaders
    /// call this explicitly.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.id.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "chunk id cannot be empty".to_string(),
            ));
        }
        if self.text.trim().is_empty() {
            return Err(PipelineError::InvalidInput(format!(
                "chunk '{}' has no text",
                self.id
            )));
        }
        Ok(())
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get(METADATA_SOURCE).map(String::as_str)
    }

    pub fn topic(&self) -> Option<&str> {
        self.metadata.get(METADATA_TOPIC).map(String::as_str)
    }

    /// Build the index record for this chunk.
    ///
    /// The passage text is merged into the metadata under [`METADATA_TEXT`]
    /// so a query can recover the passage and not only its id. A `text` key
    /// already present in the chunk metadata is overwritten by the chunk text.
    pub fn to_record(&self, values: Vec<f32>) -> IndexRecord {
        let mut metadata = self.metadata.clone();
        metadata.insert(METADATA_TEXT.to_string(), self.text.clone());
        IndexRecord {
            id: self.id.clone(),
            values,
            metadata,
        }
    }
}
