//! Retrieved passages and the answer context assembled from them.

use serde::{Deserialize, Serialize};

use super::chunk::{METADATA_SOURCE, METADATA_TEXT, METADATA_TOPIC};
use super::index::QueryMatch;

/// Separator placed between passages in the assembled context.
pub const PASSAGE_SEPARATOR: &str = "\n\n";

/// A query match projected onto the fields the pipeline cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub id: String,
    pub score: f32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl RetrievedPassage {
    /// Project a match; `None` when the record carries no passage text.
    pub fn from_match(m: &QueryMatch) -> Option<Self> {
        let text = m.metadata.get(METADATA_TEXT)?;
        Some(Self {
            id: m.id.clone(),
            score: m.score,
            text: text.clone(),
            source: m.metadata.get(METADATA_SOURCE).cloned(),
            topic: m.metadata.get(METADATA_TOPIC).cloned(),
        })
    }
}

/// Retrieved passages in similarity order, ready to be placed in a prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerContext {
    passages: Vec<RetrievedPassage>,
}

impl AnswerContext {
    pub const fn new(passages: Vec<RetrievedPassage>) -> Self {
        Self { passages }
    }

    pub const fn empty() -> Self {
        Self {
            passages: Vec::new(),
        }
    }

    pub fn passages(&self) -> &[RetrievedPassage] {
        &self.passages
    }

    pub fn into_passages(self) -> Vec<RetrievedPassage> {
        self.passages
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Passage texts joined by a blank line, in retrieval order.
    pub fn text(&self) -> String {
        self.passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR)
    }
}
