//! Final answer returned to the caller of the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::RetrievedPassage;

/// A generated answer together with the passages it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub text: String,
    pub sources: Vec<RetrievedPassage>,

    /// False when retrieval returned nothing and the model answered without
    /// reference material.
    pub has_context: bool,

    /// Generative model that produced `text`.
    pub model: String,
    pub answered_at: DateTime<Utc>,
}
