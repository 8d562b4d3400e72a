//! Domain errors for the advising pipeline.

use thiserror::Error;

/// Errors surfaced by the pipeline stages.
///
/// An empty retrieval result is not represented here: zero matches is a valid
/// outcome and flows through as an empty [`AnswerContext`](super::models::AnswerContext).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or invalid credentials, endpoints or settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The embedding or model provider rejected or failed a call.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The vector index rejected or failed an upsert, query or provisioning call.
    #[error("Vector index error: {0}")]
    Index(String),

    /// The chunk corpus could not be loaded or is inconsistent.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Answer generation failed (provider error or unusable response).
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Caller supplied an unusable argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Short machine-readable kind, used in JSON error output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Provider(_) => "provider",
            Self::Index(_) => "index",
            Self::Corpus(_) => "corpus",
            Self::GenerationFailed(_) => "generation_failed",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}
