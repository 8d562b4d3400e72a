//! Ports the pipeline services are written against.
//!
//! Hosted adapters live in `infrastructure::openai` and
//! `infrastructure::pinecone`; offline adapters in `infrastructure::vector`.

use async_trait::async_trait;

use super::errors::PipelineResult;
use super::models::{
    ChatRequest, IndexDescription, IndexRecord, IndexSpec, Provisioned, QueryMatch,
};

/// Maps text to a fixed-length dense vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    ///
    /// # Returns
    /// * `Ok(Vec<f32>)` - Vector of length [`EmbeddingProvider::dimension`]
    /// * `Err(PipelineError::Provider)` - Network, auth, rate-limit or malformed response
    async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>>;

    /// Model identifier, recorded for diagnostics.
    fn model(&self) -> &str;

    /// Dimension every returned vector has.
    fn dimension(&self) -> usize;

    /// Check that the provider is reachable and accepts our credentials.
    ///
    /// Local providers have nothing to check.
    async fn health_check(&self) -> PipelineResult<()> {
        Ok(())
    }
}

/// Keyed store of vectors supporting nearest-neighbour queries.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite records by id.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records the index acknowledged
    /// * `Err(PipelineError::Index)` - On rejection or transport failure
    async fn upsert(&self, records: Vec<IndexRecord>) -> PipelineResult<usize>;

    /// Return at most `top_k` matches ordered by non-increasing score.
    ///
    /// Asking for more matches than the index holds is not an error.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> PipelineResult<Vec<QueryMatch>>;

    /// Look records up by id; unknown ids are skipped.
    async fn fetch(&self, ids: &[String]) -> PipelineResult<Vec<IndexRecord>>;
}

/// Creates and inspects indexes on the vector store service.
#[async_trait]
pub trait IndexProvisioner: Send + Sync {
    /// Create the index unless one with the same name already exists, then
    /// wait until it is ready.
    ///
    /// An existing index with a different dimension or metric is an
    /// `Err(PipelineError::Index)`.
    async fn ensure_index(&self, spec: &IndexSpec) -> PipelineResult<Provisioned>;

    /// Describe a named index; `Ok(None)` when it does not exist.
    async fn describe(&self, name: &str) -> PipelineResult<Option<IndexDescription>>;
}

/// Generative language model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the generated text.
    async fn complete(&self, request: ChatRequest) -> PipelineResult<String>;

    fn model(&self) -> &str;

    /// Check that the model is reachable and accepts our credentials.
    async fn health_check(&self) -> PipelineResult<()> {
        Ok(())
    }
}
