//! Retrieval: embed the question and collect the nearest passages.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::models::{AnswerContext, RetrievedPassage};
use crate::domain::ports::{EmbeddingProvider, VectorIndex};

/// Turns a question into an [`AnswerContext`]
///
/// Must share its embedding provider with the indexer that populated the
/// index, otherwise scores are meaningless.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Passages for the `top_k` nearest records, most similar first
    ///
    /// # Errors
    /// * `Configuration` - `top_k` is zero
    /// * `InvalidInput` - the question is blank
    /// * `Provider` / `Index` - embedding or query failed
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn retrieve(&self, question: &str, top_k: usize) -> PipelineResult<AnswerContext> {
        if top_k == 0 {
            return Err(PipelineError::Configuration(
                "top_k must be at least 1".to_string(),
            ));
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::InvalidInput(
                "question cannot be empty".to_string(),
            ));
        }

        let vector = self.embedder.embed(question).await?;
        let matches = self.index.query(&vector, top_k, true).await?;

        let passages: Vec<RetrievedPassage> = matches
            .iter()
            .take(top_k)
            .filter_map(|m| {
                let passage = RetrievedPassage::from_match(m);
                if passage.is_none() {
                    warn!(id = %m.id, "match has no text metadata, skipping");
                }
                passage
            })
            .collect();

        debug!(matches = matches.len(), passages = passages.len(), "retrieved context");
        Ok(AnswerContext::new(passages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Chunk, IndexRecord, Metric};
    use crate::infrastructure::vector::{HashingEmbedder, InMemoryVectorIndex};
    use std::collections::BTreeMap;

    const DIM: usize = 128;

    async fn retriever_with(chunks: &[Chunk]) -> (Retriever, Arc<InMemoryVectorIndex>) {
        let embedder = Arc::new(HashingEmbedder::new(DIM).unwrap());
        let index = Arc::new(InMemoryVectorIndex::new(DIM, Metric::Cosine));
        let records = chunks
            .iter()
            .map(|c| c.to_record(embedder.embed_text(&c.text)))
            .collect();
        index.upsert(records).await.unwrap();
        (Retriever::new(embedder, index.clone()), index)
    }

    fn corpus() -> Vec<Chunk> {
        vec![
            Chunk::new("cs_degree_req_1", "CSCI 1301 is required for the CS major.").unwrap(),
            Chunk::new("cs_degree_req_2", "CSCI 1302 is the next core course in the CS curriculum.").unwrap(),
            Chunk::new("financial_aid_1", "FAFSA must be submitted by March 1 to be considered for full scholarships.").unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_nearest_passage_first() {
        let (retriever, _) = retriever_with(&corpus()).await;
        let context = retriever.retrieve("When must the FAFSA be submitted?", 3).await.unwrap();

        assert_eq!(context.passages()[0].id, "financial_aid_1");
        assert!(context.text().starts_with("FAFSA must be submitted"));
        let scores: Vec<f32> = context.passages().iter().map(|p| p.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_top_k_bounds() {
        let (retriever, _) = retriever_with(&corpus()).await;
        assert_eq!(retriever.retrieve("CS major", 1).await.unwrap().len(), 1);
        assert_eq!(retriever.retrieve("CS major", 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_index_gives_empty_context() {
        let (retriever, _) = retriever_with(&[]).await;
        let context = retriever.retrieve("anything", 3).await.unwrap();
        assert!(context.is_empty());
        assert_eq!(context.text(), "");
    }

    #[tokio::test]
    async fn test_rejects_zero_top_k_and_blank_question() {
        let (retriever, _) = retriever_with(&corpus()).await;
        assert!(matches!(
            retriever.retrieve("FAFSA", 0).await,
            Err(PipelineError::Configuration(_))
        ));
        assert!(matches!(
            retriever.retrieve("   ", 3).await,
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_skips_matches_without_text() {
        let (retriever, index) = retriever_with(&corpus()).await;
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), "orphan".to_string());
        index
            .upsert(vec![IndexRecord {
                id: "no_text".to_string(),
                values: HashingEmbedder::new(DIM).unwrap().embed_text("FAFSA due"),
                metadata,
            }])
            .await
            .unwrap();

        let context = retriever.retrieve("FAFSA due", 4).await.unwrap();
        assert_eq!(context.len(), 3);
        assert!(context.passages().iter().all(|p| p.id != "no_text"));
    }
}
