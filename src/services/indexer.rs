//! Indexing: embed every chunk and upsert it into the vector index.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::models::{Chunk, IndexRecord, IndexerConfig};
use crate::domain::ports::{EmbeddingProvider, VectorIndex};

/// Outcome of an indexing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Records acknowledged by the index
    pub written: usize,

    /// Upsert requests sent
    pub batches: usize,
}

/// Embeds chunks with bounded concurrency and upserts them in batches
///
/// The first embedding or upsert failure aborts the run. Batches already
/// written stay in the index; rerunning is safe because upserts are keyed by id.
pub struct Indexer {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
    concurrency: usize,
}

impl Indexer {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        config: &IndexerConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            batch_size: config.batch_size.max(1),
            concurrency: config.concurrency.max(1),
        }
    }

    pub async fn index(&self, chunks: &[Chunk]) -> PipelineResult<IndexReport> {
        self.index_with_progress(chunks, |_| {}).await
    }

    /// Like [`Indexer::index`], calling `on_progress` with the running count
    /// of written records after every batch
    #[instrument(skip_all, fields(chunks = chunks.len(), model = %self.embedder.model()))]
    pub async fn index_with_progress<F>(
        &self,
        chunks: &[Chunk],
        on_progress: F,
    ) -> PipelineResult<IndexReport>
    where
        F: Fn(usize) + Send + Sync,
    {
        validate(chunks)?;

        let mut report = IndexReport::default();
        if chunks.is_empty() {
            info!("nothing to index");
            return Ok(report);
        }

        let dimension = self.embedder.dimension();
        let mut records = stream::iter(chunks)
            .map(|chunk| async move {
                let values = self.embedder.embed(&chunk.text).await?;
                if values.len() != dimension {
                    return Err(PipelineError::Provider(format!(
                        "embedding for '{}' has dimension {}, expected {dimension}",
                        chunk.id,
                        values.len()
                    )));
                }
                Ok(chunk.to_record(values))
            })
            .buffered(self.concurrency);

        let mut batch: Vec<IndexRecord> = Vec::with_capacity(self.batch_size);
        while let Some(record) = records.next().await {
            batch.push(record?);
            if batch.len() == self.batch_size {
                self.flush(&mut batch, &mut report).await?;
                on_progress(report.written);
            }
        }
        if !batch.is_empty() {
            self.flush(&mut batch, &mut report).await?;
            on_progress(report.written);
        }

        info!(written = report.written, batches = report.batches, "indexing complete");
        Ok(report)
    }

    async fn flush(
        &self,
        batch: &mut Vec<IndexRecord>,
        report: &mut IndexReport,
    ) -> PipelineResult<()> {
        let records = std::mem::replace(batch, Vec::with_capacity(self.batch_size));
        let sent = records.len();
        let written = self.index.upsert(records).await?;

        report.written += written;
        report.batches += 1;
        debug!(batch = report.batches, sent, written, "upserted batch");
        Ok(())
    }
}

/// Every chunk must be well formed and ids unique, checked before any network call
fn validate(chunks: &[Chunk]) -> PipelineResult<()> {
    let mut seen = HashSet::with_capacity(chunks.len());
    for chunk in chunks {
        chunk.validate()?;
        if !seen.insert(chunk.id.as_str()) {
            return Err(PipelineError::Corpus(format!(
                "duplicate chunk id '{}'",
                chunk.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Metric;
    use crate::infrastructure::vector::{HashingEmbedder, InMemoryVectorIndex};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const DIM: usize = 32;

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n)
            .map(|i| Chunk::new(format!("chunk_{i}"), format!("passage number {i}")).unwrap())
            .collect()
    }

    fn config(batch_size: usize) -> IndexerConfig {
        IndexerConfig {
            batch_size,
            concurrency: 3,
        }
    }

    /// Counts embed calls; fails on a chosen text
    struct CountingEmbedder {
        inner: HashingEmbedder,
        calls: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    impl CountingEmbedder {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                inner: HashingEmbedder::new(DIM).unwrap(),
                calls: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(text) {
                return Err(PipelineError::Provider("rate limited".to_string()));
            }
            self.inner.embed(text).await
        }

        fn model(&self) -> &str {
            "counting"
        }

        fn dimension(&self) -> usize {
            DIM
        }
    }

    /// Embedder that reports one dimension and returns another
    struct LyingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LyingEmbedder {
        async fn embed(&self, _text: &str) -> PipelineResult<Vec<f32>> {
            Ok(vec![0.5; DIM + 1])
        }

        fn model(&self) -> &str {
            "lying"
        }

        fn dimension(&self) -> usize {
            DIM
        }
    }

    #[tokio::test]
    async fn test_indexes_in_batches() {
        let index = Arc::new(InMemoryVectorIndex::new(DIM, Metric::Cosine));
        let indexer = Indexer::new(
            Arc::new(CountingEmbedder::new(None)),
            index.clone(),
            &config(4),
        );

        let progress = Mutex::new(Vec::new());
        let report = indexer
            .index_with_progress(&chunks(10), |written| progress.lock().unwrap().push(written))
            .await
            .unwrap();

        assert_eq!(report, IndexReport { written: 10, batches: 3 });
        assert_eq!(index.len().await, 10);
        assert_eq!(*progress.lock().unwrap(), vec![4, 8, 10]);
    }

    #[tokio::test]
    async fn test_record_carries_text_metadata() {
        let index = Arc::new(InMemoryVectorIndex::new(DIM, Metric::Cosine));
        let indexer = Indexer::new(Arc::new(HashingEmbedder::new(DIM).unwrap()), index.clone(), &config(100));

        let chunk = Chunk::new("financial_aid_1", "FAFSA must be submitted by March 1.")
            .unwrap()
            .with_metadata("topic", "Financial Aid");
        indexer.index(&[chunk]).await.unwrap();

        let record = &index.fetch(&["financial_aid_1".to_string()]).await.unwrap()[0];
        assert_eq!(record.metadata["text"], "FAFSA must be submitted by March 1.");
        assert_eq!(record.metadata["topic"], "Financial Aid");
    }

    #[tokio::test]
    async fn test_empty_corpus_makes_no_calls() {
        let embedder = Arc::new(CountingEmbedder::new(None));
        let indexer = Indexer::new(
            embedder.clone(),
            Arc::new(InMemoryVectorIndex::new(DIM, Metric::Cosine)),
            &config(100),
        );

        assert_eq!(indexer.index(&[]).await.unwrap(), IndexReport::default());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected_before_embedding() {
        let embedder = Arc::new(CountingEmbedder::new(None));
        let indexer = Indexer::new(
            embedder.clone(),
            Arc::new(InMemoryVectorIndex::new(DIM, Metric::Cosine)),
            &config(100),
        );

        let mut corpus = chunks(3);
        corpus.push(Chunk::new("chunk_1", "same id again").unwrap());

        let err = indexer.index(&corpus).await.unwrap_err();
        assert!(matches!(err, PipelineError::Corpus(ref msg) if msg.contains("chunk_1")));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_run() {
        let index = Arc::new(InMemoryVectorIndex::new(DIM, Metric::Cosine));
        let indexer = Indexer::new(
            Arc::new(CountingEmbedder::new(Some("passage number 5"))),
            index.clone(),
            &config(2),
        );

        let err = indexer.index(&chunks(10)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Provider(_)));
        // Batches before the failure were written
        assert!(index.len().await >= 4);
        assert!(index.len().await < 10);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_provider_error() {
        let indexer = Indexer::new(
            Arc::new(LyingEmbedder),
            Arc::new(InMemoryVectorIndex::new(DIM, Metric::Cosine)),
            &config(100),
        );
        assert!(matches!(
            indexer.index(&chunks(1)).await,
            Err(PipelineError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_reindex_is_idempotent() {
        let index = Arc::new(InMemoryVectorIndex::new(DIM, Metric::Cosine));
        let indexer = Indexer::new(Arc::new(HashingEmbedder::new(DIM).unwrap()), index.clone(), &config(100));

        indexer.index(&chunks(5)).await.unwrap();
        indexer.index(&chunks(5)).await.unwrap();
        assert_eq!(index.len().await, 5);
    }
}
