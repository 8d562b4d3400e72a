//! In-process vector index.
//!
//! Brute-force scoring over every stored record. Used for offline runs and as
//! the index behind the pipeline tests; it honours the same contract as the
//! hosted index (overwrite by id, bounded ordered results, dimension checks).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::models::{
    IndexDescription, IndexRecord, IndexSpec, Metric, Provisioned, QueryMatch,
};
use crate::domain::ports::{IndexProvisioner, VectorIndex};

pub struct InMemoryVectorIndex {
    dimension: usize,
    metric: Metric,
    records: RwLock<HashMap<String, IndexRecord>>,
    provisioned: AtomicBool,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize, metric: Metric) -> Self {
        Self {
            dimension,
            metric,
            records: RwLock::new(HashMap::new()),
            provisioned: AtomicBool::new(false),
        }
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_dimension(&self, what: &str, len: usize) -> PipelineResult<()> {
        if len == self.dimension {
            Ok(())
        } else {
            Err(PipelineError::Index(format!(
                "{what} has dimension {len}, index expects {}",
                self.dimension
            )))
        }
    }

    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.metric {
            Metric::Cosine => cosine_similarity(a, b),
            Metric::Dotproduct => dot(a, b),
            // Map distance into (0, 1] so that higher stays closer
            Metric::Euclidean => {
                let d: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt();
                1.0 / (1.0 + d)
            }
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, records: Vec<IndexRecord>) -> PipelineResult<usize> {
        for record in &records {
            self.check_dimension(&format!("record '{}'", record.id), record.values.len())?;
        }

        let count = records.len();
        let mut store = self.records.write().await;
        for record in records {
            store.insert(record.id.clone(), record);
        }
        debug!(count, total = store.len(), "upserted records");
        Ok(count)
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> PipelineResult<Vec<QueryMatch>> {
        self.check_dimension("query vector", vector.len())?;

        let store = self.records.read().await;
        let mut scored: Vec<(f32, &IndexRecord)> = store
            .values()
            .map(|record| (self.score(vector, &record.values), record))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, record)| QueryMatch {
                id: record.id.clone(),
                score,
                metadata: if include_metadata {
                    record.metadata.clone()
                } else {
                    Default::default()
                },
            })
            .collect())
    }

    async fn fetch(&self, ids: &[String]) -> PipelineResult<Vec<IndexRecord>> {
        let store = self.records.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }
}

#[async_trait]
impl IndexProvisioner for InMemoryVectorIndex {
    async fn ensure_index(&self, spec: &IndexSpec) -> PipelineResult<Provisioned> {
        self.check_dimension(&format!("index '{}'", spec.name), spec.dimension)?;
        if spec.metric != self.metric {
            return Err(PipelineError::Index(format!(
                "index '{}' uses metric {}, requested {}",
                spec.name, self.metric, spec.metric
            )));
        }

        if self.provisioned.swap(true, Ordering::SeqCst) {
            Ok(Provisioned::AlreadyExists)
        } else {
            Ok(Provisioned::Created)
        }
    }

    async fn describe(&self, name: &str) -> PipelineResult<Option<IndexDescription>> {
        if !self.provisioned.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(IndexDescription {
            name: name.to_string(),
            dimension: self.dimension,
            metric: Some(self.metric),
            ready: true,
            host: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(id: &str, values: Vec<f32>, text: &str) -> IndexRecord {
        let mut metadata = BTreeMap::new();
        metadata.insert("text".to_string(), text.to_string());
        IndexRecord {
            id: id.to_string(),
            values,
            metadata,
        }
    }

    #[tokio::test]
    async fn test_query_orders_by_score_and_truncates() {
        let index = InMemoryVectorIndex::new(2, Metric::Cosine);
        index
            .upsert(vec![
                record("east", vec![1.0, 0.0], "e"),
                record("north", vec![0.0, 1.0], "n"),
                record("northeast", vec![1.0, 1.0], "ne"),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.1], 2, true).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "east");
        assert_eq!(matches[1].id, "northeast");
        assert!(matches[0].score >= matches[1].score);
        assert_eq!(matches[0].metadata["text"], "e");
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let index = InMemoryVectorIndex::new(2, Metric::Cosine);
        index.upsert(vec![record("x", vec![1.0, 0.0], "old")]).await.unwrap();
        index.upsert(vec![record("x", vec![0.0, 1.0], "new")]).await.unwrap();

        assert_eq!(index.len().await, 1);
        let fetched = index.fetch(&["x".to_string()]).await.unwrap();
        assert_eq!(fetched[0].metadata["text"], "new");
        assert_eq!(fetched[0].values, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected_without_partial_write() {
        let index = InMemoryVectorIndex::new(2, Metric::Cosine);
        let result = index
            .upsert(vec![
                record("ok", vec![1.0, 0.0], "a"),
                record("bad", vec![1.0, 0.0, 0.0], "b"),
            ])
            .await;

        assert!(matches!(result, Err(PipelineError::Index(_))));
        assert!(index.is_empty().await);
        assert!(index.query(&[1.0], 1, true).await.is_err());
    }

    #[tokio::test]
    async fn test_metadata_omitted_when_not_requested() {
        let index = InMemoryVectorIndex::new(2, Metric::Dotproduct);
        index.upsert(vec![record("a", vec![1.0, 0.0], "a")]).await.unwrap();
        let matches = index.query(&[1.0, 0.0], 5, false).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].metadata.is_empty());
    }

    #[tokio::test]
    async fn test_euclidean_prefers_nearest() {
        let index = InMemoryVectorIndex::new(1, Metric::Euclidean);
        index
            .upsert(vec![record("near", vec![1.0], "n"), record("far", vec![9.0], "f")])
            .await
            .unwrap();
        let matches = index.query(&[0.0], 2, false).await.unwrap();
        assert_eq!(matches[0].id, "near");
    }

    #[tokio::test]
    async fn test_ensure_index_is_idempotent() {
        let index = InMemoryVectorIndex::new(4, Metric::Cosine);
        let spec = IndexSpec {
            name: "gsu-chatbot".to_string(),
            dimension: 4,
            metric: Metric::Cosine,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
        };
        assert_eq!(index.ensure_index(&spec).await.unwrap(), Provisioned::Created);
        assert_eq!(index.ensure_index(&spec).await.unwrap(), Provisioned::AlreadyExists);

        let wrong = IndexSpec {
            dimension: 8,
            ..spec
        };
        assert!(index.ensure_index(&wrong).await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_index_rejects_metric_mismatch() {
        let index = InMemoryVectorIndex::new(4, Metric::Cosine);
        let spec = IndexSpec {
            name: "gsu-chatbot".to_string(),
            dimension: 4,
            metric: Metric::Dotproduct,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
        };
        let err = index.ensure_index(&spec).await.unwrap_err();
        assert!(matches!(err, PipelineError::Index(ref m) if m.contains("metric")));
    }

    #[tokio::test]
    async fn test_describe_reports_provisioned_index() {
        let index = InMemoryVectorIndex::new(4, Metric::Cosine);
        assert!(index.describe("gsu-chatbot").await.unwrap().is_none());

        let spec = IndexSpec {
            name: "gsu-chatbot".to_string(),
            dimension: 4,
            metric: Metric::Cosine,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
        };
        index.ensure_index(&spec).await.unwrap();

        let described = index.describe("gsu-chatbot").await.unwrap().unwrap();
        assert_eq!(described.dimension, 4);
        assert_eq!(described.metric, Some(Metric::Cosine));
        assert!(described.ready);
    }
}
