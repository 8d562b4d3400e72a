use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::client::{normalize_host, PineconeTransport};
use super::types::{FetchResponse, QueryRequest, QueryResponse, UpsertRequest, UpsertResponse, Vector};
use crate::domain::errors::PipelineResult;
use crate::domain::models::{IndexRecord, QueryMatch};
use crate::domain::ports::VectorIndex;

/// Data plane of one Pinecone index
pub struct PineconeIndex {
    transport: Arc<PineconeTransport>,
    host: String,
    namespace: String,
}

impl PineconeIndex {
    /// `host` is the index host as reported by the control plane; a missing
    /// scheme defaults to https
    pub fn new(
        transport: Arc<PineconeTransport>,
        host: &str,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            host: normalize_host(host),
            namespace: namespace.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, records), fields(count = records.len(), namespace = %self.namespace))]
    async fn upsert(&self, records: Vec<IndexRecord>) -> PipelineResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let request = UpsertRequest {
            vectors: records.into_iter().map(Vector::from).collect(),
            namespace: self.namespace.clone(),
        };
        let url = format!("{}/vectors/upsert", self.host);

        let response: UpsertResponse = self
            .transport
            .send(|http| http.post(&url).json(&request))
            .await?;

        debug!(upserted = response.upserted_count, "upsert acknowledged");
        Ok(response.upserted_count)
    }

    #[instrument(skip(self, vector), fields(top_k, namespace = %self.namespace))]
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> PipelineResult<Vec<QueryMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let request = QueryRequest {
            vector: vector.to_vec(),
            top_k,
            include_metadata,
            include_values: false,
            namespace: self.namespace.clone(),
        };
        let url = format!("{}/query", self.host);

        let response: QueryResponse = self
            .transport
            .send(|http| http.post(&url).json(&request))
            .await?;

        let mut matches: Vec<QueryMatch> =
            response.matches.into_iter().map(QueryMatch::from).collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);

        debug!(matches = matches.len(), "query returned");
        Ok(matches)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn fetch(&self, ids: &[String]) -> PipelineResult<Vec<IndexRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut params: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_str())).collect();
        if !self.namespace.is_empty() {
            params.push(("namespace", self.namespace.as_str()));
        }
        let url = format!("{}/vectors/fetch", self.host);

        let mut response: FetchResponse = self
            .transport
            .send(|http| http.get(&url).query(&params))
            .await?;

        Ok(ids
            .iter()
            .filter_map(|id| response.vectors.remove(id))
            .map(IndexRecord::from)
            .collect())
    }
}
