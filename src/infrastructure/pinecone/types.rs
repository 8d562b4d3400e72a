//! Request and response types for the Pinecone REST API
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::domain::models::{IndexDescription, IndexRecord, IndexSpec, Metric, QueryMatch};

/// Vector as sent to `/vectors/upsert`
#[derive(Debug, Clone, Serialize)]
pub struct Vector {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl From<IndexRecord> for Vector {
    fn from(record: IndexRecord) -> Self {
        Self {
            id: record.id,
            values: record.values,
            metadata: record.metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertRequest {
    pub vectors: Vec<Vector>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    #[serde(default)]
    pub upserted_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub include_metadata: bool,
    pub include_values: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<ScoredVector>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoredVector {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl From<ScoredVector> for QueryMatch {
    fn from(v: ScoredVector) -> Self {
        Self {
            id: v.id,
            score: v.score,
            metadata: metadata_to_strings(v.metadata),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub vectors: HashMap<String, FetchedVector>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchedVector {
    pub id: String,
    #[serde(default)]
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl From<FetchedVector> for IndexRecord {
    fn from(v: FetchedVector) -> Self {
        Self {
            id: v.id,
            values: v.values,
            metadata: metadata_to_strings(v.metadata),
        }
    }
}

/// Pinecone metadata values may be numbers, booleans or string lists; the
/// pipeline only writes strings, anything else is rendered as JSON text.
fn metadata_to_strings(metadata: Option<Map<String, Value>>) -> BTreeMap<String, String> {
    metadata
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, v)
        })
        .collect()
}

/// Index description from the control plane
#[derive(Debug, Clone, Deserialize)]
pub struct IndexModel {
    pub name: String,
    pub dimension: usize,
    #[serde(default)]
    pub metric: Option<Metric>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub status: Option<IndexStatus>,
}

impl IndexModel {
    /// Indexes described without a status are taken as ready
    pub fn is_ready(&self) -> bool {
        self.status.as_ref().is_none_or(|s| s.ready)
    }

    pub fn state(&self) -> &str {
        self.status
            .as_ref()
            .and_then(|s| s.state.as_deref())
            .unwrap_or("Unknown")
    }
}

impl From<IndexModel> for IndexDescription {
    fn from(model: IndexModel) -> Self {
        let ready = model.is_ready();
        Self {
            name: model.name,
            dimension: model.dimension,
            metric: model.metric,
            ready,
            host: model.host.filter(|h| !h.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexList {
    #[serde(default)]
    pub indexes: Vec<IndexModel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIndexRequest {
    pub name: String,
    pub dimension: usize,
    pub metric: Metric,
    pub spec: CreateIndexSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIndexSpec {
    pub serverless: ServerlessSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerlessSpec {
    pub cloud: String,
    pub region: String,
}

impl From<&IndexSpec> for CreateIndexRequest {
    fn from(spec: &IndexSpec) -> Self {
        Self {
            name: spec.name.clone(),
            dimension: spec.dimension,
            metric: spec.metric,
            spec: CreateIndexSpec {
                serverless: ServerlessSpec {
                    cloud: spec.cloud.clone(),
                    region: spec.region.clone(),
                },
            },
        }
    }
}
