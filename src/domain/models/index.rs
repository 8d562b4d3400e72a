//! Vector index records, query matches and index provisioning specs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A vector stored in the index, keyed by the originating chunk id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// One nearest-neighbour hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,

    /// Similarity score; higher is closer.
    pub score: f32,

    /// Record metadata, empty when the query did not ask for it.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Similarity metric an index is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
            Self::Dotproduct => "dotproduct",
        };
        f.write_str(name)
    }
}

/// Parameters for creating an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: Metric,
    pub cloud: String,
    pub region: String,
}

/// Outcome of an idempotent create-if-missing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provisioned {
    Created,
    AlreadyExists,
}

/// What the vector store reports about an existing index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,

    /// Whether the index accepts reads and writes yet.
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Metric::Dotproduct).unwrap(), r#""dotproduct""#);
        let metric: Metric = serde_json::from_str(r#""cosine""#).unwrap();
        assert_eq!(metric, Metric::Cosine);
        assert_eq!(Metric::Euclidean.to_string(), "euclidean");
    }
}
