//! Deterministic feature-hashing embedder.
//!
//! Each lowercase word is hashed into one of `dimension` buckets with a
//! hash-derived sign, and the resulting vector is L2-normalised. Texts sharing
//! vocabulary land close under cosine similarity, which is enough to run the
//! pipeline without network access.

use async_trait::async_trait;
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::ports::EmbeddingProvider;

const MODEL_NAME: &str = "feature-hashing";

pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> PipelineResult<Self> {
        if dimension == 0 {
            return Err(PipelineError::Configuration(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimension];

        for token in tokens(text) {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let hash = hasher.finish();

            #[allow(clippy::cast_possible_truncation)]
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        let magnitude = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }
        embedding
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn model(&self) -> &str {
        MODEL_NAME
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
