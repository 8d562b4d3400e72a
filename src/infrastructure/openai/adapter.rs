use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::client::OpenAiClient;
use super::types::{ChatCompletionRequest, EmbeddingRequest};
use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::models::ChatRequest;
use crate::domain::ports::{ChatModel, EmbeddingProvider};

/// `EmbeddingProvider` backed by the OpenAI embeddings endpoint
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(client: Arc<OpenAiClient>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client,
            model: model.into(),
            dimension,
        }
    }

    /// `dimensions` value for the request; ada models reject the parameter
    fn requested_dimensions(&self) -> Option<usize> {
        if self.model.starts_with("text-embedding-ada") {
            None
        } else {
            Some(self.dimension)
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: text.to_string(),
            dimensions: self.requested_dimensions(),
        };

        let response = self
            .client
            .create_embedding(&request)
            .await
            .map_err(|e| PipelineError::Provider(format!("embedding request failed: {e}")))?;

        let embedding = response.into_first_embedding().ok_or_else(|| {
            PipelineError::Provider("embedding response contained no vectors".to_string())
        })?;

        if embedding.len() != self.dimension {
            return Err(PipelineError::Provider(format!(
                "model {} returned {} dimensions, expected {}",
                self.model,
                embedding.len(),
                self.dimension
            )));
        }

        debug!(dimension = embedding.len(), "embedded text");
        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn health_check(&self) -> PipelineResult<()> {
        check_model(&self.client, &self.model).await
    }
}

/// `ChatModel` backed by the OpenAI chat completions endpoint
pub struct OpenAiChatModel {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(client: Arc<OpenAiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, request: ChatRequest) -> PipelineResult<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: Some(request.max_tokens),
        };

        let response = self
            .client
            .create_chat_completion(&request)
            .await
            .map_err(|e| PipelineError::Provider(format!("chat completion failed: {e}")))?;

        response
            .first_content()
            .map(ToString::to_string)
            .ok_or_else(|| PipelineError::Provider("chat completion returned no content".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> PipelineResult<()> {
        check_model(&self.client, &self.model).await
    }
}

async fn check_model(client: &OpenAiClient, model: &str) -> PipelineResult<()> {
    client
        .retrieve_model(model)
        .await
        .map(|_| ())
        .map_err(|e| PipelineError::Provider(format!("model {model} unavailable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::RetryPolicy;
    use crate::infrastructure::openai::OpenAiClientConfig;

    fn client() -> Arc<OpenAiClient> {
        Arc::new(
            OpenAiClient::new(OpenAiClientConfig {
                api_key: "sk-test-key".to_string(),
                base_url: "http://localhost:1".to_string(),
                rate_limit_rps: 5.0,
                burst_size: 5,
                retry_policy: RetryPolicy::new(0, 1, 5),
                timeout_secs: 1,
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_v3_models_request_configured_dimension() {
        let embedder = OpenAiEmbedder::new(client(), "text-embedding-3-small", 512);
        assert_eq!(embedder.requested_dimensions(), Some(512));
    }

    #[test]
    fn test_ada_models_omit_dimensions() {
        let embedder = OpenAiEmbedder::new(client(), "text-embedding-ada-002", 1536);
        assert_eq!(embedder.requested_dimensions(), None);

        let request = EmbeddingRequest {
            model: "text-embedding-ada-002".to_string(),
            input: "x".to_string(),
            dimensions: embedder.requested_dimensions(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("dimensions").is_none());
    }
}
