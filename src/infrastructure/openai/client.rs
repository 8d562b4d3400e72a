use reqwest::{header, Client as ReqwestClient, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::errors::OpenAiError;
use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest, EmbeddingResponse,
    ModelObject,
};
use crate::infrastructure::http::{RetryPolicy, TokenBucketRateLimiter};
use crate::infrastructure::logging::scrub_secrets;

/// Configuration for the OpenAI HTTP client
#[derive(Clone)]
pub struct OpenAiClientConfig {
    /// API key, resolved from the environment by `Credentials`
    pub api_key: String,

    /// Base URL for the API (no trailing `/v1`)
    pub base_url: String,

    /// Rate limit in requests per second
    pub rate_limit_rps: f64,

    /// Requests allowed back to back before throttling
    pub burst_size: u32,

    pub retry_policy: RetryPolicy,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl fmt::Debug for OpenAiClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("rate_limit_rps", &self.rate_limit_rps)
            .field("burst_size", &self.burst_size)
            .field("retry_policy", &self.retry_policy)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP client for the OpenAI embeddings and chat completions endpoints
///
/// Provides:
/// - Connection pooling and reuse
/// - Rate limiting via token bucket algorithm
/// - Exponential backoff retry for transient errors
/// - Per-request timeout
pub struct OpenAiClient {
    http_client: ReqwestClient,
    base_url: String,
    rate_limiter: TokenBucketRateLimiter,
    retry_policy: RetryPolicy,
}

impl OpenAiClient {
    /// Create a new client
    ///
    /// # Errors
    /// `InvalidRequest` if the key cannot be used as a header value,
    /// `NetworkError` if the HTTP client cannot be built
    pub fn new(config: OpenAiClientConfig) -> Result<Self, OpenAiError> {
        debug!(
            base_url = %config.base_url,
            rate_limit_rps = config.rate_limit_rps,
            timeout_secs = config.timeout_secs,
            "initializing OpenAI client"
        );

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| {
                OpenAiError::InvalidRequest("API key contains invalid header characters".to_string())
            })?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()
            .map_err(OpenAiError::NetworkError)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: TokenBucketRateLimiter::new(config.rate_limit_rps, config.burst_size),
            retry_policy: config.retry_policy,
        })
    }

    /// Embed one input
    #[instrument(skip(self, request), fields(model = %request.model, input_len = request.input.len()))]
    pub async fn create_embedding(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, OpenAiError> {
        self.post_json("/v1/embeddings", request).await
    }

    /// Run one chat completion
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenAiError> {
        let response: ChatCompletionResponse =
            self.post_json("/v1/chat/completions", request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion succeeded"
            );
        }

        Ok(response)
    }

    /// Look a model up; fails when the key is rejected or the model is unknown
    #[instrument(skip(self))]
    pub async fn retrieve_model(&self, model: &str) -> Result<ModelObject, OpenAiError> {
        let url = format!("{}/v1/models/{}", self.base_url, model);

        self.retry_policy
            .execute(|| async {
                self.rate_limiter.acquire().await;
                debug!("GET {}", url);
                let response = self.http_client.get(&url).send().await?;
                Self::handle_response(response).await
            })
            .await
    }

    /// Rate-limited, retried POST of a JSON body
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, OpenAiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, path);

        self.retry_policy
            .execute(|| async {
                self.rate_limiter.acquire().await;
                debug!("POST {}", url);
                let response = self.http_client.post(&url).json(body).send().await?;
                Self::handle_response(response).await
            })
            .await
    }

    /// Handle HTTP response and convert to typed result
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, OpenAiError> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            warn!(status = %status, body = %scrub_secrets(&body), "OpenAI API error");
            return Err(OpenAiError::from_status(status, &body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| OpenAiError::MalformedResponse(e.to_string()))
    }
}
