use reqwest::{header, Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::PineconeError;
use crate::infrastructure::http::{RetryPolicy, TokenBucketRateLimiter};
use crate::infrastructure::logging::scrub_secrets;

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";

/// Configuration shared by the control and data plane clients
#[derive(Clone)]
pub struct PineconeClientConfig {
    /// API key, resolved from the environment by `Credentials`
    pub api_key: String,

    /// Value of the `X-Pinecone-API-Version` header
    pub api_version: String,

    pub rate_limit_rps: f64,
    pub burst_size: u32,
    pub retry_policy: RetryPolicy,
    pub timeout_secs: u64,
}

impl fmt::Debug for PineconeClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PineconeClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("rate_limit_rps", &self.rate_limit_rps)
            .field("burst_size", &self.burst_size)
            .field("retry_policy", &self.retry_policy)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Authenticated, rate-limited and retried HTTP transport for Pinecone
///
/// One transport is shared by `PineconeControl` and `PineconeIndex` so both
/// planes draw from the same token bucket.
pub struct PineconeTransport {
    http_client: ReqwestClient,
    rate_limiter: TokenBucketRateLimiter,
    retry_policy: RetryPolicy,
}

impl PineconeTransport {
    pub fn new(config: PineconeClientConfig) -> Result<Self, PineconeError> {
        debug!(
            api_version = %config.api_version,
            rate_limit_rps = config.rate_limit_rps,
            timeout_secs = config.timeout_secs,
            "initializing Pinecone transport"
        );

        let mut api_key = header::HeaderValue::from_str(&config.api_key).map_err(|_| {
            PineconeError::InvalidRequest("API key contains invalid header characters".to_string())
        })?;
        api_key.set_sensitive(true);

        let api_version = header::HeaderValue::from_str(&config.api_version).map_err(|_| {
            PineconeError::InvalidRequest(format!("invalid API version '{}'", config.api_version))
        })?;

        let mut headers = header::HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(API_VERSION_HEADER, api_version);
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
            .map_err(PineconeError::NetworkError)?;

        Ok(Self {
            http_client,
            rate_limiter: TokenBucketRateLimiter::new(config.rate_limit_rps, config.burst_size),
            retry_policy: config.retry_policy,
        })
    }

    /// Send a request built fresh for every attempt and decode the JSON reply
    pub async fn send<T, F>(&self, build: F) -> Result<T, PineconeError>
    where
        T: DeserializeOwned + Send,
        F: Fn(&ReqwestClient) -> RequestBuilder + Sync,
    {
        self.retry_policy
            .execute(|| async {
                self.rate_limiter.acquire().await;
                let response = build(&self.http_client).send().await?;
                Self::handle_response(response).await
            })
            .await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, PineconeError> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            warn!(status = %status, body = %scrub_secrets(&body), "Pinecone API error");
            return Err(PineconeError::from_status(status, &body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| PineconeError::MalformedResponse(e.to_string()))
    }
}

/// Index hosts are reported without a scheme
pub(crate) fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
