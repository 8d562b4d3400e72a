use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::index::Metric;

/// Main configuration structure for Pounce
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Generative model configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Hosted vector index configuration
    #[serde(default)]
    pub vector_index: VectorIndexConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Indexing run configuration
    #[serde(default)]
    pub indexer: IndexerConfig,

    /// Chunk corpus location
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Outbound rate limiting, applied per provider client
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry policy for transient provider failures
    #[serde(default)]
    pub retry: RetryConfig,
}

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Embedding provider configuration
///
/// The same model and dimension are used at index time and at query time;
/// similarity scores are meaningless otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension produced by `model`
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_openai_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

const fn default_dimension() -> usize {
    1536
}

fn default_openai_url() -> String {
    DEFAULT_OPENAI_URL.to_string()
}

fn default_openai_key_env() -> String {
    DEFAULT_OPENAI_KEY_ENV.to_string()
}

const fn default_embedding_timeout() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_dimension(),
            base_url: default_openai_url(),
            api_key_env: default_openai_key_env(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Chat model name
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_openai_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,

    /// Maximum tokens to generate per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Institution named in the advisor persona
    #[serde(default = "default_institution")]
    pub institution: String,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

fn default_generation_model() -> String {
    "gpt-4o-mini".to_string()
}

const fn default_max_tokens() -> u32 {
    500
}

fn default_institution() -> String {
    "Georgia State University".to_string()
}

const fn default_generation_timeout() -> u64 {
    60
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            base_url: default_openai_url(),
            api_key_env: default_openai_key_env(),
            max_tokens: default_max_tokens(),
            institution: default_institution(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

/// Hosted vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VectorIndexConfig {
    /// Index name
    #[serde(default = "default_index_name")]
    pub name: String,

    /// Namespace records are written to and queried from (empty = default)
    #[serde(default)]
    pub namespace: String,

    /// Similarity metric used when the index is created
    #[serde(default)]
    pub metric: Metric,

    /// Serverless cloud used when the index is created
    #[serde(default = "default_cloud")]
    pub cloud: String,

    /// Serverless region used when the index is created
    #[serde(default = "default_region")]
    pub region: String,

    /// Data-plane host; looked up from the control plane when unset
    #[serde(default)]
    pub host: Option<String>,

    /// Control-plane base URL
    #[serde(default = "default_control_url")]
    pub control_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_index_key_env")]
    pub api_key_env: String,

    /// Value sent in the API version header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_index_timeout")]
    pub timeout_secs: u64,

    /// Seconds provisioning waits for a new index to become ready
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
}

fn default_index_name() -> String {
    "gsu-chatbot".to_string()
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_control_url() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_index_key_env() -> String {
    "PINECONE_API_KEY".to_string()
}

fn default_api_version() -> String {
    "2024-07".to_string()
}

const fn default_index_timeout() -> u64 {
    30
}

const fn default_ready_timeout() -> u64 {
    120
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            namespace: String::new(),
            metric: Metric::default(),
            cloud: default_cloud(),
            region: default_region(),
            host: None,
            control_url: default_control_url(),
            api_key_env: default_index_key_env(),
            api_version: default_api_version(),
            timeout_secs: default_index_timeout(),
            ready_timeout_secs: default_ready_timeout(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetrievalConfig {
    /// Number of nearest passages placed in the prompt
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

const fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// Indexing run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IndexerConfig {
    /// Records per upsert request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Embedding requests kept in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

const fn default_batch_size() -> usize {
    100
}

const fn default_concurrency() -> usize {
    4
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
        }
    }
}

/// Chunk corpus location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CorpusConfig {
    /// Chunk file (JSON/YAML) or directory of chunk files
    #[serde(default = "default_corpus_path")]
    pub path: PathBuf,
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("data/chunks.yaml")
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst size for token bucket
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

const fn default_requests_per_second() -> f64 {
    10.0
}

const fn default_burst_size() -> u32 {
    20
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}
