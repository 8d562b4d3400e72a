//! Domain models

pub mod answer;
pub mod chat;
pub mod chunk;
pub mod config;
pub mod context;
pub mod index;

pub use answer::Answer;
pub use chat::{ChatMessage, ChatRequest, Role};
pub use chunk::{Chunk, METADATA_SOURCE, METADATA_TEXT, METADATA_TOPIC};
pub use config::{
    Config, CorpusConfig, EmbeddingConfig, GenerationConfig, IndexerConfig, LoggingConfig,
    RateLimitConfig, RetrievalConfig, RetryConfig, VectorIndexConfig,
};
pub use context::{AnswerContext, RetrievedPassage};
pub use index::{IndexDescription, IndexRecord, IndexSpec, Metric, Provisioned, QueryMatch};
