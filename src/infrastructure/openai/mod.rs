//! OpenAI-compatible embeddings and chat completions
//!
//! `OpenAiClient` speaks HTTP; `OpenAiEmbedder` and `OpenAiChatModel` adapt it
//! to the pipeline's `EmbeddingProvider` and `ChatModel` ports.

pub mod adapter;
pub mod client;
pub mod errors;
pub mod types;

pub use adapter::{OpenAiChatModel, OpenAiEmbedder};
pub use client::{OpenAiClient, OpenAiClientConfig};
pub use errors::OpenAiError;
pub use types::{
    ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest, EmbeddingResponse,
    ModelObject,
};
