//! Pounce - a retrieval-augmented academic advising assistant
//!
//! Questions are embedded, matched against a vector index of advising
//! material, and answered by a generative model grounded on the matched
//! passages.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the provider ports
//! - **Service Layer** (`services`): indexing, retrieval, answering and the advisor pipeline
//! - **Infrastructure Layer** (`infrastructure`): OpenAI and Pinecone adapters, offline
//!   backends, corpus files, configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use pounce::infrastructure::backends::{chat_model, Backends};
//! use pounce::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let backends = Backends::hosted(&config)?;
//!     let advisor = backends.advisor(chat_model(&config)?).await?;
//!     let answer = advisor.ask("When must the FAFSA be submitted?").await?;
//!     println!("{}", answer.text);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{PipelineError, PipelineResult};
pub use domain::models::{
    Answer, AnswerContext, Chunk, Config, IndexRecord, IndexSpec, Metric, Provisioned, QueryMatch,
    RetrievedPassage,
};
pub use domain::ports::{ChatModel, EmbeddingProvider, IndexProvisioner, VectorIndex};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Advisor, Answerer, IndexReport, Indexer, PromptBuilder, Retriever};
