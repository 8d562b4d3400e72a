//! Pipeline services
//!
//! Each service is built once at startup with its ports injected as
//! `Arc<dyn Port>`, and is stateless across calls.

pub mod advisor;
pub mod answerer;
pub mod indexer;
pub mod prompt;
pub mod retriever;

pub use advisor::Advisor;
pub use answerer::Answerer;
pub use indexer::{IndexReport, Indexer};
pub use prompt::PromptBuilder;
pub use retriever::Retriever;
