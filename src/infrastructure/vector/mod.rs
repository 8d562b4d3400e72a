//! Offline vector adapters
//!
//! Used when running with `--offline` and by the pipeline tests.

pub mod hashing_embedder;
pub mod memory_index;

pub use hashing_embedder::HashingEmbedder;
pub use memory_index::InMemoryVectorIndex;
