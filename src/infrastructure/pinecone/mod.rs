//! Pinecone vector index over its REST API
//!
//! - `client`: shared transport (auth headers, rate limiting, retry)
//! - `index`: data plane (`upsert`, `query`, `fetch`) implementing `VectorIndex`
//! - `control`: control plane (list/describe/create) implementing `IndexProvisioner`

pub mod client;
pub mod control;
pub mod errors;
pub mod index;
pub mod types;

pub use client::{PineconeClientConfig, PineconeTransport};
pub use control::{PineconeControl, DEFAULT_POLL_INTERVAL};
pub use errors::PineconeError;
pub use index::PineconeIndex;
