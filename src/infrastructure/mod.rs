//! Infrastructure layer module
//!
//! Adapters for the domain ports and external integrations:
//! - OpenAI embeddings and chat completions
//! - Pinecone vector index (control and data plane)
//! - Offline vector adapters
//! - Corpus files
//! - Configuration, credentials and logging
//!
//! `backends` wires the adapters into the pipeline services; `status` checks
//! that the providers they point at are usable.

pub mod backends;
pub mod config;
pub mod corpus;
pub mod credentials;
pub mod http;
pub mod logging;
pub mod openai;
pub mod pinecone;
pub mod setup;
pub mod status;
pub mod vector;
