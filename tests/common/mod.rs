//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use pounce::domain::errors::{PipelineError, PipelineResult};
use pounce::domain::models::{Chunk, ChatRequest, Config, Metric};
use pounce::domain::ports::ChatModel;
use pounce::infrastructure::vector::{HashingEmbedder, InMemoryVectorIndex};
use pounce::services::{Advisor, Answerer, Indexer, PromptBuilder, Retriever};

pub const DIMENSION: usize = 256;

/// Chat model that returns a fixed reply and records every request
pub struct ScriptedModel {
    reply: Result<String, String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The user turn of the most recent request
    pub fn last_user_prompt(&self) -> String {
        self.requests()
            .last()
            .and_then(|r| r.messages.last())
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: ChatRequest) -> PipelineResult<String> {
        self.requests.lock().unwrap().push(request);
        self.reply.clone().map_err(PipelineError::Provider)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Offline pipeline over one shared in-memory index
pub struct OfflinePipeline {
    pub embedder: Arc<HashingEmbedder>,
    pub index: Arc<InMemoryVectorIndex>,
}

impl OfflinePipeline {
    pub fn new() -> Self {
        Self {
            embedder: Arc::new(HashingEmbedder::new(DIMENSION).unwrap()),
            index: Arc::new(InMemoryVectorIndex::new(DIMENSION, Metric::Cosine)),
        }
    }

    pub fn indexer(&self) -> Indexer {
        let mut config = Config::default().indexer;
        config.batch_size = 2;
        Indexer::new(self.embedder.clone(), self.index.clone(), &config)
    }

    pub fn retriever(&self) -> Retriever {
        Retriever::new(self.embedder.clone(), self.index.clone())
    }

    pub fn advisor(&self, model: Arc<ScriptedModel>, top_k: usize) -> Advisor {
        let answerer = Answerer::new(model, PromptBuilder::new("Georgia State University"), 256);
        Advisor::new(self.retriever(), answerer, top_k)
    }
}

pub fn chunk(id: &str, text: &str) -> Chunk {
    Chunk::new(id, text).unwrap()
}

/// The advising passages used across the pipeline tests
pub fn advising_corpus() -> Vec<Chunk> {
    vec![
        chunk(
            "cs_degree_req_1",
            "Computer Science majors must complete CSC 1301 and CSC 1302 with a grade of C or better.",
        )
        .with_metadata("source", "cs_degree_requirements")
        .with_metadata("topic", "degree requirements"),
        chunk(
            "cs_degree_req_2",
            "Upper division CS courses require MATH 2212 Calculus II as a prerequisite.",
        )
        .with_metadata("source", "cs_degree_requirements"),
        chunk(
            "financial_aid_1",
            "The FAFSA must be submitted by March 1 to be considered for priority financial aid.",
        )
        .with_metadata("source", "financial_aid")
        .with_metadata("topic", "financial aid"),
        chunk(
            "advising_hours",
            "Academic advisors hold walk-in hours every Tuesday and Thursday afternoon.",
        ),
    ]
}
