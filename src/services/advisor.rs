//! The question-answering pipeline: retrieve, then answer.

use chrono::Utc;
use tracing::{info, instrument};

use super::answerer::Answerer;
use super::retriever::Retriever;
use crate::domain::errors::PipelineResult;
use crate::domain::models::{Answer, AnswerContext};

/// Answers questions by retrieving the top passages and handing them to an [`Answerer`]
pub struct Advisor {
    retriever: Retriever,
    answerer: Answerer,
    top_k: usize,
}

impl Advisor {
    pub const fn new(retriever: Retriever, answerer: Answerer, top_k: usize) -> Self {
        Self {
            retriever,
            answerer,
            top_k,
        }
    }

    /// Retrieval only, with the configured `top_k`
    pub async fn search(&self, question: &str) -> PipelineResult<AnswerContext> {
        self.retriever.retrieve(question, self.top_k).await
    }

    #[instrument(skip_all, fields(top_k = self.top_k))]
    pub async fn ask(&self, question: &str) -> PipelineResult<Answer> {
        let context = self.search(question).await?;
        let text = self.answerer.answer(question, &context).await?;

        let has_context = !context.is_empty();
        info!(has_context, sources = context.len(), "question answered");

        Ok(Answer {
            question: question.trim().to_string(),
            text,
            sources: context.into_passages(),
            has_context,
            model: self.answerer.model_name().to_string(),
            answered_at: Utc::now(),
        })
    }
}
