//! Answer generation from a question and its retrieved context.

use std::sync::Arc;
use tracing::{debug, instrument};

use super::prompt::PromptBuilder;
use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::models::AnswerContext;
use crate::domain::ports::ChatModel;

/// Generates a grounded answer from the retrieved context at temperature 0
pub struct Answerer {
    model: Arc<dyn ChatModel>,
    prompt: PromptBuilder,
    max_tokens: u32,
}

impl Answerer {
    pub fn new(model: Arc<dyn ChatModel>, prompt: PromptBuilder, max_tokens: u32) -> Self {
        Self {
            model,
            prompt,
            max_tokens,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Generate an answer at temperature 0
    ///
    /// An empty context is not an error: the model is told no reference
    /// material was found. Every provider failure and an empty completion
    /// surface as `GenerationFailed`.
    #[instrument(skip_all, fields(model = %self.model.model(), passages = context.len()))]
    pub async fn answer(&self, question: &str, context: &AnswerContext) -> PipelineResult<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::InvalidInput(
                "question cannot be empty".to_string(),
            ));
        }

        let request = self.prompt.build(question, context, self.max_tokens);
        let text = self
            .model
            .complete(request)
            .await
            .map_err(|e| PipelineError::GenerationFailed(e.to_string()))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(PipelineError::GenerationFailed(
                "model returned an empty answer".to_string(),
            ));
        }

        debug!(answer_len = text.len(), "answer generated");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ChatRequest, RetrievedPassage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a fixed reply and records the last request
    struct ScriptedModel {
        reply: PipelineResult<String>,
        last: Mutex<Option<ChatRequest>>,
    }

    impl ScriptedModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                last: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(PipelineError::Provider("429 insufficient_quota".to_string())),
                last: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, request: ChatRequest) -> PipelineResult<String> {
            *self.last.lock().unwrap() = Some(request);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(PipelineError::Provider(e.to_string())),
            }
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn answerer(model: Arc<ScriptedModel>) -> Answerer {
        Answerer::new(model, PromptBuilder::new("Georgia State University"), 200)
    }

    fn context() -> AnswerContext {
        AnswerContext::new(vec![RetrievedPassage {
            id: "financial_aid_1".to_string(),
            score: 0.8,
            text: "FAFSA must be submitted by March 1.".to_string(),
            source: None,
            topic: None,
        }])
    }

    #[tokio::test]
    async fn test_answer_is_trimmed_and_uses_context() {
        let model = Arc::new(ScriptedModel::replying("  The deadline is March 1.\n"));
        let answer = answerer(model.clone())
            .answer("When is the FAFSA deadline?", &context())
            .await
            .unwrap();

        assert_eq!(answer, "The deadline is March 1.");
        let request = model.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_tokens, 200);
        assert!(request.messages[1].content.contains("March 1"));
    }

    #[tokio::test]
    async fn test_empty_context_still_calls_model() {
        let model = Arc::new(ScriptedModel::replying("I don't know."));
        let answer = answerer(model.clone())
            .answer("Where do I park?", &AnswerContext::empty())
            .await
            .unwrap();

        assert_eq!(answer, "I don't know.");
        assert!(model.last.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_generation_failed() {
        let err = answerer(Arc::new(ScriptedModel::failing()))
            .answer("When is the FAFSA deadline?", &context())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::GenerationFailed(ref m) if m.contains("insufficient_quota")));
    }

    #[tokio::test]
    async fn test_blank_completion_is_generation_failed() {
        let err = answerer(Arc::new(ScriptedModel::replying("   ")))
            .answer("When is the FAFSA deadline?", &context())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::GenerationFailed(_)));
    }
}
