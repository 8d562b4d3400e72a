//! Prompt assembly for the answerer.

use crate::domain::models::{AnswerContext, ChatMessage, ChatRequest};

/// Told to the model in place of a context block when retrieval found nothing
pub const NO_CONTEXT_NOTICE: &str = "No reference material was found for this question.";

/// Builds the system and user messages sent to the generative model
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    institution: String,
}

impl PromptBuilder {
    pub fn new(institution: impl Into<String>) -> Self {
        Self {
            institution: institution.into(),
        }
    }

    /// Advisor persona and grounding rules
    pub fn system_prompt(&self) -> String {
        format!(
            "You are Pounce, the {institution} Panther Chatbot, an academic advising assistant \
             for {institution} students.\n\
             \n\
             Answer the student's question using only the reference information provided \
             with it. Keep answers concise but informative, and stay friendly and professional. \
             If the reference information does not contain the answer, say \"I don't know\" \
             and suggest contacting an academic advisor.",
            institution = self.institution
        )
    }

    /// Reference information followed by the question
    pub fn user_prompt(&self, question: &str, context: &AnswerContext) -> String {
        let reference = if context.is_empty() {
            NO_CONTEXT_NOTICE.to_string()
        } else {
            context.text()
        };

        format!(
            "Use the following information to answer the question:\n\n{reference}\n\n\
             Question: {question}\nAnswer:"
        )
    }

    /// Deterministic single-turn request
    pub fn build(&self, question: &str, context: &AnswerContext, max_tokens: u32) -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system(self.system_prompt()),
                ChatMessage::user(self.user_prompt(question, context)),
            ],
            temperature: 0.0,
            max_tokens,
        }
    }
}
