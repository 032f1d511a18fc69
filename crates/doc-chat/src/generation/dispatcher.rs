//! Query dispatch: turns user input into generation requests

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::types::{GenerationRequest, GenerationResponse};

/// Sends document questions and general queries to the LLM provider
#[derive(Clone)]
pub struct QueryDispatcher {
    llm: Arc<dyn LlmProvider>,
}

impl QueryDispatcher {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Underlying provider
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Answer a question about `context_text` (the full document text)
    pub async fn answer_from_document(
        &self,
        context_text: &str,
        question: &str,
    ) -> Result<GenerationResponse> {
        let question = require_text(question, "question")?;
        tracing::info!(
            "Document query: {} chars, {} chars of context",
            question.chars().count(),
            context_text.chars().count()
        );
        tracing::debug!("Question: {:?}", question);
        self.dispatch(GenerationRequest::with_context(context_text, question))
            .await
    }

    /// Answer a standalone message, no document attached
    pub async fn answer_general(&self, message: &str) -> Result<GenerationResponse> {
        let message = require_text(message, "message")?;
        tracing::info!("General query: {} chars", message.chars().count());
        tracing::debug!("Message: {:?}", message);
        self.dispatch(GenerationRequest::general(message)).await
    }

    async fn dispatch(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let start = Instant::now();
        let response = self.llm.generate(&request).await?;
        tracing::info!(
            "{} ({}) answered in {}ms, {} chars",
            self.llm.name(),
            response.model,
            start.elapsed().as_millis(),
            response.text.chars().count()
        );
        Ok(response)
    }
}

/// Reject blank input; the text itself is passed on untrimmed
fn require_text<'a>(text: &'a str, field: &str) -> Result<&'a str> {
    if text.trim().is_empty() {
        return Err(Error::invalid_input(format!("{} must not be empty", field)));
    }
    Ok(text)
}
