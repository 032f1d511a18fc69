//! Prompt templates for document and general queries

use crate::error::{Error, Result};
use crate::types::GenerationRequest;

/// Prompt builder
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the prompt sent to the model for a request
    pub fn build(request: &GenerationRequest) -> String {
        match &request.context_text {
            Some(context) => Self::document_prompt(context, &request.user_message),
            None => request.user_message.clone(),
        }
    }

    /// Embed the whole document text followed by the question. The text is
    /// never truncated or chunked.
    pub fn document_prompt(context: &str, question: &str) -> String {
        format!(
            "Given the following text from a PDF:\n\n{}\n\nAnswer this question: {}",
            context, question
        )
    }

    /// Fail with `PromptTooLarge` if the prompt exceeds `limit` characters
    pub fn ensure_within_limit(prompt: &str, limit: usize) -> Result<()> {
        // Byte length bounds the character count from above
        if prompt.len() <= limit {
            return Ok(());
        }
        let size = prompt.chars().count();
        if size > limit {
            return Err(Error::PromptTooLarge { size, limit });
        }
        Ok(())
    }
}
