//! Generation request/response types

use serde::{Deserialize, Serialize};

/// One round-trip to the generation API. Built fresh per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Document text the question is about (None for general queries)
    pub context_text: Option<String>,
    /// The user's question or message
    pub user_message: String,
}

impl GenerationRequest {
    /// Question about a document
    pub fn with_context(context_text: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            context_text: Some(context_text.into()),
            user_message: question.into(),
        }
    }

    /// Standalone message, no document
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            context_text: None,
            user_message: message.into(),
        }
    }

    /// True if a document is attached
    pub fn has_context(&self) -> bool {
        self.context_text.is_some()
    }
}

/// Text returned by the generation API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Response text, unmodified
    pub text: String,
    /// Model that produced it
    pub model: String,
}

impl GenerationResponse {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
        }
    }
}
