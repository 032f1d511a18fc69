//! Per-session state and the actions a session can take

pub mod orchestrator;
pub mod store;

pub use orchestrator::SessionOrchestrator;
pub use store::{SessionHandle, SessionStore};

use crate::types::{ExtractedText, GenerationResponse};

/// What a session remembers between actions
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Text of the most recently uploaded PDF
    pub extracted: Option<ExtractedText>,
    /// Most recent answer, document or general
    pub last_response: Option<GenerationResponse>,
}

impl SessionState {
    pub fn has_document(&self) -> bool {
        self.extracted.is_some()
    }

    pub fn has_response(&self) -> bool {
        self.last_response.is_some()
    }
}
