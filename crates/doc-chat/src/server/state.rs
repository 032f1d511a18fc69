//! Application state for the doc-chat server

use std::sync::Arc;

use crate::config::ChatConfig;
use crate::error::Result;
use crate::ingestion::{LibreOfficeConverter, PdfTextExtractor};
use crate::providers::{
    DocumentConverter, GeminiClient, GoogleTranslateTts, LlmProvider, SpeechSynthesizer,
    TextExtractor,
};
use crate::session::{SessionOrchestrator, SessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: ChatConfig,
    /// Routes session actions to the collaborators
    orchestrator: SessionOrchestrator,
    /// Live sessions
    sessions: SessionStore,
}

impl AppState {
    /// Create state with the production collaborators
    pub fn new(config: ChatConfig) -> Result<Self> {
        tracing::info!("Initializing doc-chat state (model: {})...", config.llm.model);

        let extractor = Arc::new(PdfTextExtractor::new(&config.extraction));
        let converter = Arc::new(LibreOfficeConverter::new(&config.converter));
        let llm = Arc::new(GeminiClient::new(&config.llm)?);
        let speech = Arc::new(GoogleTranslateTts::new(&config.speech)?);

        Ok(Self::with_components(config, extractor, converter, llm, speech))
    }

    /// Create state around the given collaborators
    pub fn with_components(
        config: ChatConfig,
        extractor: Arc<dyn TextExtractor>,
        converter: Arc<dyn DocumentConverter>,
        llm: Arc<dyn LlmProvider>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        tracing::info!(
            "Collaborators: extractor={}, converter={}, llm={}, speech={}",
            extractor.name(),
            converter.name(),
            llm.name(),
            speech.name()
        );

        let orchestrator = SessionOrchestrator::new(extractor, converter, llm, speech)
            .with_preview_chars(config.session.preview_chars)
            .with_default_language(config.speech.default_language.clone());
        let sessions = SessionStore::new(&config.session);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                orchestrator,
                sessions,
            }),
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.inner.config
    }

    pub fn orchestrator(&self) -> &SessionOrchestrator {
        &self.inner.orchestrator
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Ready once a generation API key is configured
    pub fn is_ready(&self) -> bool {
        self.inner
            .config
            .llm
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}
