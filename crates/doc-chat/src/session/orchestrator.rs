//! Session orchestrator: routes user actions to the collaborators and keeps
//! the session's two slots (loaded document, last response) up to date.
//!
//! A failed action never touches the slots.

use std::sync::Arc;

use super::SessionState;
use crate::error::{Error, Result};
use crate::generation::QueryDispatcher;
use crate::providers::{DocumentConverter, LlmProvider, SpeechSynthesizer, TextExtractor};
use crate::types::response::PdfPreview;
use crate::types::{AudioClip, ConvertedDocument, DocumentKind, GenerationResponse, UploadedDocument};

const DEFAULT_PREVIEW_CHARS: usize = 1500;
const DEFAULT_LANGUAGE: &str = "en";

#[derive(Clone)]
pub struct SessionOrchestrator {
    extractor: Arc<dyn TextExtractor>,
    converter: Arc<dyn DocumentConverter>,
    dispatcher: QueryDispatcher,
    speech: Arc<dyn SpeechSynthesizer>,
    preview_chars: usize,
    default_language: String,
}

impl SessionOrchestrator {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        converter: Arc<dyn DocumentConverter>,
        llm: Arc<dyn LlmProvider>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            extractor,
            converter,
            dispatcher: QueryDispatcher::new(llm),
            speech,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Characters of extracted text returned as the upload preview
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    /// Language spoken when a speech request names none
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn extractor(&self) -> &Arc<dyn TextExtractor> {
        &self.extractor
    }

    pub fn converter(&self) -> &Arc<dyn DocumentConverter> {
        &self.converter
    }

    pub fn dispatcher(&self) -> &QueryDispatcher {
        &self.dispatcher
    }

    pub fn speech(&self) -> &Arc<dyn SpeechSynthesizer> {
        &self.speech
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Extract a PDF and make it the session's document
    pub async fn on_pdf_upload(
        &self,
        state: &mut SessionState,
        document: &UploadedDocument,
    ) -> Result<PdfPreview> {
        document.expect_kind(DocumentKind::Pdf)?;

        let extracted = self.extractor.extract(document).await?;
        let preview = PdfPreview::from_extracted(&extracted, self.preview_chars);

        if let Some(previous) = state.extracted.replace(extracted) {
            tracing::debug!("Replaced loaded document '{}'", previous.filename);
        }

        Ok(preview)
    }

    /// Ask about the loaded document; the answer becomes the last response
    pub async fn on_document_question(
        &self,
        state: &mut SessionState,
        question: &str,
    ) -> Result<GenerationResponse> {
        let extracted = state.extracted.as_ref().ok_or(Error::NoDocumentLoaded)?;

        let response = self
            .dispatcher
            .answer_from_document(&extracted.text, question)
            .await?;

        state.last_response = Some(response.clone());
        Ok(response)
    }

    /// Convert a DOCX to PDF for download. Session state is not involved.
    pub async fn on_docx_upload(&self, document: &UploadedDocument) -> Result<ConvertedDocument> {
        document.expect_kind(DocumentKind::Docx)?;
        self.converter.convert(document).await
    }

    /// Standalone query, never grounded in the loaded document
    pub async fn on_general_query(
        &self,
        state: &mut SessionState,
        message: &str,
    ) -> Result<GenerationResponse> {
        let response = self.dispatcher.answer_general(message).await?;

        state.last_response = Some(response.clone());
        Ok(response)
    }

    /// Speak the most recent response
    pub async fn on_speech_requested(
        &self,
        state: &SessionState,
        language: Option<&str>,
    ) -> Result<AudioClip> {
        let response = state
            .last_response
            .as_ref()
            .ok_or(Error::NoResponseAvailable)?;

        let language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_language.as_str());

        tracing::info!(
            "Speaking {} chars in '{}' via {}",
            response.text.len(),
            language,
            self.speech.name()
        );
        self.speech.synthesize(&response.text, language).await
    }
}
