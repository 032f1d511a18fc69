//! Test doubles shared by unit tests

use async_trait::async_trait;
use axum::Router;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{DocumentConverter, LlmProvider, SpeechSynthesizer, TextExtractor};
use crate::session::SessionOrchestrator;
use crate::types::{
    AudioClip, ConvertedDocument, ExtractedText, GenerationRequest, GenerationResponse,
    UploadedDocument,
};

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Extractor that splits the upload on `|` into pages; uploads starting
/// with `corrupt` fail
#[derive(Default)]
pub struct FakeExtractor;

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<ExtractedText> {
        let raw = String::from_utf8_lossy(&document.data).to_string();
        if raw.starts_with("corrupt") {
            return Err(Error::extraction(&document.filename, "not a PDF"));
        }
        Ok(ExtractedText::from_pages(&document.filename, raw.split('|')))
    }

    fn name(&self) -> &str {
        "fake-extractor"
    }
}

/// Converter that wraps the upload in a fake PDF header; uploads starting
/// with `corrupt` fail
#[derive(Default)]
pub struct FakeConverter;

#[async_trait]
impl DocumentConverter for FakeConverter {
    async fn convert(&self, document: &UploadedDocument) -> Result<ConvertedDocument> {
        if document.data.starts_with(b"corrupt") {
            return Err(Error::conversion(&document.filename, "not a valid DOCX document"));
        }
        let mut pdf = b"%PDF-1.7\n".to_vec();
        pdf.extend_from_slice(&document.data);
        Ok(ConvertedDocument {
            source_filename: document.filename.clone(),
            data: pdf.into(),
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "fake-converter"
    }
}

/// LLM that records every request and answers `answer:<message>`
#[derive(Default)]
pub struct FakeLlm {
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub fail_with_auth: bool,
}

impl FakeLlm {
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.requests.lock().push(request.clone());
        if self.fail_with_auth {
            return Err(Error::authentication("no key"));
        }
        Ok(GenerationResponse::new(
            format!("answer:{}", request.user_message),
            "fake-model",
        ))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail_with_auth)
    }

    fn name(&self) -> &str {
        "fake-llm"
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

/// Synthesizer that records spoken text and returns it as the audio bytes
#[derive(Default)]
pub struct FakeSpeech {
    pub spoken: Mutex<Vec<(String, String)>>,
}

impl FakeSpeech {
    pub fn spoken(&self) -> Vec<(String, String)> {
        self.spoken.lock().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip> {
        if text.trim().is_empty() || !self.supports_language(language) {
            return Err(Error::synthesis("rejected"));
        }
        self.spoken.lock().push((text.to_string(), language.to_string()));
        Ok(AudioClip::new(language, text.as_bytes().to_vec()))
    }

    fn supports_language(&self, language: &str) -> bool {
        matches!(language, "en" | "fr")
    }

    fn name(&self) -> &str {
        "fake-speech"
    }
}

/// All four fakes, shared so tests can inspect them afterwards
pub struct Fakes {
    pub extractor: Arc<FakeExtractor>,
    pub converter: Arc<FakeConverter>,
    pub llm: Arc<FakeLlm>,
    pub speech: Arc<FakeSpeech>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            extractor: Arc::new(FakeExtractor),
            converter: Arc::new(FakeConverter),
            llm: Arc::new(FakeLlm::default()),
            speech: Arc::new(FakeSpeech::default()),
        }
    }
}

impl Fakes {
    /// Orchestrator wired to these fakes with default preview length and language
    pub fn orchestrator(&self) -> SessionOrchestrator {
        SessionOrchestrator::new(
            self.extractor.clone(),
            self.converter.clone(),
            self.llm.clone(),
            self.speech.clone(),
        )
    }
}
