//! Request and response bodies of the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::ExtractedText;
use super::generation::GenerationResponse;
use super::speech::{AudioClip, AUDIO_FILENAME, AUDIO_MIME};

/// Body of `POST /api/pdf/query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentQueryRequest {
    /// Question about the loaded PDF
    pub question: String,
}

/// Body of `POST /api/query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralQueryRequest {
    /// Free-form message
    pub message: String,
}

/// Body of `POST /api/speech`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Language code (default from config, normally "en")
    #[serde(default)]
    pub language: Option<String>,
}

/// Result of a PDF upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfPreview {
    /// Source filename
    pub filename: String,
    /// Page count
    pub pages: usize,
    /// Characters in the full text
    pub total_chars: usize,
    /// First characters of the text (display only)
    pub preview: String,
    /// True if the preview is shorter than the full text
    pub truncated: bool,
}

impl PdfPreview {
    /// Build a preview of at most `limit` characters
    pub fn from_extracted(extracted: &ExtractedText, limit: usize) -> Self {
        let preview = extracted.preview(limit).to_string();
        let total_chars = extracted.char_count();
        Self {
            filename: extracted.filename.clone(),
            pages: extracted.page_count,
            truncated: preview.chars().count() < total_chars,
            total_chars,
            preview,
        }
    }
}

/// Answer to a document or general query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Response text, unmodified
    pub answer: String,
    /// Model used
    pub model: String,
    /// Total processing time in milliseconds
    pub processing_time_ms: u64,
}

impl AnswerResponse {
    pub fn new(response: &GenerationResponse, processing_time_ms: u64) -> Self {
        Self {
            answer: response.text.clone(),
            model: response.model.clone(),
            processing_time_ms,
        }
    }
}

/// Synthesized speech, inline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechResponse {
    /// Always `audio/mpeg`
    pub mime: String,
    /// Always `speech.mp3`
    pub filename: String,
    /// Language spoken
    pub language: String,
    /// Size of the audio in bytes
    pub size_bytes: usize,
    /// Base64 audio
    pub audio_base64: String,
    /// `data:audio/mpeg;base64,...`
    pub data_url: String,
    /// Ready-made HTML download anchor
    pub download_link: String,
}

impl From<&AudioClip> for SpeechResponse {
    fn from(clip: &AudioClip) -> Self {
        Self {
            mime: AUDIO_MIME.to_string(),
            filename: AUDIO_FILENAME.to_string(),
            language: clip.language.clone(),
            size_bytes: clip.len(),
            audio_base64: clip.to_base64(),
            data_url: clip.data_url(),
            download_link: clip.download_link(),
        }
    }
}

/// Summary of the loaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub pages: usize,
    pub total_chars: usize,
    pub extracted_at: DateTime<Utc>,
}

impl From<&ExtractedText> for DocumentSummary {
    fn from(extracted: &ExtractedText) -> Self {
        Self {
            filename: extracted.filename.clone(),
            pages: extracted.page_count,
            total_chars: extracted.char_count(),
            extracted_at: extracted.extracted_at,
        }
    }
}

/// Body of `GET /api/session`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub has_document: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentSummary>,
    pub has_response: bool,
}
