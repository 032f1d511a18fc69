//! Error types for doc-chat

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for doc-chat operations
pub type Result<T> = std::result::Result<T, Error>;

/// doc-chat errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The uploaded PDF could not be read
    #[error("Failed to extract text from '{filename}': {message}")]
    Extraction { filename: String, message: String },

    /// DOCX to PDF conversion failed (converter missing or bad input)
    #[error("Failed to convert '{filename}' to PDF: {message}")]
    Conversion { filename: String, message: String },

    /// Missing or rejected API credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Prompt is larger than the generation API accepts
    #[error("Prompt too large: {size} characters (limit {limit})")]
    PromptTooLarge { size: usize, limit: usize },

    /// Speech engine rejected the text or language
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    /// Generation API error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document question asked before a PDF was uploaded
    #[error("No document loaded: upload a PDF before asking about it")]
    NoDocumentLoaded,

    /// Speech requested before any response exists
    #[error("No response available: ask a question before converting to speech")]
    NoResponseAvailable,

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Bad request input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a synthesis error
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable error kind, used in JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::Extraction { .. } => "extraction_error",
            Error::Conversion { .. } => "conversion_error",
            Error::Authentication(_) => "authentication_error",
            Error::PromptTooLarge { .. } => "prompt_too_large",
            Error::Synthesis(_) => "synthesis_error",
            Error::Llm(_) => "llm_error",
            Error::NoDocumentLoaded => "no_document_loaded",
            Error::NoResponseAvailable => "no_response_available",
            Error::UnsupportedFileType(_) => "unsupported_type",
            Error::InvalidInput(_) => "invalid_input",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Http(_) => "http_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Conversion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::PromptTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Synthesis(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Llm(_) => StatusCode::BAD_GATEWAY,
            Error::NoDocumentLoaded | Error::NoResponseAvailable => StatusCode::CONFLICT,
            Error::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
