//! doc-chat: chat with a PDF through Gemini, convert DOCX to PDF and listen to the answers
//!
//! A PDF upload is reduced to its text, which then grounds questions sent to
//! the Gemini API. General questions go to the same model without a document.
//! DOCX files are converted to PDF with headless LibreOffice, and the latest
//! answer can be read aloud as MP3.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod session;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use server::DocChatServer;
pub use types::{
    AudioClip, ConvertedDocument, DocumentKind, ExtractedText, GenerationRequest,
    GenerationResponse, UploadedDocument,
};
