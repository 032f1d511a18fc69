//! Core types for doc-chat

pub mod document;
pub mod generation;
pub mod response;
pub mod speech;

pub use document::{ConvertedDocument, DocumentKind, ExtractedText, UploadedDocument};
pub use generation::{GenerationRequest, GenerationResponse};
pub use speech::AudioClip;
