//! Document engine traits: PDF text extraction and DOCX to PDF conversion

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ConvertedDocument, ExtractedText, UploadedDocument};

/// Pulls plain text out of a paginated document
///
/// Implementations:
/// - `PdfTextExtractor`: pdf-extract with a lopdf fallback
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Text of every page, concatenated in page order
    async fn extract(&self, document: &UploadedDocument) -> Result<ExtractedText>;

    /// Get extractor name for logging
    fn name(&self) -> &str;
}

/// Turns a word-processing document into a PDF
///
/// Implementations:
/// - `LibreOfficeConverter`: headless LibreOffice subprocess
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert the upload; temporary files never outlive the call
    async fn convert(&self, document: &UploadedDocument) -> Result<ConvertedDocument>;

    /// Check if the external converter can be run
    async fn is_available(&self) -> bool;

    /// Get converter name for logging
    fn name(&self) -> &str;
}
