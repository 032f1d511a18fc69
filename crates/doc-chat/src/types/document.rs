//! Uploaded, extracted and converted document types

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// MIME type of PDF uploads and converted output
pub const PDF_MIME: &str = "application/pdf";

/// MIME type of DOCX uploads
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Download name of a converted document
pub const CONVERTED_FILENAME: &str = "converted_output.pdf";

/// Declared kind of an uploaded document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
}

impl DocumentKind {
    /// Detect from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Detect from a MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            PDF_MIME => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            _ => None,
        }
    }

    /// Detect from the declared content type, falling back to the filename
    /// extension (browsers often send `application/octet-stream`)
    pub fn detect(content_type: Option<&str>, filename: &str) -> Result<Self> {
        if let Some(kind) = content_type.and_then(Self::from_mime) {
            return Ok(kind);
        }

        let ext = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| {
            Error::UnsupportedFileType(format!(
                "'{}' is neither a PDF nor a DOCX document",
                filename
            ))
        })
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
        }
    }

    /// MIME type
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A file as received from the user. Lives only for the request that
/// carried it.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Original filename
    pub filename: String,
    /// Declared kind
    pub kind: DocumentKind,
    /// Raw bytes
    pub data: Bytes,
}

impl UploadedDocument {
    /// Create a new upload
    pub fn new(filename: impl Into<String>, kind: DocumentKind, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            kind,
            data: data.into(),
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Fail unless the upload has the expected kind
    pub fn expect_kind(&self, expected: DocumentKind) -> Result<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(Error::UnsupportedFileType(format!(
                "expected a {} upload but '{}' is a {}",
                expected, self.filename, self.kind
            )))
        }
    }
}

/// Full text of a PDF, in page order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Source filename
    pub filename: String,
    /// Concatenated page text
    pub text: String,
    /// Number of pages in the source document
    pub page_count: usize,
    /// When extraction finished
    pub extracted_at: DateTime<Utc>,
}

impl ExtractedText {
    /// Build from per-page text; pages are joined with no separator
    pub fn from_pages<I, S>(filename: impl Into<String>, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        let mut page_count = 0;
        for page in pages {
            text.push_str(page.as_ref());
            page_count += 1;
        }

        Self {
            filename: filename.into(),
            text,
            page_count,
            extracted_at: Utc::now(),
        }
    }

    /// First `limit` characters, for display only
    pub fn preview(&self, limit: usize) -> &str {
        match self.text.char_indices().nth(limit) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }

    /// Length in characters
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// True if no page produced any text
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// PDF produced from a DOCX upload, offered as a download
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    /// Name of the source upload
    pub source_filename: String,
    /// PDF bytes
    pub data: Bytes,
}

impl ConvertedDocument {
    /// Download filename
    pub fn filename(&self) -> &'static str {
        CONVERTED_FILENAME
    }

    /// Download MIME type
    pub fn mime(&self) -> &'static str {
        PDF_MIME
    }
}
