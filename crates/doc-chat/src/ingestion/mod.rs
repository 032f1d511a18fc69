//! Document ingestion: PDF text extraction and DOCX conversion

pub mod converter;
pub mod pdf;

pub use converter::LibreOfficeConverter;
pub use pdf::PdfTextExtractor;
