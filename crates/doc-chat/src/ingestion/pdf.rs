//! PDF text extraction
//!
//! pdf-extract does the work page by page; when it errors, panics (it does on
//! some broken fonts) or hangs past the timeout, lopdf's per-page extractor
//! takes over.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::providers::TextExtractor;
use crate::types::{ExtractedText, UploadedDocument};

/// PDF extractor backed by pdf-extract with a lopdf fallback
pub struct PdfTextExtractor {
    timeout: Duration,
}

impl PdfTextExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Per-page text via lopdf. Pages that fail to decode contribute "".
    fn extract_pages_fallback(data: &[u8]) -> std::result::Result<Vec<String>, String> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| e.to_string())?;

        let pages = doc
            .get_pages()
            .keys()
            .map(|&page_number| match doc.extract_text(&[page_number]) {
                Ok(text) => trim_page_breaks(&text).to_string(),
                Err(e) => {
                    tracing::debug!("No text on page {}: {}", page_number, e);
                    String::new()
                }
            })
            .collect();

        Ok(pages)
    }

    async fn run_fallback(&self, document: &UploadedDocument) -> Result<Vec<String>> {
        let data = document.data.clone();
        tokio::task::spawn_blocking(move || Self::extract_pages_fallback(&data))
            .await
            .map_err(|e| Error::extraction(&document.filename, format!("extractor crashed: {}", e)))?
            .map_err(|e| Error::extraction(&document.filename, format!("not a readable PDF: {}", e)))
    }
}

/// Both engines frame each page with line breaks; pages are joined as-is,
/// so those breaks are dropped here.
fn trim_page_breaks(page: &str) -> &str {
    page.trim_matches(|c| c == '\n' || c == '\r')
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<ExtractedText> {
        let start = Instant::now();
        let data = document.data.clone();

        let primary = timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&data)),
        )
        .await;

        let pages: Vec<String> = match primary {
            Ok(Ok(Ok(pages))) => pages
                .iter()
                .map(|page| trim_page_breaks(page).to_string())
                .collect(),
            Ok(Ok(Err(e))) => {
                tracing::warn!("pdf-extract failed on '{}': {}, trying fallback", document.filename, e);
                self.run_fallback(document).await?
            }
            Ok(Err(e)) => {
                tracing::error!("pdf-extract crashed on '{}': {}, trying fallback", document.filename, e);
                self.run_fallback(document).await?
            }
            Err(_) => {
                // The blocking thread cannot be cancelled; it is left to finish on its own
                tracing::error!(
                    "PDF extraction timeout after {}s on '{}', trying fallback",
                    self.timeout.as_secs(),
                    document.filename
                );
                self.run_fallback(document).await?
            }
        };

        let extracted = ExtractedText::from_pages(&document.filename, &pages);

        tracing::info!(
            "Extracted '{}': {} pages, {} chars in {}ms",
            document.filename,
            extracted.page_count,
            extracted.char_count(),
            start.elapsed().as_millis()
        );
        if extracted.is_empty() {
            tracing::warn!(
                "'{}' has no extractable text (image-only or empty PDF)",
                document.filename
            );
        }

        Ok(extracted)
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::DocumentKind;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a PDF with one Courier text run per page ("" = blank page)
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn upload(name: &str, data: Vec<u8>) -> UploadedDocument {
        UploadedDocument::new(name, DocumentKind::Pdf, data)
    }

    #[tokio::test]
    async fn test_blank_page_contributes_nothing() {
        let extractor = PdfTextExtractor::default();
        let doc = upload("three.pdf", build_pdf(&["A", "", "C"]));

        let extracted = extractor.extract(&doc).await.unwrap();

        assert_eq!(extracted.page_count, 3);
        assert_eq!(extracted.text, "AC");
        assert_eq!(extracted.preview(1500), "AC");
        assert_eq!(extracted.filename, "three.pdf");
    }

    #[tokio::test]
    async fn test_pages_kept_in_order() {
        let extractor = PdfTextExtractor::default();
        let doc = upload("ordered.pdf", build_pdf(&["First", "Second", "Third"]));

        let extracted = extractor.extract(&doc).await.unwrap();

        assert_eq!(extracted.text, "FirstSecondThird");
    }

    #[tokio::test]
    async fn test_all_blank_pdf_is_empty_not_error() {
        let extractor = PdfTextExtractor::default();
        let doc = upload("blank.pdf", build_pdf(&["", ""]));

        let extracted = extractor.extract(&doc).await.unwrap();

        assert!(extracted.text.is_empty());
        assert!(extracted.is_empty());
        assert_eq!(extracted.page_count, 2);
    }

    #[test]
    fn test_page_breaks_trimmed_inner_text_kept() {
        assert_eq!(trim_page_breaks("\n\nA\n"), "A");
        assert_eq!(trim_page_breaks("\r\n"), "");
        assert_eq!(trim_page_breaks("one\ntwo"), "one\ntwo");
        assert_eq!(trim_page_breaks("  indented "), "  indented ");
    }

    #[tokio::test]
    async fn test_garbage_is_extraction_error() {
        let extractor = PdfTextExtractor::default();
        let doc = upload("fake.pdf", b"this is definitely not a pdf".to_vec());

        let err = extractor.extract(&doc).await.unwrap_err();
        match err {
            Error::Extraction { filename, .. } => assert_eq!(filename, "fake.pdf"),
            other => panic!("expected Extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_reads_every_page() {
        let pages = PdfTextExtractor::extract_pages_fallback(&build_pdf(&["A", "", "C"])).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages, vec!["A", "", "C"]);
        assert!(PdfTextExtractor::extract_pages_fallback(b"%PDF-1.4 broken").is_err());
    }
}
