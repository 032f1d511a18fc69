//! DOCX to PDF conversion through headless LibreOffice

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::config::ConverterConfig;
use crate::error::{Error, Result};
use crate::providers::DocumentConverter;
use crate::types::{ConvertedDocument, DocumentKind, UploadedDocument};

const INPUT_NAME: &str = "input.docx";
const OUTPUT_NAME: &str = "input.pdf";

/// Converter that shells out to `soffice --headless --convert-to pdf`
pub struct LibreOfficeConverter {
    config: ConverterConfig,
}

impl LibreOfficeConverter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Reject anything docx-rs cannot open before paying for a LibreOffice start
    fn validate(document: &UploadedDocument) -> Result<()> {
        document.expect_kind(DocumentKind::Docx)?;
        docx_rs::read_docx(&document.data).map_err(|e| {
            Error::conversion(
                &document.filename,
                format!("not a valid DOCX document: {}", e),
            )
        })?;
        Ok(())
    }

    async fn scratch_dir(&self) -> Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("doc-chat-convert-");
        let dir = match &self.config.scratch_dir {
            Some(root) => {
                tokio::fs::create_dir_all(root).await?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    fn command(&self, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("--headless")
            .arg(format!(
                "-env:UserInstallation=file://{}",
                workdir.join("profile").display()
            ))
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(workdir)
            .arg(workdir.join(INPUT_NAME))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for LibreOfficeConverter {
    fn default() -> Self {
        Self::new(&ConverterConfig::default())
    }
}

#[async_trait]
impl DocumentConverter for LibreOfficeConverter {
    async fn convert(&self, document: &UploadedDocument) -> Result<ConvertedDocument> {
        let start = Instant::now();
        Self::validate(document)?;

        // Removed on drop, whichever way this returns
        let workdir = self.scratch_dir().await?;
        tokio::fs::write(workdir.path().join(INPUT_NAME), &document.data).await?;

        let run = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            self.command(workdir.path()).output(),
        )
        .await;

        let output = match run {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::conversion(
                    &document.filename,
                    format!("LibreOffice is not installed ('{}' not found)", self.config.binary),
                ));
            }
            Ok(Err(e)) => {
                return Err(Error::conversion(
                    &document.filename,
                    format!("could not start LibreOffice: {}", e),
                ));
            }
            Err(_) => {
                return Err(Error::conversion(
                    &document.filename,
                    format!("LibreOffice timed out after {}s", self.config.timeout_secs),
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!("LibreOffice failed on '{}': {}", document.filename, stderr.trim());
            return Err(Error::conversion(
                &document.filename,
                format!("LibreOffice exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let pdf = tokio::fs::read(workdir.path().join(OUTPUT_NAME))
            .await
            .map_err(|e| {
                Error::conversion(&document.filename, format!("no PDF was produced: {}", e))
            })?;

        if !pdf.starts_with(b"%PDF-") {
            return Err(Error::conversion(
                &document.filename,
                "LibreOffice output is not a PDF",
            ));
        }

        tracing::info!(
            "Converted '{}' to PDF ({} -> {} bytes) in {}ms",
            document.filename,
            document.size(),
            pdf.len(),
            start.elapsed().as_millis()
        );

        Ok(ConvertedDocument {
            source_filename: document.filename.clone(),
            data: pdf.into(),
        })
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "libreoffice"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::path::PathBuf;

    fn sample_docx(text: &str) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
            .build()
            .pack(&mut cursor)
            .unwrap();
        cursor.into_inner()
    }

    fn converter(binary: &str, scratch: &Path) -> LibreOfficeConverter {
        LibreOfficeConverter::new(&ConverterConfig {
            binary: binary.to_string(),
            timeout_secs: 30,
            scratch_dir: Some(scratch.to_path_buf()),
        })
    }

    fn is_empty_dir(path: &Path) -> bool {
        std::fs::read_dir(path).map(|mut d| d.next().is_none()).unwrap_or(true)
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_conversion_error() {
        let scratch = tempfile::tempdir().unwrap();
        let converter = converter("soffice", scratch.path());
        let doc = UploadedDocument::new("broken.docx", DocumentKind::Docx, b"corrupt".to_vec());

        let err = converter.convert(&doc).await.unwrap_err();

        assert!(matches!(err, Error::Conversion { ref filename, .. } if filename == "broken.docx"));
        assert!(is_empty_dir(scratch.path()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_conversion_error() {
        let scratch = tempfile::tempdir().unwrap();
        let converter = converter("/nonexistent/soffice-missing", scratch.path());
        let doc = UploadedDocument::new("memo.docx", DocumentKind::Docx, sample_docx("Hello"));

        let err = converter.convert(&doc).await.unwrap_err();

        match err {
            Error::Conversion { message, .. } => assert!(message.contains("not installed")),
            other => panic!("expected Conversion error, got {:?}", other),
        }
        assert!(is_empty_dir(scratch.path()));
        assert!(!converter.is_available().await);
    }

    #[tokio::test]
    async fn test_missing_scratch_root_is_created() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("nested").join("scratch");
        let converter = converter("/nonexistent/soffice-missing", &root);
        let doc = UploadedDocument::new("memo.docx", DocumentKind::Docx, sample_docx("Hello"));

        assert!(converter.convert(&doc).await.is_err());

        assert!(root.is_dir());
        assert!(is_empty_dir(&root));
    }

    #[tokio::test]
    async fn test_wrong_kind_rejected() {
        let scratch = tempfile::tempdir().unwrap();
        let converter = converter("soffice", scratch.path());
        let doc = UploadedDocument::new("paper.pdf", DocumentKind::Pdf, b"%PDF-1.4".to_vec());

        assert!(matches!(
            converter.convert(&doc).await,
            Err(Error::UnsupportedFileType(_))
        ));
    }

    #[cfg(unix)]
    fn stub_binary(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("soffice-stub");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stub_conversion_returns_pdf() {
        let bin_dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let stub = stub_binary(
            bin_dir.path(),
            r#"[ "$1" = "--version" ] && { echo "LibreOffice stub"; exit 0; }
out=""
prev=""
for arg in "$@"; do
  [ "$prev" = "--outdir" ] && out="$arg"
  prev="$arg"
done
name=$(basename "$prev" .docx)
printf '%%PDF-1.4 fake' > "$out/$name.pdf""#,
        );
        let converter = converter(stub.to_str().unwrap(), scratch.path());
        let doc = UploadedDocument::new("memo.docx", DocumentKind::Docx, sample_docx("Hello"));

        assert!(converter.is_available().await);
        let converted = converter.convert(&doc).await.unwrap();

        assert_eq!(&converted.data[..], b"%PDF-1.4 fake");
        assert_eq!(converted.source_filename, "memo.docx");
        assert_eq!(converted.filename(), "converted_output.pdf");
        assert!(is_empty_dir(scratch.path()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_libreoffice_is_conversion_error() {
        let bin_dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let stub = stub_binary(bin_dir.path(), "echo 'source file could not be loaded' >&2\nexit 1");
        let converter = converter(stub.to_str().unwrap(), scratch.path());
        let doc = UploadedDocument::new("memo.docx", DocumentKind::Docx, sample_docx("Hello"));

        let err = converter.convert(&doc).await.unwrap_err();

        match err {
            Error::Conversion { message, .. } => {
                assert!(message.contains("could not be loaded"))
            }
            other => panic!("expected Conversion error, got {:?}", other),
        }
        assert!(is_empty_dir(scratch.path()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_pdf_output_rejected() {
        let bin_dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let stub = stub_binary(
            bin_dir.path(),
            r#"for arg in "$@"; do last="$arg"; done
printf 'garbage' > "$(dirname "$last")/input.pdf""#,
        );
        let converter = converter(stub.to_str().unwrap(), scratch.path());
        let doc = UploadedDocument::new("memo.docx", DocumentKind::Docx, sample_docx("Hello"));

        assert!(matches!(
            converter.convert(&doc).await,
            Err(Error::Conversion { .. })
        ));
    }
}
