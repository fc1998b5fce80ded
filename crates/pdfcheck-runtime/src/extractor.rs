//! PDF text extraction.
//!
//! The extractor is an external collaborator: given raw PDF bytes it returns
//! plain text, and the rest of the system treats that text as opaque.
//! [`PdfTextExtractor`] is backed by `pdf-extract` and runs on the blocking
//! thread pool because parsing is CPU-bound.

use async_trait::async_trait;
use thiserror::Error;

use pdfcheck_core::DocumentText;

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Errors from text extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Not a PDF file")]
    NotPdf,

    #[error("PDF is password protected")]
    PasswordProtected,

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("PDF extraction failed: {0}")]
    Failed(String),
}

/// Text extracted from one document.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// The full text
    pub text: DocumentText,

    /// Number of pages, when the backend reports it
    pub page_count: Option<usize>,
}

/// Whether `bytes` start with the PDF header.
///
/// Leading whitespace before the header is tolerated.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(PDF_MAGIC)
}

/// The text-extraction collaborator.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from PDF bytes.
    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Extractor backed by the `pdf-extract` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract synchronously. Prefer [`TextExtractor::extract`] in async code.
    pub fn extract_sync(bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        if !looks_like_pdf(bytes) {
            return Err(ExtractError::NotPdf);
        }

        let text = pdf_extract::extract_text_from_mem(bytes).map_err(classify_error)?;

        let page_count = pdf_extract::Document::load_mem(bytes)
            .ok()
            .map(|doc| doc.get_pages().len());

        Ok(ExtractedText {
            text: DocumentText::new(text),
            page_count,
        })
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        let owned = bytes.to_vec();
        tokio::task::spawn_blocking(move || Self::extract_sync(&owned))
            .await
            .map_err(|e| ExtractError::Failed(format!("extraction task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "pdf-extract"
    }
}

fn classify_error(error: impl std::fmt::Display) -> ExtractError {
    let message = error.to_string();
    let lower = message.to_lowercase();

    if lower.contains("encrypted") || lower.contains("password") {
        ExtractError::PasswordProtected
    } else if lower.contains("invalid") || lower.contains("malformed") || lower.contains("corrupt") {
        ExtractError::InvalidPdf(message)
    } else {
        ExtractError::Failed(message)
    }
}
