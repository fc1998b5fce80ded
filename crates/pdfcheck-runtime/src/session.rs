//! Session boundary surface.
//!
//! The two operations a UI or HTTP layer consumes: extract text from an
//! uploaded file, and check `{ text, rules }` into `{ results }`. Transport,
//! CORS and multipart parsing stay outside; this module only validates and
//! delegates. Input errors are raised before any extraction or model call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pdfcheck_core::{DocumentText, RuleError, RuleSet, Verdict};

use crate::extractor::{looks_like_pdf, ExtractError};
use crate::orchestrator::{Orchestrator, RuntimeError};

/// MIME type accepted for uploads.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Errors surfaced to a session caller.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No PDF uploaded")]
    NoFile,

    #[error("Please upload a valid PDF file.")]
    NotPdf,

    #[error("Missing text or rules")]
    MissingTextOrRules,

    #[error("Enter at least one rule.")]
    NoRules,

    #[error("{0}")]
    Extraction(String),

    #[error("{0}")]
    Internal(String),
}

impl SessionError {
    /// Whether the caller caused the error (HTTP 400-class).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SessionError::NoFile
                | SessionError::NotPdf
                | SessionError::MissingTextOrRules
                | SessionError::NoRules
        )
    }

    /// Suggested HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

impl From<RuntimeError> for SessionError {
    fn from(error: RuntimeError) -> Self {
        match error {
            RuntimeError::Rules(RuleError::NoRules) => SessionError::NoRules,
            RuntimeError::NotPdf | RuntimeError::Extraction(ExtractError::NotPdf) => {
                SessionError::NotPdf
            }
            RuntimeError::Extraction(e) => SessionError::Extraction(e.to_string()),
            other => SessionError::Internal(other.to_string()),
        }
    }
}

/// An uploaded file as handed over by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    /// Original file name, if known
    pub filename: Option<String>,

    /// Declared MIME type, if known
    pub content_type: Option<String>,

    /// File contents
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Create an upload declared as a PDF.
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: Some(filename.into()),
            content_type: Some(PDF_CONTENT_TYPE.to_string()),
            bytes,
        }
    }

    /// Reject missing files and anything that is not a PDF.
    ///
    /// A declared content type other than `application/pdf` is rejected;
    /// the bytes must carry the PDF header either way.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.bytes.is_empty() {
            return Err(SessionError::NoFile);
        }

        if let Some(content_type) = &self.content_type {
            let essence = content_type.split(';').next().unwrap_or("").trim();
            if !essence.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
                return Err(SessionError::NotPdf);
            }
        }

        if !looks_like_pdf(&self.bytes) {
            return Err(SessionError::NotPdf);
        }

        Ok(())
    }
}

/// Reply of the extract operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub text: String,
}

/// Body of the check operation. Both fields are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub rules: Option<Vec<String>>,
}

/// Reply of the check operation: one verdict per non-empty rule, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub results: Vec<Verdict>,
}

/// Session facade over an [`Orchestrator`].
pub struct Session<'a> {
    orchestrator: &'a Orchestrator,
}

impl<'a> Session<'a> {
    pub fn new(orchestrator: &'a Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Extract text from an uploaded file.
    pub async fn extract(&self, upload: &Upload) -> Result<ExtractResponse, SessionError> {
        upload.validate()?;
        tracing::info!(
            file = upload.filename.as_deref().unwrap_or("<unnamed>"),
            bytes = upload.bytes.len(),
            "Extracting upload"
        );
        let extracted = self.orchestrator.extract(&upload.bytes).await?;
        Ok(ExtractResponse {
            text: extracted.text.as_str().to_string(),
        })
    }

    /// Check previously extracted text against the submitted rules.
    pub async fn check(&self, request: CheckRequest) -> Result<CheckResponse, SessionError> {
        let (text, rules) = match (request.text, request.rules) {
            (Some(text), Some(rules)) if !text.is_empty() => (text, rules),
            _ => return Err(SessionError::MissingTextOrRules),
        };

        let rules = RuleSet::from_raw(rules).map_err(|_| SessionError::NoRules)?;
        let report = self
            .orchestrator
            .check_text(&DocumentText::new(text), &rules)
            .await;

        tracing::info!(results = report.results.len(), "Sending results");
        Ok(CheckResponse {
            results: report.into_results(),
        })
    }
}
