//! # pdfcheck-runtime
//!
//! LLM-assisted rule evaluation for pdfcheck.
//!
//! This crate owns everything that suspends: PDF text extraction and the
//! per-rule model calls. The deterministic pieces (rules, verdicts,
//! response normalization) live in `pdfcheck-core`.
//!
//! ## Flow
//!
//! 1. [`TextExtractor`] turns PDF bytes into [`DocumentText`](pdfcheck_core::DocumentText), once
//! 2. [`RuleEvaluator`] builds a prompt per rule and calls the [`LlmProvider`]
//! 3. The normalizer decodes each reply into a [`Verdict`](pdfcheck_core::Verdict)
//! 4. [`Orchestrator`] collects verdicts in rule order into a report
//!
//! Per-rule failures become fallback verdicts; only input and extraction
//! errors abort a check.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pdfcheck_runtime::{Orchestrator, ProviderRegistry, RuntimeConfig};
//!
//! let orchestrator = Orchestrator::from_config(&RuntimeConfig::default(), &ProviderRegistry::with_defaults())?;
//! let pdf = std::fs::read("contract.pdf")?;
//! let report = orchestrator
//!     .check_document(&pdf, ["Contains a signature", "Mentions a termination date"])
//!     .await?;
//!
//! for verdict in &report.results {
//!     println!("{}: {} ({}%)", verdict.rule, verdict.status, verdict.confidence);
//! }
//! ```

pub mod config;
pub mod evaluator;
pub mod extractor;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod usage;

pub use config::{ConfigError, ExecutionConfig, ExecutionMode, ProviderConfig, RuntimeConfig};
pub use evaluator::{Evaluation, EvaluationError, RuleEvaluator};
pub use extractor::{looks_like_pdf, ExtractError, ExtractedText, PdfTextExtractor, TextExtractor};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, RuntimeError};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderFactory, ProviderRegistry, Role, TokenUsage,
};
pub use session::{CheckRequest, CheckResponse, ExtractResponse, Session, SessionError, Upload};
pub use usage::{LlmUsage, UsageTracker};

#[cfg(feature = "openai")]
pub use providers::{OpenAiProvider, OpenAiProviderFactory};
