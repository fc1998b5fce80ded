//! Check orchestration: extract once, evaluate every rule, keep order.
//!
//! The orchestrator implements:
//! - Input validation before any extraction or model call
//! - One extraction per document; extraction failure aborts the check
//! - Fan-out over rules, sequential or concurrent (bounded)
//! - Ordered fan-in: results follow rule order, not completion order
//! - Per-attempt timeout and optional retry of transient failures
//! - Downgrade of every per-rule failure to the fallback verdict

use backon::{ExponentialBuilder, Retryable};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

use pdfcheck_core::{CheckReport, DocumentText, Rule, RuleError, RuleSet, Verdict};

use crate::config::{ConfigError, ExecutionConfig, ExecutionMode, RuntimeConfig};
use crate::evaluator::{Evaluation, EvaluationError, RuleEvaluator};
use crate::extractor::{looks_like_pdf, ExtractError, ExtractedText, PdfTextExtractor, TextExtractor};
use crate::providers::{LlmProvider, ProviderError, ProviderRegistry};
use crate::usage::{LlmUsage, UsageTracker};

/// Errors that abort a whole check.
///
/// Per-rule failures never appear here; they become fallback verdicts.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error("Please upload a valid PDF file.")]
    NotPdf,

    #[error("PDF extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ProviderError> for RuntimeError {
    fn from(error: ProviderError) -> Self {
        RuntimeError::ProviderNotConfigured(error.to_string())
    }
}

/// Drives extraction and rule evaluation for one or more checks.
pub struct Orchestrator {
    extractor: Arc<dyn TextExtractor>,
    evaluator: RuleEvaluator,
    execution: ExecutionConfig,
    usage: UsageTracker,
}

impl Orchestrator {
    /// Create an orchestrator from its collaborators.
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        evaluator: RuleEvaluator,
        execution: ExecutionConfig,
    ) -> Self {
        Self {
            extractor,
            evaluator,
            execution,
            usage: UsageTracker::new(),
        }
    }

    /// Build the provider named in `config` from `registry` and wire up the
    /// default PDF extractor.
    pub fn from_config(
        config: &RuntimeConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        registry.validate(&config.provider.kind, &config.provider.settings)?;
        let provider = registry.create(&config.provider.kind, &config.provider.settings)?;

        OrchestratorBuilder::new()
            .provider(provider)
            .config(config.clone())
            .build()
    }

    /// Extract text from PDF bytes.
    pub async fn extract(&self, pdf_bytes: &[u8]) -> Result<ExtractedText, RuntimeError> {
        if !looks_like_pdf(pdf_bytes) {
            return Err(RuntimeError::NotPdf);
        }

        let extracted = self.extractor.extract(pdf_bytes).await.map_err(|e| {
            tracing::error!(extractor = self.extractor.name(), error = %e, "PDF extraction failed");
            e
        })?;

        tracing::info!(
            extractor = self.extractor.name(),
            chars = extracted.text.char_count(),
            pages = ?extracted.page_count,
            truncated = extracted.text.is_truncated(),
            "PDF extracted"
        );

        Ok(extracted)
    }

    /// Check a PDF against raw rule strings.
    ///
    /// # Execution Flow
    /// 1. Drop blank rules; none left is an input error
    /// 2. Reject bytes that are not a PDF
    /// 3. Extract text once (failure aborts, no partial results)
    /// 4. Evaluate every rule and collect verdicts in rule order
    pub async fn check_document<I, S>(
        &self,
        pdf_bytes: &[u8],
        rules: I,
    ) -> Result<CheckReport, RuntimeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules = RuleSet::from_raw(rules)?;
        let extracted = self.extract(pdf_bytes).await?;
        Ok(self.check_text(&extracted.text, &rules).await)
    }

    /// Evaluate every rule against already extracted text.
    ///
    /// Always returns exactly one verdict per rule, in rule order.
    pub async fn check_text(&self, text: &DocumentText, rules: &RuleSet) -> CheckReport {
        tracing::info!(
            rules = rules.len(),
            mode = ?self.execution.mode,
            provider = self.evaluator.provider().name(),
            "Checking rules"
        );

        let verdicts: Vec<Verdict> = match self.execution.mode {
            ExecutionMode::Sequential => {
                let mut verdicts = Vec::with_capacity(rules.len());
                for rule in rules {
                    verdicts.push(self.evaluate_rule(text, rule).await);
                }
                verdicts
            }
            ExecutionMode::Concurrent => {
                stream::iter(rules.iter())
                    .map(|rule| self.evaluate_rule(text, rule))
                    .buffered(self.execution.max_concurrency.max(1))
                    .collect()
                    .await
            }
        };

        let report = CheckReport::new(verdicts);
        tracing::info!(
            total = report.summary.total,
            passed = report.summary.passed,
            failed = report.summary.failed,
            errored = report.summary.errored,
            "Check complete"
        );
        report
    }

    /// Evaluate one rule with timeout and retry, downgrading failure.
    async fn evaluate_rule(&self, text: &DocumentText, rule: &Rule) -> Verdict {
        match self.evaluate_with_retry(text, rule).await {
            Ok(evaluation) => {
                self.usage.record(&evaluation.usage, &evaluation.model);
                evaluation.verdict
            }
            Err(e) => {
                tracing::warn!(rule = %rule, error = %e, "Rule evaluation failed");
                Verdict::fallback(rule.as_str(), e.to_string())
            }
        }
    }

    async fn evaluate_with_retry(
        &self,
        text: &DocumentText,
        rule: &Rule,
    ) -> Result<Evaluation, EvaluationError> {
        let timeout = self.execution.timeout;
        let attempt = || async move {
            match tokio::time::timeout(timeout, self.evaluator.try_evaluate(text, rule)).await {
                Ok(result) => result,
                Err(_) => Err(EvaluationError::Timeout(timeout)),
            }
        };

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.execution.retry_min_delay)
            .with_max_times(self.execution.max_retries);

        attempt
            .retry(backoff)
            .when(|e: &EvaluationError| e.is_transient())
            .notify(|e: &EvaluationError, delay| {
                tracing::warn!(rule = %rule, error = %e, delay = ?delay, "Retrying rule evaluation");
            })
            .await
    }

    /// Token usage accumulated since creation or the last reset.
    pub fn usage(&self) -> LlmUsage {
        self.usage.snapshot()
    }

    /// Reset the usage counters.
    pub fn reset_usage(&self) {
        self.usage.reset();
    }

    /// The execution settings in use.
    pub fn execution(&self) -> &ExecutionConfig {
        &self.execution
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    config: RuntimeConfig,
}

impl OrchestratorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            provider: None,
            extractor: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the text extractor (defaults to [`PdfTextExtractor`]).
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<Orchestrator, RuntimeError> {
        let provider = self
            .provider
            .ok_or_else(|| RuntimeError::ProviderNotConfigured("No provider set".to_string()))?;
        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(PdfTextExtractor::new()));

        let evaluator = RuleEvaluator::new(provider, self.config.completion)
            .with_decode_mode(self.config.validation);

        Ok(Orchestrator::new(extractor, evaluator, self.config.execution))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
