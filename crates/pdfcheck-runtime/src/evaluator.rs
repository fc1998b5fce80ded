//! Rule evaluation: one rule, one model call, one verdict.

use std::sync::Arc;
use thiserror::Error;

use pdfcheck_core::{decode, DecodeError, DecodeMode, DocumentText, Rule, Verdict};

use crate::prompts::build_rule_prompt;
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError, TokenUsage};

/// Errors from evaluating a single rule.
///
/// These never abort a check; the orchestrator turns them into fallback
/// verdicts.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("Model call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl EvaluationError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            EvaluationError::Provider(e) => e.is_transient(),
            EvaluationError::Timeout(_) => true,
            EvaluationError::Decode(_) => false,
        }
    }
}

/// A decoded verdict together with the call's token usage.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub usage: TokenUsage,
    pub model: String,
}

/// Evaluates rules against document text through an [`LlmProvider`].
///
/// Holds no mutable state, so one evaluator can serve many concurrent
/// evaluations. It makes exactly one call per evaluation and never retries.
#[derive(Clone)]
pub struct RuleEvaluator {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
    decode_mode: DecodeMode,
}

impl RuleEvaluator {
    /// Create an evaluator with permissive decoding.
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig) -> Self {
        Self {
            provider,
            completion,
            decode_mode: DecodeMode::Permissive,
        }
    }

    /// Set how strictly model replies are decoded.
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    /// The provider in use.
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Evaluate one rule. Failures are returned, not downgraded.
    pub async fn try_evaluate(
        &self,
        document: &DocumentText,
        rule: &Rule,
    ) -> Result<Evaluation, EvaluationError> {
        let prompt = build_rule_prompt(rule, document);
        tracing::debug!(
            rule = %rule,
            provider = self.provider.name(),
            estimated_tokens = self.provider.estimate_tokens(&prompt),
            "Evaluating rule"
        );

        let response = self
            .provider
            .complete(vec![ChatMessage::user(prompt)], &self.completion)
            .await?;

        tracing::debug!(
            rule = %rule,
            stop_reason = ?response.stop_reason,
            raw = %response.content,
            "Model response"
        );
        if response.stop_reason.as_deref() == Some("length") {
            tracing::warn!(
                rule = %rule,
                max_tokens = self.completion.max_tokens,
                "Model reply cut off at the token limit"
            );
        }

        let verdict = decode(&response.content, rule.as_str(), self.decode_mode)?;

        Ok(Evaluation {
            verdict,
            usage: response.usage,
            model: response.model,
        })
    }

    /// Evaluate one rule, always producing a verdict.
    ///
    /// Any provider or decode failure becomes the fallback verdict with the
    /// error message as reasoning.
    pub async fn evaluate(&self, document: &DocumentText, rule: &Rule) -> Verdict {
        match self.try_evaluate(document, rule).await {
            Ok(evaluation) => evaluation.verdict,
            Err(e) => {
                tracing::warn!(rule = %rule, error = %e, "Rule evaluation failed");
                Verdict::fallback(rule.as_str(), e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for RuleEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEvaluator")
            .field("provider", &self.provider.name())
            .field("completion", &self.completion)
            .field("decode_mode", &self.decode_mode)
            .finish()
    }
}
