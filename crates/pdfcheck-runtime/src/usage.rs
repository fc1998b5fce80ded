//! Token and cost accounting.
//!
//! Accounting is observational: it is written after a call returns and
//! never feeds back into a verdict.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::providers::TokenUsage;

/// USD per million tokens `(input, output)`, matched by model-name prefix.
/// Longer prefixes come first so `gpt-4o-mini` is not priced as `gpt-4o`.
const PRICES: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.15, 0.60),
    ("gpt-4o", 2.50, 10.00),
    ("gpt-4.1-nano", 0.10, 0.40),
    ("gpt-4.1-mini", 0.40, 1.60),
    ("gpt-4.1", 2.00, 8.00),
];

/// Rates for `model`; unknown models are priced as gpt-4o-mini.
fn rates(model: &str) -> (f64, f64) {
    PRICES
        .iter()
        .find(|(prefix, _, _)| model.starts_with(*prefix))
        .map(|&(_, input, output)| (input, output))
        .unwrap_or((PRICES[0].1, PRICES[0].2))
}

/// Usage totals over one or more checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,

    /// Calls whose reply decoded into a verdict
    pub llm_calls: u32,

    /// Estimated spend in USD
    pub estimated_cost: f64,
}

impl LlmUsage {
    /// Fold one response's usage into the totals.
    pub fn add(&mut self, usage: &TokenUsage, model: &str) {
        let (input, output) = rates(model);

        let prompt = u64::from(usage.prompt_tokens);
        let completion = u64::from(usage.completion_tokens);

        self.prompt_tokens = self.prompt_tokens.saturating_add(prompt);
        self.completion_tokens = self.completion_tokens.saturating_add(completion);
        self.total_tokens = self.total_tokens.saturating_add(prompt + completion);
        self.llm_calls = self.llm_calls.saturating_add(1);
        self.estimated_cost += (f64::from(usage.prompt_tokens) * input
            + f64::from(usage.completion_tokens) * output)
            / 1_000_000.0;
    }
}

/// [`LlmUsage`] shared between concurrent evaluations.
#[derive(Debug, Default)]
pub struct UsageTracker {
    totals: RwLock<LlmUsage>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, usage: &TokenUsage, model: &str) {
        self.totals.write().add(usage, model);
    }

    pub fn snapshot(&self) -> LlmUsage {
        self.totals.read().clone()
    }

    pub fn reset(&self) {
        *self.totals.write() = LlmUsage::default();
    }
}
