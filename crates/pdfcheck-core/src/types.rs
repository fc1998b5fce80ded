//! Core verdict types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Evidence text carried by every fallback verdict.
pub const FALLBACK_EVIDENCE: &str = "Error processing this rule";

/// Outcome of checking one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The document satisfies the rule
    Pass,
    /// The document violates the rule, or it could not be evaluated
    Fail,
}

impl Status {
    /// Whether this is a passing status.
    pub fn is_pass(&self) -> bool {
        matches!(self, Status::Pass)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => write!(f, "pass"),
            Status::Fail => write!(f, "fail"),
        }
    }
}

/// The result of evaluating one rule against one document.
///
/// Serializes to a flat object with exactly the fields
/// `rule`, `status`, `evidence`, `reasoning` and `confidence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Echo of the submitted rule
    pub rule: String,

    /// Pass or fail
    pub status: Status,

    /// Sentence the model claims supports the verdict
    pub evidence: String,

    /// Short explanation
    pub reasoning: String,

    /// Model confidence, nominally 0-100. Not clamped.
    pub confidence: i64,
}

impl Verdict {
    /// Build the deterministic verdict used when a rule could not be evaluated.
    ///
    /// Always `fail` with confidence 0; `reason` becomes the reasoning text.
    pub fn fallback(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            status: Status::Fail,
            evidence: FALLBACK_EVIDENCE.to_string(),
            reasoning: reason.into(),
            confidence: 0,
        }
    }

    /// Whether the verdict passed.
    pub fn passed(&self) -> bool {
        self.status.is_pass()
    }

    /// Whether this looks like a fallback verdict rather than a model judgement.
    pub fn is_fallback(&self) -> bool {
        self.status == Status::Fail && self.confidence == 0 && self.evidence == FALLBACK_EVIDENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_shape() {
        let verdict = Verdict::fallback("Contains a signature", "connection reset");
        assert_eq!(verdict.status, Status::Fail);
        assert_eq!(verdict.confidence, 0);
        assert_eq!(verdict.evidence, "Error processing this rule");
        assert_eq!(verdict.reasoning, "connection reset");
        assert!(verdict.is_fallback());
        assert!(!verdict.passed());
    }

    #[test]
    fn test_verdict_serializes_flat() {
        let verdict = Verdict {
            rule: "Contains a signature".to_string(),
            status: Status::Pass,
            evidence: "Signed by J. Doe".to_string(),
            reasoning: "Signature block found".to_string(),
            confidence: 90,
        };

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "rule": "Contains a signature",
                "status": "pass",
                "evidence": "Signed by J. Doe",
                "reasoning": "Signature block found",
                "confidence": 90
            })
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Pass.to_string(), "pass");
        assert_eq!(Status::Fail.to_string(), "fail");
    }
}
