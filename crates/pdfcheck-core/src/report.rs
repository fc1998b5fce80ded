//! Check report: the ordered verdict list plus a summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Verdict;

/// Aggregate counts over a report's verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of verdicts
    pub total: usize,

    /// Verdicts with status pass
    pub passed: usize,

    /// Verdicts with status fail (including fallbacks)
    pub failed: usize,

    /// Fallback verdicts, i.e. rules that could not be evaluated
    pub errored: usize,

    /// Mean confidence over all verdicts (0.0 when empty)
    pub mean_confidence: f64,
}

impl Summary {
    /// Summarize a list of verdicts.
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let total = verdicts.len();
        let passed = verdicts.iter().filter(|v| v.passed()).count();
        let errored = verdicts.iter().filter(|v| v.is_fallback()).count();
        let mean_confidence = if total == 0 {
            0.0
        } else {
            verdicts.iter().map(|v| v.confidence as f64).sum::<f64>() / total as f64
        };

        Self {
            total,
            passed,
            failed: total - passed,
            errored,
            mean_confidence,
        }
    }

    /// True when every verdict passed.
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.failed == 0
    }
}

/// Result of one checking session.
///
/// `results` is in the same order as the submitted rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// One verdict per non-empty rule, in submission order
    pub results: Vec<Verdict>,

    /// Derived counts
    pub summary: Summary,

    /// When the check finished
    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    /// Build a report stamped with the current time.
    pub fn new(results: Vec<Verdict>) -> Self {
        let summary = Summary::from_verdicts(&results);
        Self {
            results,
            summary,
            checked_at: Utc::now(),
        }
    }

    /// Consume the report, keeping only the verdicts.
    pub fn into_results(self) -> Vec<Verdict> {
        self.results
    }
}
