//! Report rendering for the check subcommand.

use std::fmt::Write as _;

use clap::ValueEnum;
use pdfcheck_core::{CheckReport, Status};
use pdfcheck_runtime::LlmUsage;
use serde::Serialize;

/// Output format for `pdfcheck check`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// The report as JSON, with token usage
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a CheckReport,
    usage: &'a LlmUsage,
}

pub fn render(report: &CheckReport, usage: &LlmUsage, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, usage)),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(&JsonReport { report, usage })?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// One block per verdict, then the summary and token usage.
pub fn render_text(report: &CheckReport, usage: &LlmUsage) -> String {
    let mut out = String::new();

    for verdict in &report.results {
        let mark = match verdict.status {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
        };
        let _ = writeln!(out, "[{mark}] {}", verdict.rule);
        if !verdict.evidence.is_empty() {
            let _ = writeln!(out, "  Evidence: \"{}\"", verdict.evidence);
        }
        if !verdict.reasoning.is_empty() {
            let _ = writeln!(out, "  Reasoning: {}", verdict.reasoning);
        }
        let _ = writeln!(out, "  Confidence: {}%", verdict.confidence);
        out.push('\n');
    }

    let summary = &report.summary;
    let _ = writeln!(
        out,
        "{} rules: {} passed, {} failed ({} errored), mean confidence {:.0}%",
        summary.total, summary.passed, summary.failed, summary.errored, summary.mean_confidence
    );
    let _ = writeln!(
        out,
        "Tokens: {} ({} prompt, {} completion) over {} calls, est. ${:.4}",
        usage.total_tokens,
        usage.prompt_tokens,
        usage.completion_tokens,
        usage.llm_calls,
        usage.estimated_cost
    );

    out
}
