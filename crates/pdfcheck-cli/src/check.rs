//! # Check Subcommand
//!
//! Evaluate a PDF against rules given with `-r` and/or a rules file.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use pdfcheck_core::{DecodeMode, RuleSet};
use pdfcheck_runtime::{ExecutionMode, RuntimeConfig};

use crate::render::{self, OutputFormat};
use crate::settings;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// PDF file to check.
    pub file: PathBuf,

    /// A rule to check; repeat for several.
    #[arg(short, long = "rule", value_name = "RULE")]
    pub rules: Vec<String>,

    /// Read rules from a file (.yaml/.yml, .json, or one rule per line).
    #[arg(long, value_name = "PATH")]
    pub rules_file: Option<PathBuf>,

    /// Evaluate rules one at a time.
    #[arg(long)]
    pub sequential: bool,

    /// Treat replies with unknown status or out-of-range confidence as errors.
    #[arg(long)]
    pub strict: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Exit with status 1 if any rule failed.
    #[arg(long)]
    pub fail_on_violation: bool,
}

impl CheckArgs {
    /// Rules from the rules file first, then the `-r` rules.
    ///
    /// Blank entries are dropped only after both sources are merged, so a
    /// blank rules file alongside `-r` rules is fine.
    pub fn rule_set(&self) -> anyhow::Result<RuleSet> {
        let mut raw: Vec<String> = Vec::new();
        if let Some(path) = &self.rules_file {
            raw = RuleSet::raw_from_file(path)
                .with_context(|| format!("failed to read rules from {}", path.display()))?;
        }
        raw.extend(self.rules.iter().cloned());

        Ok(RuleSet::from_raw(raw)?)
    }

    /// Apply command-line overrides to the loaded config.
    pub fn apply(&self, config: &mut RuntimeConfig) {
        if self.sequential {
            config.execution.mode = ExecutionMode::Sequential;
        }
        if self.strict {
            config.validation = DecodeMode::Strict;
        }
    }
}

pub async fn run(args: &CheckArgs, mut config: RuntimeConfig) -> anyhow::Result<ExitCode> {
    let rules = args.rule_set()?;
    args.apply(&mut config);

    let bytes = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let orchestrator = settings::orchestrator(&config)?;
    let report = orchestrator
        .check_document(&bytes, rules.iter().map(|rule| rule.as_str().to_string()))
        .await?;

    print!("{}", render::render(&report, &orchestrator.usage(), args.format)?);

    if args.fail_on_violation && !report.summary.all_passed() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}
