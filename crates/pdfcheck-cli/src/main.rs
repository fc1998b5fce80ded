//! # pdfcheck CLI Entry Point
//!
//! Parses arguments, installs logging and dispatches to subcommands.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pdfcheck_cli::{check, extract, providers, settings};

/// Check PDF documents against natural-language rules with an LLM.
#[derive(Parser, Debug)]
#[command(name = "pdfcheck", version, about)]
struct Cli {
    /// Runtime configuration file (YAML).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Extract the text of a PDF.
    Extract(extract::ExtractArgs),
    /// Check a PDF against one or more rules.
    Check(check::CheckArgs),
    /// List available LLM providers.
    Providers,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for reports
    tracing_subscriber::fmt()
        .with_env_filter(settings::log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract(args) => {
            extract::run(&args).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => {
            let config = settings::load_config(cli.config.as_deref())?;
            check::run(&args, config).await
        }
        Commands::Providers => {
            providers::run();
            Ok(ExitCode::SUCCESS)
        }
    }
}
