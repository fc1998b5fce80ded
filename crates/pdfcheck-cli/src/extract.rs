//! # Extract Subcommand
//!
//! Print the text of a PDF, or write it to a file.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pdfcheck_runtime::{PdfTextExtractor, TextExtractor};

/// Arguments for the extract subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// PDF file to read.
    pub file: PathBuf,

    /// Write the text here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run text extraction. No provider is needed for this command.
pub async fn run(args: &ExtractArgs) -> anyhow::Result<()> {
    let bytes = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    if !pdfcheck_runtime::looks_like_pdf(&bytes) {
        anyhow::bail!("Please upload a valid PDF file.");
    }

    let extracted = PdfTextExtractor::new().extract(&bytes).await?;
    tracing::info!(
        file = %args.file.display(),
        chars = extracted.text.char_count(),
        pages = ?extracted.page_count,
        "Extracted text"
    );

    match &args.output {
        Some(path) => fs::write(path, extracted.text.as_str())
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", extracted.text.as_str()),
    }

    Ok(())
}
