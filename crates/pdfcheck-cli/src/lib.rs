//! # pdfcheck-cli
//!
//! Command-line front end for pdfcheck.
//!
//! ## Subcommands
//!
//! - `extract`: print or write the text of a PDF
//! - `check`: evaluate a PDF against rules and render the report
//! - `providers`: list registered LLM provider types
//!
//! Argument parsing and rendering live here; checking itself is delegated
//! to `pdfcheck-runtime`.

pub mod check;
pub mod extract;
pub mod providers;
pub mod render;
pub mod settings;
