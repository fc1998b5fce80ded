//! # pdfcheck-core
//!
//! Deterministic building blocks for checking a document against
//! natural-language compliance rules.
//!
//! This crate never performs I/O beyond reading rule files and never calls a
//! language model. It owns:
//!
//! - [`Rule`] and [`RuleSet`]: user rules, with blank entries dropped
//! - [`DocumentText`]: extracted text and the prompt-sized prefix of it
//! - [`Verdict`]: the per-rule result, including the fallback verdict
//! - [`normalizer`]: turning raw model text into a [`Verdict`]
//! - [`CheckReport`]: the ordered verdict list of one session
//!
//! ## Key Guarantees
//!
//! 1. **One verdict per rule**: failures become fallback verdicts
//! 2. **Order preserved**: verdicts follow rule submission order
//! 3. **Bounded prompts**: at most [`MAX_PROMPT_CHARS`] characters of text
//!
//! ## Example
//!
//! ```rust
//! use pdfcheck_core::{normalize, DecodeMode, Status};
//!
//! let raw = "```json\n{\"status\":\"pass\",\"confidence\":90}\n```";
//! let verdict = normalize(raw, "Contains a signature", DecodeMode::Permissive);
//! assert_eq!(verdict.status, Status::Pass);
//! assert_eq!(verdict.rule, "Contains a signature");
//! ```

pub mod document;
pub mod normalizer;
pub mod report;
pub mod rules;
pub mod types;

pub use document::{truncate_chars, DocumentText, MAX_PROMPT_CHARS};
pub use normalizer::{decode, normalize, strip_fences, DecodeError, DecodeMode};
pub use report::{CheckReport, Summary};
pub use rules::{Rule, RuleError, RuleSet};
pub use types::{Status, Verdict, FALLBACK_EVIDENCE};
