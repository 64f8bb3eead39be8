//! CLI support for claimpath
//!
//! Provides programmatic access to the `claimpath` commands so other tools
//! can validate and try out filter queries the same way the binary does.

mod check;
mod docs;

pub use check::{execute_check, CheckOptions, CheckResult};
pub use docs::{get_doc_category, get_docs_overview, DocCategory};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'claimpath docs' to see available categories.")]
    UnknownCategory(String),
}
