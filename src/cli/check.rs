//! Compile a filter query and match it against JSON input

use tracing::info;

use super::CliError;
use crate::{MatchOptions, Query};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The filter query
    pub query: String,
    /// JSON input string
    pub input: Option<String>,
    /// Only validate syntax, don't match
    pub syntax_only: bool,
    /// Match with [`MatchOptions::compatible`]
    pub compatible: bool,
}

/// Result of a check operation
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// Query compiled; carries its canonical rendering
    SyntaxValid(String),
    /// Whether the input matched
    Matched(bool),
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let mut query = Query::compile(&options.query)?;
    if options.compatible {
        query = query.with_options(MatchOptions::compatible());
    }

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid(query.to_string()));
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let document: serde_json::Value = serde_json::from_str(json_str)?;

    let matched = query.matches(&document)?;
    info!(query = %query, matched, "Query evaluated");
    Ok(CheckResult::Matched(matched))
}
