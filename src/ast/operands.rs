use std::fmt;

use regex::{Regex, RegexBuilder};
use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::ast::AttributePath;

/// Leaf value in a predicate.
///
/// Operands are immutable once the parser has built them.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Attribute path resolved against the document
    ///
    /// # Example
    /// ```text
    /// @.roles.client-roles.kafka
    /// ```
    Path(AttributePath),

    /// String literal, single or double quoted, no escapes
    ///
    /// # Example
    /// ```text
    /// 'kafka'
    /// "kafka-user"
    /// ```
    String(String),

    /// Number literal, kept as an unbounded decimal so `9` and `9.0` compare
    /// equal and long literals keep every digit
    ///
    /// # Example
    /// ```text
    /// -12.5
    /// ```
    Number(BigDecimal),

    /// Null literal
    Null,

    /// List literal. Elements are always `String`, `Number` or `Null`.
    ///
    /// # Example
    /// ```text
    /// ['some-value', 42, null]
    /// ```
    List(Vec<Operand>),

    /// Regular expression, only ever on the right of `=~`
    ///
    /// # Example
    /// ```text
    /// /^custom-.+$/i
    /// ```
    Regex(RegexPattern),
}

impl Operand {
    /// String, number or null literal.
    pub fn is_scalar_literal(&self) -> bool {
        matches!(self, Operand::String(_) | Operand::Number(_) | Operand::Null)
    }

    /// Human-readable kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Path(_) => "attribute path",
            Operand::String(_) => "string",
            Operand::Number(_) => "number",
            Operand::Null => "null",
            Operand::List(_) => "list",
            Operand::Regex(_) => "regex",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Path(path) => write!(f, "{}", path),
            Operand::String(s) => {
                // No escapes exist, so pick the quote the text doesn't use.
                if s.contains('\'') {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "'{}'", s)
                }
            }
            Operand::Number(n) => f.write_str(&n.to_plain_string()),
            Operand::Null => f.write_str("null"),
            Operand::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Operand::Regex(pattern) => write!(f, "{}", pattern),
        }
    }
}

/// Errors building a [`RegexPattern`].
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("unsupported regex flag '{0}' (supported: i, m, s, x)")]
    UnknownFlag(char),

    #[error("regex expression is empty")]
    Empty,

    #[error("invalid regex: {0}")]
    Invalid(#[from] regex::Error),
}

/// Compiled regular expression together with the text it was written as.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    source: String,
    flags: String,
    regex: Regex,
}

impl RegexPattern {
    /// Compiles `source` with single-letter `flags`:
    /// `i` case-insensitive, `m` multi-line, `s` dot matches newline,
    /// `x` ignore whitespace.
    pub fn new(source: &str, flags: &str) -> Result<Self, PatternError> {
        if source.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => return Err(PatternError::UnknownFlag(other)),
            };
        }

        Ok(RegexPattern {
            source: source.to_string(),
            flags: flags.to_string(),
            regex: builder.build()?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Display for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source.replace('/', "\\/"), self.flags)
    }
}
