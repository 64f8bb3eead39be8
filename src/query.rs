use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::{
    ast::ComposedPredicate,
    evaluator::{EvalError, MatchOptions, Matcher},
    parser::{ParseError, Parser},
};

/// A compiled filter query.
///
/// Parse once, match many times: the tree is immutable, so a `Query` can be
/// shared between threads (for example behind an `Arc`) and matched
/// concurrently without locking.
///
/// # Examples
///
/// ```
/// use claimpath::Query;
/// use serde_json::json;
///
/// let query = Query::compile("@.exp > 1000 and 'kafka' in @.aud").unwrap();
///
/// let claims = json!({"exp": 1600, "aud": ["uma_authorization", "kafka"]});
/// assert!(query.matches(&claims).unwrap());
///
/// let claims = json!({"exp": 1600, "aud": ["other"]});
/// assert!(!query.matches(&claims).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    root: ComposedPredicate,
    options: MatchOptions,
}

impl Query {
    /// Parses and validates `text`. Any syntax or semantic error rejects the
    /// whole query.
    pub fn compile(text: &str) -> Result<Self, ParseError> {
        let root = Parser::new(text).parse()?;
        Ok(Query {
            root,
            options: MatchOptions::default(),
        })
    }

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    pub fn root(&self) -> &ComposedPredicate {
        &self.root
    }

    /// Matches `document` against the query.
    ///
    /// Comparisons that fail on a missing or mistyped value count as `false`.
    /// An `Err` means the document could not be classified at all.
    pub fn matches(&self, document: &Value) -> Result<bool, EvalError> {
        Matcher::new(self.options).evaluate(&self.root, document)
    }
}

impl FromStr for Query {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Query::compile(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
