//! A JSONPath filter-query language for deciding whether a JSON document,
//! typically a set of token claims, satisfies a boolean condition.
//!
//! ```text
//! @.custom == 'custom-value' and @.exp > 1000
//! 'kafka' in @.aud || @.roles.client-roles.kafka != null
//! @.iss =~ /https:\/\/auth-server\/.+/
//! ```
//!
//! Paths starting with `@` are resolved against the document root.
pub mod ast;
pub mod cursor;
pub mod document;
pub mod evaluator;
pub mod parser;
pub mod query;
pub mod validator;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{ComposedPredicate, Condition, Expression, Logical, Operand, Operator, Predicate};
pub use cursor::Cursor;
pub use evaluator::{EvalError, MatchOptions, Matcher};
pub use parser::{ParseError, Parser};
pub use query::Query;
pub use validator::ValidationError;
