//! # Filter Query Language - Abstract Syntax Tree
//!
//! This module defines the tree the parser builds from a filter query such as
//!
//! ```text
//! @.exp > 1000 and ('kafka' in @.aud || @.custom == 'custom-value')
//! ```
//!
//! ## Architecture Overview
//!
//! - **[path]** - Attribute paths (`@.a.b`) resolved against the document root
//! - **[operands]** - Leaf values: paths, literals, lists and regular expressions
//! - **[operators]** - Comparison, membership and regex operators plus `and`/`or`
//! - **[predicate]** - Predicates, expressions and composed (bracketed) clauses
//!
//! ## Structure
//!
//! A query is a [`ComposedPredicate`]: a list of [`Expression`]s, each
//! carrying the connective to its predecessor, a negation flag and a
//! [`Condition`]. A condition is either a single [`Predicate`] or a nested
//! `ComposedPredicate` written in parentheses, so the two nest into each
//! other to any depth. Every node owns its children; the tree is never
//! mutated after parsing.
//!
//! ## Rendering
//!
//! Every node implements `Display`. The rendered text is not necessarily the
//! text that was parsed (quotes and whitespace are normalised, `&&` becomes
//! `and`), but it parses back to a tree that matches the same documents.
pub mod operands;
pub mod operators;
pub mod path;
pub mod predicate;

pub use operands::{Operand, PatternError, RegexPattern};
pub use operators::{Logical, Operator};
pub use path::AttributePath;
pub use predicate::{ComposedPredicate, Condition, Expression, Predicate};
