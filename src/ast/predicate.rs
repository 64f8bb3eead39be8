use std::fmt;

use crate::ast::{Logical, Operand, Operator};

/// A single comparison, or a bare attribute check when `operator` is `None`.
///
/// # Examples
/// ```text
/// @.exp > 1000
/// 'kafka' in @.aud
/// @.roles
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub left: Operand,
    pub operator: Option<Operator>,
    /// Present exactly when `operator` is.
    pub right: Option<Operand>,
}

impl Predicate {
    /// Bare check: the attribute is present and truthy.
    pub fn exists(left: Operand) -> Self {
        Predicate {
            left,
            operator: None,
            right: None,
        }
    }

    pub fn compare(left: Operand, operator: Operator, right: Operand) -> Self {
        Predicate {
            left,
            operator: Some(operator),
            right: Some(right),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.left)?;
        if let Some(op) = self.operator {
            write!(f, " {}", op)?;
        }
        if let Some(right) = &self.right {
            write!(f, " {}", right)?;
        }
        Ok(())
    }
}

/// What an expression tests: one predicate, or a parenthesised group.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Predicate(Predicate),
    Group(ComposedPredicate),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Predicate(p) => write!(f, "{}", p),
            Condition::Group(g) => write!(f, "({})", g),
        }
    }
}

/// One clause of a composed predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// Connective to the previous expression; `None` only for the first one.
    pub logical: Option<Logical>,
    /// Set when the clause was written with a leading `!`.
    pub negated: bool,
    pub condition: Condition,
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        write!(f, "{}", self.condition)
    }
}

/// Ordered clauses joined by `and`/`or`, evaluated left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComposedPredicate {
    pub expressions: Vec<Expression>,
}

impl ComposedPredicate {
    pub fn new(expressions: Vec<Expression>) -> Self {
        ComposedPredicate { expressions }
    }
}

impl fmt::Display for ComposedPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, expr) in self.expressions.iter().enumerate() {
            if i > 0 {
                let logical = expr.logical.unwrap_or(Logical::And);
                write!(f, " {} ", logical)?;
            }
            write!(f, "{}", expr)?;
        }
        Ok(())
    }
}
