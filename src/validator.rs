//! Per-operator semantic checks, run by the parser on each predicate as soon
//! as it is read. A failure here rejects the whole query just like a syntax
//! error.

use thiserror::Error;

use crate::ast::{Operand, Operator, Predicate};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Single value expression should be specified as an attribute path (for example: @.attr)")]
    BareLiteral,

    #[error("Value to the left of '{0}' has to be specified as an attribute path (for example: @.attr)")]
    LeftNotPath(Operator),

    #[error("Can not use 'null' to the right of '{0}'")]
    NullInComparison(Operator),

    #[error("Can not use 'null' to the right of '{0}' (try '{0} [null]' or '== null')")]
    NullInMembership(Operator),

    #[error("Value to the right of '=~' has to be specified as a regular expression (for example: /foo-.+/)")]
    RegexRequired,

    #[error("A regular expression can only be used to the right of '=~', not '{0}'")]
    UnexpectedRegex(Operator),

    #[error("Value to the right of '{0}' has to be specified as an attribute path (for example: @.attr) or an array (for example: ['val1', 'val2'])")]
    MembershipTarget(Operator),

    #[error("Value to the left of '{0}' has to be specified as an attribute path (for example: @.attr), a string, a number or null")]
    MembershipValue(Operator),

    #[error("Value to the right of '{0}' has to be an array (for example: ['value1', 'value2'])")]
    ListRequired(Operator),

    #[error("Value expected to the right of '{0}'")]
    MissingOperand(Operator),
}

pub fn validate(predicate: &Predicate) -> Result<(), ValidationError> {
    let Some(op) = predicate.operator else {
        return match predicate.left {
            Operand::Path(_) => Ok(()),
            _ => Err(ValidationError::BareLiteral),
        };
    };
    let Some(right) = &predicate.right else {
        return Err(ValidationError::MissingOperand(op));
    };
    let left = &predicate.left;

    if op != Operator::MatchRegex && matches!(right, Operand::Regex(_)) {
        return Err(ValidationError::UnexpectedRegex(op));
    }

    match op {
        Operator::Equal
        | Operator::NotEqual
        | Operator::LessThan
        | Operator::GreaterThan
        | Operator::LessEqual
        | Operator::GreaterEqual => {
            if !matches!(left, Operand::Path(_)) {
                return Err(ValidationError::LeftNotPath(op));
            }
            if op.is_ordering() && *right == Operand::Null {
                return Err(ValidationError::NullInComparison(op));
            }
        }
        Operator::MatchRegex => {
            if !matches!(left, Operand::Path(_)) {
                return Err(ValidationError::LeftNotPath(op));
            }
            if !matches!(right, Operand::Regex(_)) {
                return Err(ValidationError::RegexRequired);
            }
        }
        Operator::In | Operator::NotIn => {
            if *right == Operand::Null {
                return Err(ValidationError::NullInMembership(op));
            }
            if !matches!(right, Operand::Path(_) | Operand::List(_)) {
                return Err(ValidationError::MembershipTarget(op));
            }
            if !matches!(left, Operand::Path(_)) && !left.is_scalar_literal() {
                return Err(ValidationError::MembershipValue(op));
            }
        }
        Operator::AnyOf | Operator::NoneOf => {
            if *right == Operand::Null {
                return Err(ValidationError::NullInMembership(op));
            }
            if !matches!(right, Operand::List(_)) {
                return Err(ValidationError::ListRequired(op));
            }
            if !matches!(left, Operand::Path(_)) {
                return Err(ValidationError::LeftNotPath(op));
            }
        }
    }
    Ok(())
}
