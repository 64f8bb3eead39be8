use std::cmp::Ordering;

use bigdecimal::ToPrimitive;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{
        AttributePath, ComposedPredicate, Condition, Expression, Logical, Operand, Operator,
        Predicate,
    },
    document::{as_decimal, as_text, is_absent, json_eq, resolve, type_name},
};

/// Evaluation switches.
///
/// The defaults apply `!` and evaluate every operator.
/// [`MatchOptions::compatible`] keeps `!` in the tree without applying it
/// and fails the match on `=~`, `anyof` and `noneof`, for deployments whose
/// queries were written against that behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Negate expressions written with a leading `!`
    pub apply_negation: bool,
    /// Evaluate `=~`, `anyof` and `noneof` instead of failing the match
    pub extended_operators: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            apply_negation: true,
            extended_operators: true,
        }
    }
}

impl MatchOptions {
    pub fn compatible() -> Self {
        MatchOptions {
            apply_negation: false,
            extended_operators: false,
        }
    }
}

/// Errors that can occur while matching a document.
///
/// Only [`EvalError::Comparison`] is contained: the predicate that raised it
/// counts as `false` and matching continues. Every other variant aborts the
/// whole match.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Missing, null or mistyped value in a comparison
    #[error("Unsupported comparison ({0})")]
    Comparison(String),

    /// Two present attribute values of types that have no ordering
    #[error("Can't compare {left} value to {right} value")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },

    /// Operator disabled by [`MatchOptions::extended_operators`]
    #[error("Operator '{0}' is not supported")]
    UnsupportedOperator(Operator),

    /// Bare predicate whose value is not an attribute path
    #[error("Single value expression has to be an attribute path, got {0}")]
    BareValue(&'static str),

    /// Operand shapes the parser would have rejected
    #[error("Invalid operands for '{operator}': {detail}")]
    InvalidOperands { operator: Operator, detail: String },
}

impl EvalError {
    /// True when the error degrades its predicate to `false`.
    pub fn is_degrading(&self) -> bool {
        matches!(self, EvalError::Comparison(_))
    }
}

/// Tree-walking evaluator. Holds no per-document state, so one matcher can
/// serve any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    options: MatchOptions,
}

impl Matcher {
    pub fn new(options: MatchOptions) -> Self {
        Matcher { options }
    }

    /// Evaluates a composed predicate against `document`.
    ///
    /// Expressions are folded left to right. An `and` reached while the
    /// result so far is `false` ends evaluation immediately, so later
    /// predicates are never looked at. `or` does not short-circuit.
    pub fn evaluate(
        &self,
        composed: &ComposedPredicate,
        document: &Value,
    ) -> Result<bool, EvalError> {
        let mut current = false;

        for (i, expr) in composed.expressions.iter().enumerate() {
            if i > 0 && expr.logical == Some(Logical::And) && !current {
                return Ok(false);
            }

            let value = self.eval_expression(expr, document)?;
            current = match (i, expr.logical) {
                (0, _) => value,
                (_, Some(Logical::Or)) => current || value,
                _ => current && value,
            };
        }
        Ok(current)
    }

    fn eval_expression(&self, expr: &Expression, document: &Value) -> Result<bool, EvalError> {
        let value = match &expr.condition {
            Condition::Group(group) => self.evaluate(group, document)?,
            Condition::Predicate(predicate) => match self.eval_predicate(predicate, document) {
                Ok(value) => value,
                Err(e) if e.is_degrading() => {
                    debug!(%predicate, error = %e, "Failed to evaluate predicate");
                    false
                }
                Err(e) => return Err(e),
            },
        };

        if expr.negated && self.options.apply_negation {
            Ok(!value)
        } else {
            Ok(value)
        }
    }

    fn eval_predicate(&self, predicate: &Predicate, document: &Value) -> Result<bool, EvalError> {
        let left = &predicate.left;
        let Some(op) = predicate.operator else {
            return self.exists(left, document);
        };
        let Some(right) = &predicate.right else {
            return Err(invalid(op, "missing right operand"));
        };

        match op {
            Operator::Equal => self.equals(op, left, right, document),
            Operator::NotEqual => self.equals(op, left, right, document).map(|b| !b),
            Operator::GreaterThan => Ok(self.compare(op, left, right, document)?.is_gt()),
            Operator::LessEqual => Ok(!self.compare(op, left, right, document)?.is_gt()),
            Operator::LessThan => Ok(self.compare(op, left, right, document)?.is_lt()),
            Operator::GreaterEqual => Ok(!self.compare(op, left, right, document)?.is_lt()),
            Operator::In => self.contained_in(op, left, right, document),
            Operator::NotIn => self.contained_in(op, left, right, document).map(|b| !b),
            Operator::MatchRegex | Operator::AnyOf | Operator::NoneOf
                if !self.options.extended_operators =>
            {
                Err(EvalError::UnsupportedOperator(op))
            }
            Operator::MatchRegex => self.match_regex(op, left, right, document),
            Operator::AnyOf => self.any_of(op, left, right, document),
            Operator::NoneOf => self.any_of(op, left, right, document).map(|b| !b),
        }
    }

    /// Bare `@.attr`: present, not null and not `false`.
    fn exists(&self, left: &Operand, document: &Value) -> Result<bool, EvalError> {
        match left {
            Operand::Path(path) => Ok(!matches!(
                resolve(document, path),
                None | Some(Value::Null) | Some(Value::Bool(false))
            )),
            other => Err(EvalError::BareValue(other.kind())),
        }
    }

    fn equals(
        &self,
        op: Operator,
        left: &Operand,
        right: &Operand,
        document: &Value,
    ) -> Result<bool, EvalError> {
        let lval = resolve(document, left_path(op, left)?);

        match right {
            Operand::Path(rpath) => {
                let rval = resolve(document, rpath);
                Ok(match (lval, rval) {
                    (l, r) if is_absent(l) => is_absent(r),
                    (Some(l), Some(r)) => json_eq(l, r),
                    _ => false,
                })
            }
            Operand::String(s) => Ok(matches!(lval, Some(Value::String(t)) if t == s)),
            Operand::Number(n) => {
                Ok(matches!(lval, Some(Value::Number(m)) if as_decimal(m).as_ref() == Some(n)))
            }
            // A missing attribute fulfills `== null`
            Operand::Null => Ok(is_absent(lval)),
            other => Err(invalid(op, format!("can't compare with {}", other.kind()))),
        }
    }

    fn compare(
        &self,
        op: Operator,
        left: &Operand,
        right: &Operand,
        document: &Value,
    ) -> Result<Ordering, EvalError> {
        let lpath = left_path(op, left)?;
        let lval = resolve(document, lpath);

        match right {
            Operand::Path(rpath) => {
                let rval = resolve(document, rpath);
                match (present(lval), present(rval)) {
                    (Some(l), Some(r)) => compare_values(l, r),
                    _ => Err(EvalError::Comparison(format!(
                        "{} vs. {}",
                        describe(lval),
                        describe(rval)
                    ))),
                }
            }
            Operand::String(s) => match lval {
                Some(Value::String(t)) => Ok(t.as_str().cmp(s.as_str())),
                other => Err(EvalError::Comparison(format!(
                    "{} vs. {}",
                    describe(other),
                    right
                ))),
            },
            Operand::Number(n) => {
                let l = match lval {
                    Some(Value::Number(m)) => m.as_f64(),
                    _ => None,
                };
                match (l, n.to_f64()) {
                    (Some(l), Some(r)) => Ok(l.total_cmp(&r)),
                    _ => Err(EvalError::Comparison(format!(
                        "{} vs. {}",
                        describe(lval),
                        right
                    ))),
                }
            }
            other => Err(invalid(op, format!("can't order against {}", other.kind()))),
        }
    }

    fn contained_in(
        &self,
        op: Operator,
        left: &Operand,
        right: &Operand,
        document: &Value,
    ) -> Result<bool, EvalError> {
        match (left, right) {
            (Operand::Path(lpath), Operand::Path(rpath)) => {
                let lval = resolve(document, lpath);
                let rval = resolve(document, rpath);
                if is_absent(lval) && is_absent(rval) {
                    return Ok(true);
                }
                Ok(match (lval, rval) {
                    (Some(l), Some(Value::Array(items))) => items.iter().any(|item| json_eq(item, l)),
                    _ => false,
                })
            }
            (Operand::Path(lpath), Operand::List(items)) => {
                let lval = resolve(document, lpath);
                match lval {
                    None | Some(Value::Null) => Ok(items.contains(&Operand::Null)),
                    Some(value @ (Value::String(_) | Value::Number(_))) => {
                        Ok(items.iter().any(|literal| literal_matches(literal, value)))
                    }
                    Some(value) => {
                        trace!(
                            "{} value can't be used to the left of '{}'",
                            type_name(value),
                            op
                        );
                        Ok(false)
                    }
                }
            }
            (literal, Operand::List(items)) if literal.is_scalar_literal() => {
                Ok(items.contains(literal))
            }
            (literal, Operand::Path(rpath)) if literal.is_scalar_literal() => {
                Ok(match resolve(document, rpath) {
                    Some(Value::Array(items)) => {
                        items.iter().any(|item| literal_matches(literal, item))
                    }
                    _ => false,
                })
            }
            (left, right) => Err(invalid(
                op,
                format!("can't test {} against {}", left.kind(), right.kind()),
            )),
        }
    }

    fn match_regex(
        &self,
        op: Operator,
        left: &Operand,
        right: &Operand,
        document: &Value,
    ) -> Result<bool, EvalError> {
        let lval = resolve(document, left_path(op, left)?);
        let Operand::Regex(pattern) = right else {
            return Err(invalid(op, format!("expected a regex, got {}", right.kind())));
        };

        Ok(lval
            .and_then(as_text)
            .is_some_and(|text| pattern.is_match(&text)))
    }

    /// True when some element of the attribute is in the list. A scalar
    /// attribute counts as a single element; a missing one has none.
    fn any_of(
        &self,
        op: Operator,
        left: &Operand,
        right: &Operand,
        document: &Value,
    ) -> Result<bool, EvalError> {
        let lval = resolve(document, left_path(op, left)?);
        let Operand::List(items) = right else {
            return Err(invalid(op, format!("expected a list, got {}", right.kind())));
        };
        let in_list = |value: &Value| items.iter().any(|literal| literal_matches(literal, value));

        Ok(match lval {
            None => false,
            Some(Value::Array(values)) => values.iter().any(in_list),
            Some(value) => in_list(value),
        })
    }
}

fn invalid(operator: Operator, detail: impl Into<String>) -> EvalError {
    EvalError::InvalidOperands {
        operator,
        detail: detail.into(),
    }
}

fn left_path(op: Operator, left: &Operand) -> Result<&AttributePath, EvalError> {
    match left {
        Operand::Path(path) => Ok(path),
        other => Err(invalid(
            op,
            format!("left value has to be an attribute path, got {}", other.kind()),
        )),
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "missing".to_string(),
        Some(v) => v.to_string(),
    }
}

/// Ordering between two present attribute values. Text orders against text
/// and numbers against numbers; anything else cannot be ordered.
fn compare_values(left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => Ok(a.total_cmp(&b)),
            _ => Err(EvalError::Incomparable {
                left: type_name(left),
                right: type_name(right),
            }),
        },
        _ => Err(EvalError::Incomparable {
            left: type_name(left),
            right: type_name(right),
        }),
    }
}

/// Equality between a scalar literal and a document value: strings verbatim,
/// numbers by decimal value, `null` only against JSON null.
fn literal_matches(literal: &Operand, value: &Value) -> bool {
    match (literal, value) {
        (Operand::String(s), Value::String(t)) => s == t,
        (Operand::Number(n), Value::Number(m)) => as_decimal(m).as_ref() == Some(n),
        (Operand::Null, Value::Null) => true,
        _ => false,
    }
}
