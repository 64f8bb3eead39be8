use std::fmt;

/// Predicate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Membership
    /// Value is contained in a list or array (`in`)
    In,
    /// Value is not contained in a list or array (`nin`)
    NotIn,
    /// Some element of the attribute is in the list (`anyof`)
    AnyOf,
    /// No element of the attribute is in the list (`noneof`)
    NoneOf,

    // Pattern
    /// Regular expression match (`=~`)
    MatchRegex,
}

impl Operator {
    /// Operators in the order the parser tries them. `<` is tried before
    /// `<=`, which is safe because operators must be followed by whitespace.
    pub const ALL: [Operator; 11] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::LessEqual,
        Operator::GreaterEqual,
        Operator::MatchRegex,
        Operator::In,
        Operator::NotIn,
        Operator::AnyOf,
        Operator::NoneOf,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::In => "in",
            Operator::NotIn => "nin",
            Operator::AnyOf => "anyof",
            Operator::NoneOf => "noneof",
            Operator::MatchRegex => "=~",
        }
    }

    /// `<`, `>`, `<=` and `>=`.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::LessThan | Operator::GreaterThan | Operator::LessEqual | Operator::GreaterEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Logical connective joining an expression to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Logical {
    /// `and` or `&&`
    And,
    /// `or` or `||`
    Or,
}

impl fmt::Display for Logical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logical::And => f.write_str("and"),
            Logical::Or => f.write_str("or"),
        }
    }
}
