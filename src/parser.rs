use std::str::FromStr;

use bigdecimal::BigDecimal;
use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{
        AttributePath, ComposedPredicate, Condition, Expression, Logical, Operand, Operator,
        Predicate, RegexPattern,
    },
    cursor::Cursor,
    validator,
};

/// Groups nested deeper than this are rejected rather than recursed into.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Characters that, besides whitespace and end of input, may follow an
/// operator or logical keyword.
const KEYWORD_DELIMS: &[char] = &[')'];

/// Failure to compile a query. The query is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}: '{fragment}'")]
pub struct ParseError {
    /// What rule failed
    pub message: String,
    /// Character offset where the failing construct starts
    pub position: usize,
    /// Query text from `position` onwards
    pub fragment: String,
}

pub struct Parser {
    cursor: Cursor,
    depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Parser {
            cursor: Cursor::new(input),
            depth: 0,
        }
    }

    /// Parse a complete query. The whole input must be consumed.
    pub fn parse(&mut self) -> Result<ComposedPredicate, ParseError> {
        let composed = self.parse_composed()?;

        self.cursor.skip_whitespace();
        if !self.cursor.eol() {
            let message = if self.cursor.peek() == Some(')') {
                "Unmatched ')'"
            } else {
                "Unexpected input after the end of the query"
            };
            return Err(self.error_here(message));
        }
        Ok(composed)
    }

    fn error(&self, message: impl Into<String>, position: usize) -> ParseError {
        ParseError {
            message: message.into(),
            position,
            fragment: self.cursor.fragment_from(position),
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error(message, self.cursor.position())
    }

    fn read_delim(&mut self, delim: &str) -> bool {
        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();
        if self.cursor.read_expected(delim) {
            true
        } else {
            self.cursor.reset_to(mark);
            false
        }
    }

    fn parse_composed(&mut self) -> Result<ComposedPredicate, ParseError> {
        let mut expressions = vec![];
        let mut logical = None;

        loop {
            self.cursor.skip_whitespace();
            self.cursor.reset_start();

            let negated = self.cursor.read_expected("!");
            if negated {
                self.cursor.skip_whitespace();
            }

            let condition = if self.read_delim("(") {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(self.error(
                        format!("Query nests deeper than {} groups", MAX_NESTING_DEPTH),
                        self.cursor.start(),
                    ));
                }
                self.depth += 1;
                let group = self.parse_composed()?;
                self.depth -= 1;

                if !self.read_delim(")") {
                    return Err(self.error_here("Failed to parse query - expected ')'"));
                }
                Condition::Group(group)
            } else {
                let start = self.cursor.mark();
                let predicate = self
                    .parse_predicate()?
                    .ok_or_else(|| self.error_here("Failed to parse query"))?;

                validator::validate(&predicate).map_err(|e| self.error(e.to_string(), start))?;
                Condition::Predicate(predicate)
            };

            expressions.push(Expression {
                logical,
                negated,
                condition,
            });

            match self.parse_logical() {
                Some(next) => logical = Some(next),
                None => break,
            }
        }

        Ok(ComposedPredicate::new(expressions))
    }

    fn parse_logical(&mut self) -> Option<Logical> {
        self.cursor.skip_whitespace();
        if self.cursor.eol() {
            return None;
        }

        let cursor = &mut self.cursor;
        if cursor.read_expected_with_delims("or", KEYWORD_DELIMS)
            || cursor.read_expected_with_delims("||", KEYWORD_DELIMS)
        {
            Some(Logical::Or)
        } else if cursor.read_expected_with_delims("and", KEYWORD_DELIMS)
            || cursor.read_expected_with_delims("&&", KEYWORD_DELIMS)
        {
            Some(Logical::And)
        } else {
            None
        }
    }

    fn parse_predicate(&mut self) -> Result<Option<Predicate>, ParseError> {
        let Some(left) = self.parse_operand()? else {
            return Ok(None);
        };

        let Some(op) = self.parse_operator() else {
            return Ok(Some(Predicate::exists(left)));
        };
        self.cursor.reset_start();

        // A non-regex after `=~` still parses so the validator can name it.
        let right = match op {
            Operator::MatchRegex => match self.parse_regex()? {
                Some(regex) => Some(regex),
                None => self.parse_operand()?,
            },
            _ => self.parse_operand()?,
        };

        let right = right.ok_or_else(|| {
            self.error_here(format!("Value expected to the right of '{}'", op))
        })?;

        Ok(Some(Predicate::compare(left, op, right)))
    }

    fn parse_operator(&mut self) -> Option<Operator> {
        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();

        let cursor = &mut self.cursor;
        let op = Operator::ALL
            .into_iter()
            .find(|op| cursor.read_expected_with_delims(op.token(), KEYWORD_DELIMS));

        if op.is_none() {
            self.cursor.reset_to(mark);
        }
        op
    }

    /// Operand rules in priority order. Each rule leaves the cursor where it
    /// found it when it does not match.
    fn parse_operand(&mut self) -> Result<Option<Operand>, ParseError> {
        if let Some(path) = self.parse_path()? {
            return Ok(Some(Operand::Path(path)));
        }
        if let Some(list) = self.parse_array()? {
            return Ok(Some(list));
        }
        if let Some(s) = self.parse_string()? {
            return Ok(Some(Operand::String(s)));
        }
        if let Some(n) = self.parse_number(false)? {
            return Ok(Some(Operand::Number(n)));
        }
        Ok(self.parse_null().then_some(Operand::Null))
    }

    fn parse_path(&mut self) -> Result<Option<AttributePath>, ParseError> {
        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();

        if !self.cursor.read_expected("@") {
            self.cursor.reset_to(mark);
            return Ok(None);
        }

        let mut segments = vec![];
        while let Some(segment) = self.parse_path_segment()? {
            segments.push(segment);
        }

        if segments.is_empty() {
            trace!(query = %self.cursor, "'@' without attribute segments");
            self.cursor.reset_to(mark);
            return Ok(None);
        }
        Ok(Some(AttributePath::new(segments)))
    }

    fn parse_path_segment(&mut self) -> Result<Option<String>, ParseError> {
        let mark = self.cursor.mark();
        if !self.cursor.read_expected(".") {
            return Ok(None);
        }

        if self.cursor.peek() == Some('.') {
            return Err(self.error("Attribute pathname matching using '..' not supported", mark));
        }

        let start = self.cursor.position();
        while let Some(c) = self.cursor.peek() {
            match c {
                c if c.is_whitespace() || c == '.' || c == ')' => break,
                '[' => {
                    return Err(self.error(
                        "Array indexing and bracket notation are not supported in attribute paths",
                        mark,
                    ));
                }
                '(' => {
                    return Err(self.error(
                        "Functions are not supported in attribute paths",
                        mark,
                    ));
                }
                _ => {
                    self.cursor.read();
                }
            }
        }

        if self.cursor.position() == start {
            self.cursor.reset_to(mark);
            return Ok(None);
        }
        Ok(Some(self.cursor.slice(start, self.cursor.position())))
    }

    fn parse_array(&mut self) -> Result<Option<Operand>, ParseError> {
        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();

        if !self.cursor.read_expected("[") {
            self.cursor.reset_to(mark);
            return Ok(None);
        }

        // Once '[' is seen the list has to parse without errors.
        let mut items = vec![];
        if self.read_delim("]") {
            return Ok(Some(Operand::List(items)));
        }

        loop {
            let element = self
                .parse_array_element()?
                .ok_or_else(|| self.error_here("Unexpected element in array"))?;
            items.push(element);

            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                Some(',') => {
                    self.cursor.read();
                }
                Some(']') => {
                    self.cursor.read();
                    break;
                }
                _ => {
                    return Err(
                        self.error_here("Unexpected character in array - expected ',' or ']'")
                    );
                }
            }
        }

        Ok(Some(Operand::List(items)))
    }

    fn parse_array_element(&mut self) -> Result<Option<Operand>, ParseError> {
        if let Some(s) = self.parse_string()? {
            return Ok(Some(Operand::String(s)));
        }
        if let Some(n) = self.parse_number(true)? {
            return Ok(Some(Operand::Number(n)));
        }
        Ok(self.parse_null().then_some(Operand::Null))
    }

    fn parse_string(&mut self) -> Result<Option<String>, ParseError> {
        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();
        let start = self.cursor.position();

        let quote = match self.cursor.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => {
                self.cursor.reset_to(mark);
                return Ok(None);
            }
        };
        self.cursor.read();

        if !self.cursor.read_until(quote) {
            return Err(self.error("Failed to read string - missing end quote", start));
        }
        let text = self.cursor.slice(start + 1, self.cursor.position());
        self.cursor.read(); // closing quote
        Ok(Some(text))
    }

    /// Top-level numbers end at whitespace or `)`; inside a list they may
    /// also end at `,` or `]`.
    fn parse_number(&mut self, in_list: bool) -> Result<Option<BigDecimal>, ParseError> {
        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();
        let start = self.cursor.position();

        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_digit() || c == '.' || (c == '-' && self.cursor.position() == start) {
                self.cursor.read();
            } else if c.is_whitespace() || c == ')' || (in_list && (c == ',' || c == ']')) {
                break;
            } else {
                trace!(query = %self.cursor, "invalid character for number: '{}'", c);
                self.cursor.reset_to(mark);
                return Ok(None);
            }
        }

        let text = self.cursor.slice(start, self.cursor.position());
        if !is_number_literal(&text) {
            self.cursor.reset_to(mark);
            return Ok(None);
        }

        BigDecimal::from_str(&text)
            .map(Some)
            .map_err(|e| self.error(format!("Invalid number '{}': {}", text, e), start))
    }

    fn parse_null(&mut self) -> bool {
        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();

        if !self.cursor.read_expected("null") {
            self.cursor.reset_to(mark);
            return false;
        }

        // next one should be end of input, whitespace, ',', ']' or ')'
        let bounded = self.cursor.eol()
            || self.cursor.peek().is_some_and(char::is_whitespace)
            || self.cursor.peek_for_any(&[',', ']', ')']);
        if !bounded {
            self.cursor.reset_to(mark);
        }
        bounded
    }

    /// `/pattern/flags`, where `\/` stands for a literal slash.
    fn parse_regex(&mut self) -> Result<Option<Operand>, ParseError> {
        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();
        let start = self.cursor.position();

        if !self.cursor.read_expected("/") {
            self.cursor.reset_to(mark);
            return Ok(None);
        }

        let mut source = String::new();
        let mut last = '/';
        let mut closed = false;
        while let Some(c) = self.cursor.read() {
            if c == '/' {
                if last != '\\' {
                    closed = true;
                    break;
                }
                source.pop();
            }
            source.push(c);
            last = c;
        }
        if !closed {
            return Err(self.error("Expected end of regex expression", start));
        }

        let mut flags = String::new();
        while let Some(c) = self.cursor.peek() {
            if c.is_whitespace() || c == ')' {
                break;
            }
            flags.push(c);
            self.cursor.read();
        }

        RegexPattern::new(&source, &flags)
            .map(|pattern| Some(Operand::Regex(pattern)))
            .map_err(|e| self.error(e.to_string(), start))
    }
}

/// `-? digit+ ( '.' digit+ )?`
fn is_number_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.is_none_or(all_digits)
}
