//! Position-tracking scanner over raw query text.
//!
//! The cursor has no knowledge of the grammar. It hands out characters,
//! matches literal tokens and lets the parser rewind to saved marks when an
//! operand rule fails half way through.

use std::fmt;

pub struct Cursor {
    input: Vec<char>,
    position: usize,
    start: usize,
}

impl Cursor {
    pub fn new(input: &str) -> Self {
        Cursor {
            input: input.chars().collect(),
            position: 0,
            start: 0,
        }
    }

    /// Current offset, in characters.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Consumes and returns the next character. At end of input nothing is
    /// consumed.
    pub fn read(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    /// Steps back over the last character read.
    pub fn unread(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    pub fn eol(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    /// True when the next character is one of `chars`.
    pub fn peek_for_any(&self, chars: &[char]) -> bool {
        self.peek().is_some_and(|c| chars.contains(&c))
    }

    fn matches_at_position(&self, token: &str) -> Option<usize> {
        let mut len = 0;
        for expected in token.chars() {
            if self.peek_at(len) != Some(expected) {
                return None;
            }
            len += 1;
        }
        Some(len)
    }

    /// Consumes `token` if the input continues with it, otherwise leaves the
    /// position untouched.
    pub fn read_expected(&mut self, token: &str) -> bool {
        match self.matches_at_position(token) {
            Some(len) => {
                self.position += len;
                true
            }
            None => false,
        }
    }

    /// Like [`Cursor::read_expected`], but the token must be followed by
    /// whitespace, end of input or one of `delims`. Keeps `in` from matching
    /// the start of `index`.
    pub fn read_expected_with_delims(&mut self, token: &str, delims: &[char]) -> bool {
        let Some(len) = self.matches_at_position(token) else {
            return false;
        };
        match self.peek_at(len) {
            None => {}
            Some(c) if c.is_whitespace() || delims.contains(&c) => {}
            Some(_) => return false,
        }
        self.position += len;
        true
    }

    /// Advances up to (not past) the next `stop` character. Returns false and
    /// stops at end of input when there is none.
    pub fn read_until(&mut self, stop: char) -> bool {
        while let Some(ch) = self.peek() {
            if ch == stop {
                return true;
            }
            self.position += 1;
        }
        false
    }

    pub fn mark(&self) -> usize {
        self.position
    }

    /// Records the current position as the start of the construct being
    /// parsed, for [`Cursor::reset`] and error context.
    pub fn reset_start(&mut self) {
        self.start = self.position;
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Rewinds to the last [`Cursor::reset_start`] position.
    pub fn reset(&mut self) {
        self.position = self.start;
    }

    pub fn reset_to(&mut self, mark: usize) {
        self.position = mark.min(self.input.len());
    }

    /// Text between two offsets.
    pub fn slice(&self, from: usize, to: usize) -> String {
        let to = to.min(self.input.len());
        let from = from.min(to);
        self.input[from..to].iter().collect()
    }

    /// Unconsumed input.
    pub fn remaining(&self) -> String {
        self.slice(self.position, self.input.len())
    }

    /// Input from `mark` to the end, used when reporting an error about a
    /// construct that started at `mark`.
    pub fn fragment_from(&self, mark: usize) -> String {
        self.slice(mark, self.input.len())
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let before = self.slice(0, self.position);
        write!(f, "{}<HERE>{}", before, self.remaining())
    }
}
