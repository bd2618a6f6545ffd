//! Position tracking over the input buffer
//!
//! The cursor hands out one code point at a time and keeps the byte offset
//! and the 1-based line number consistent with each other. A newline is LF or
//! CRLF: carriage returns are folded into the code point that follows them,
//! so a CRLF pair is returned as a single `'\n'` and a lone CR never ends a
//! line on its own.
//!
//! Each [`Cursor::advance`] records the width it consumed in a single slot.
//! [`Cursor::retreat`] consumes that slot, so a step can be undone exactly
//! once and never twice in a row.

/// The width and line effect of the most recent forward step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    width: usize,
    newline: bool,
}

/// Byte offset and line tracker over an immutable input
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
    last: Option<Step>,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `input`
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            last: None,
        }
    }

    /// The whole input buffer
    #[inline(always)]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// The unread part of the input
    #[inline(always)]
    pub fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// Next unread byte offset
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 1 + number of newlines consumed so far
    #[inline(always)]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the next code point and moves past it.
    ///
    /// Carriage returns are consumed together with the code point after them.
    /// At end of input this returns `None`; a trailing lone CR is consumed
    /// on the way.
    pub fn advance(&mut self) -> Option<char> {
        let start = self.offset;
        let mut chars = self.input[start..].chars();
        let mut width = 0;

        let next = loop {
            match chars.next() {
                Some('\r') => width += 1,
                Some(c) => {
                    width += c.len_utf8();
                    break Some(c);
                }
                None => break None,
            }
        };

        let newline = next == Some('\n');
        if newline {
            self.line += 1;
        }
        self.offset += width;
        self.last = Some(Step { width, newline });
        next
    }

    /// Undoes the last [`advance`](Self::advance).
    ///
    /// # Panics
    ///
    /// Panics when called without an intervening `advance`, including a
    /// second `retreat` in a row.
    pub fn retreat(&mut self) {
        let step = self
            .last
            .take()
            .expect("retreat called without a preceding advance");
        self.offset -= step.width;
        if step.newline {
            self.line -= 1;
        }
    }

    /// Returns the next code point without consuming it
    pub fn peek(&mut self) -> Option<char> {
        let next = self.advance();
        self.retreat();
        next
    }

    /// Reports whether the unread input starts with `s`
    #[inline]
    pub fn is_next(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Advances over `n` code points
    pub fn bump(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Consumes the next code point if it equals `expected`
    pub fn eat(&mut self, expected: char) -> bool {
        match self.advance() {
            Some(c) if c == expected => true,
            _ => {
                self.retreat();
                false
            }
        }
    }

    /// Consumes spaces and tabs
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(crate::chars::is_whitespace) {
            self.advance();
        }
    }

    /// Consumes carriage returns that are not part of a CRLF pair, leaving
    /// the code point after them unread
    pub fn skip_carriage_returns(&mut self) {
        let rest = self.rest();
        let mut width = rest.len() - rest.trim_start_matches('\r').len();
        if rest[width..].starts_with('\n') {
            width = width.saturating_sub(1);
        }
        self.offset += width;
        self.last = Some(Step {
            width,
            newline: false,
        });
    }
}
