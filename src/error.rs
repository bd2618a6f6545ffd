//! Error types and position tracking for TOML scanning
//!
//! Every failure the scanner can hit is a [`LexError`]. Its `Display` text is
//! exactly the message carried by the terminal [`TokenKind::Error`] token, so a
//! consumer pulling raw tokens and a consumer using [`tokenize`] see the same
//! wording. [`ScanError`] adds the input name and a resolved [`Position`].
//!
//! [`TokenKind::Error`]: crate::TokenKind::Error
//! [`tokenize`]: crate::tokenize

use std::fmt;
use thiserror::Error;

use crate::strings::StringKind;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, counted in code points)
    pub column: usize,
    /// Byte offset from start of input (0-based)
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Resolves a byte offset into a full position.
    ///
    /// The line number follows the scanner's newline definition (LF or CRLF);
    /// a lone carriage return does not start a new line.
    pub fn locate(source: &str, offset: usize) -> Self {
        let mut position = Self::new();
        position.advance_by(&source[..offset.min(source.len())]);
        position
    }

    /// Advances the position by one character
    pub fn advance(&mut self, c: char) {
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            // Part of a CRLF pair or a lone CR, neither moves the column.
            '\r' => {}
            _ => {
                self.column += 1;
            }
        }
        self.offset += c.len_utf8();
    }

    /// Advances the position by multiple characters
    pub fn advance_by(&mut self, text: &str) {
        for c in text.chars() {
            self.advance(c);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A code point rendered as `U+XXXX 'c'` in diagnostics.
///
/// The quoted glyph is left out for control characters so messages never
/// carry raw control bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodePoint(pub char);

impl fmt::Display for CodePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_control() {
            write!(f, "U+{:04X}", self.0 as u32)
        } else {
            write!(f, "U+{:04X} '{}'", self.0 as u32, self.0)
        }
    }
}

/// Integer bases that use a `0x`, `0o` or `0b` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Radix {
    Hexadecimal,
    Octal,
    Binary,
}

impl Radix {
    /// The two-character prefix introducing this base
    pub fn prefix(self) -> &'static str {
        match self {
            Radix::Hexadecimal => "0x",
            Radix::Octal => "0o",
            Radix::Binary => "0b",
        }
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Radix::Hexadecimal => "hexadecimal",
            Radix::Octal => "octal",
            Radix::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// Lexical analysis errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A character that cannot start a key, a comment or `=`
    #[error("invalid character: `{0}`")]
    InvalidCharacter(CodePoint),

    /// End of line or input where a value is mandatory
    #[error("invalid unspecified value")]
    MissingValue,

    /// A character that cannot start a value
    #[error("invalid value: `{0}`")]
    InvalidValue(CodePoint),

    /// A bare word that is not `true`, `false`, `inf` or `nan`
    #[error("invalid value: `{0}`")]
    InvalidBareWord(String),

    /// A quote character the string scanners do not handle
    #[error("unsupported delimiter: `{0}`")]
    UnsupportedDelimiter(CodePoint),

    /// Control character inside a comment
    #[error("unexpected control character in comment: `{0}`")]
    ControlCharacterInComment(CodePoint),

    /// Control character inside a string that forbids it
    #[error("unexpected control character in {kind}: `{character}`")]
    ControlCharacterInString {
        kind: StringKind,
        character: CodePoint,
    },

    /// String literal not properly terminated
    #[error("unterminated {0}")]
    UnterminatedString(StringKind),

    /// Unknown escape letter after a backslash
    #[error("invalid escape: `{0}`")]
    InvalidEscape(CodePoint),

    /// Non-hex character inside a `\u`/`\U` escape
    #[error("unexpected character: `{0}`")]
    InvalidHexDigit(CodePoint),

    /// Escape value outside the Unicode scalar range
    #[error("invalid unicode scalar: `{0}`")]
    InvalidUnicodeScalar(String),

    /// Input ended in the middle of an escape sequence
    #[error("unexpected end of input in escape sequence")]
    UnterminatedEscape,

    /// Underscore not followed by a digit of the active base
    #[error("expected integer after '_'")]
    UnderscoreNotFollowedByDigit,

    /// Underscore not preceded by a digit of the active base
    #[error("expected integer before '_'")]
    UnderscoreNotPrecededByDigit,

    /// A sign, prefix, decimal point or exponent marker without digits
    #[error("expected digit after '{0}'")]
    ExpectedDigit(String),

    /// `+`/`-` in front of a prefixed integer
    #[error("sign is not allowed on {0} integers")]
    SignedRadixInteger(Radix),

    /// Malformed date, time or offset
    #[error("invalid {component} in date-time `{text}`")]
    InvalidDatetime {
        component: &'static str,
        text: String,
    },

    /// A configured resource limit was reached
    #[error("{what} exceeds the limit of {limit}")]
    LimitExceeded { what: &'static str, limit: usize },
}

/// A terminal scan error with its input name and resolved position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}:{position}: {source}")]
pub struct ScanError {
    /// The advisory input name given to the lexer
    pub name: String,
    /// Where the failing token starts
    pub position: Position,
    /// The underlying lexical error
    pub source: LexError,
}

impl ScanError {
    /// Creates a scan error, resolving `offset` against `source_text`
    pub fn new(name: impl Into<String>, source_text: &str, offset: usize, error: LexError) -> Self {
        Self {
            name: name.into(),
            position: Position::locate(source_text, offset),
            source: error,
        }
    }

    /// Formats the error with the offending line and a caret under the
    /// failing position.
    pub fn render(&self, source_text: &str) -> String {
        let mut output = format!("error: {}\n --> {}:{}\n", self.source, self.name, self.position);

        let lines: Vec<&str> = source_text.lines().collect();
        let index = self.position.line.saturating_sub(1);
        let Some(line) = lines.get(index) else {
            return output;
        };
        let line = line.trim_end_matches('\r');

        let width = self.position.line.to_string().len();
        output.push_str(&format!("{:width$} |\n", "", width = width));
        output.push_str(&format!(
            "{:width$} | {}\n",
            self.position.line,
            line,
            width = width
        ));
        let spaces = " ".repeat(self.position.column.saturating_sub(1));
        output.push_str(&format!("{:width$} | {}^\n", "", spaces, width = width));
        output
    }
}
