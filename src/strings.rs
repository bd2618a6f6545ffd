//! String scanning for keys and values
//!
//! Four string forms exist: basic (`"..."`, escapes, single line), literal
//! (`'...'`, verbatim, single line) and their triple-quoted multi-line
//! variants. Scanning starts with the cursor just past the opening delimiter
//! and leaves the decoded payload in the lexer's accumulation buffer.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::chars;
use crate::error::{CodePoint, LexError};
use crate::lexer::Lexer;

/// The four string forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringKind {
    Basic,
    Literal,
    MultilineBasic,
    MultilineLiteral,
}

impl StringKind {
    /// Maps an opening quote character to its string form
    pub fn for_delimiter(delimiter: char, multiline: bool) -> Option<Self> {
        match (delimiter, multiline) {
            ('"', false) => Some(StringKind::Basic),
            ('\'', false) => Some(StringKind::Literal),
            ('"', true) => Some(StringKind::MultilineBasic),
            ('\'', true) => Some(StringKind::MultilineLiteral),
            _ => None,
        }
    }

    /// Basic strings decode backslash escapes, literal strings do not
    pub fn allows_escapes(self) -> bool {
        matches!(self, StringKind::Basic | StringKind::MultilineBasic)
    }

    fn quote(self) -> char {
        match self {
            StringKind::Basic | StringKind::MultilineBasic => '"',
            StringKind::Literal | StringKind::MultilineLiteral => '\'',
        }
    }
}

impl fmt::Display for StringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StringKind::Basic => "basic string",
            StringKind::Literal => "literal string",
            StringKind::MultilineBasic => "multi-line basic string",
            StringKind::MultilineLiteral => "multi-line literal string",
        };
        f.write_str(name)
    }
}

impl<'a> Lexer<'a> {
    /// Scans the body of a string of the given kind into the accumulation
    /// buffer and consumes the closing delimiter.
    ///
    /// Returns the byte range of the raw content between the delimiters.
    pub(crate) fn scan_string(&mut self, kind: StringKind) -> Result<Range<usize>, LexError> {
        self.buf.clear();
        match kind {
            StringKind::Basic => self.scan_basic_string(),
            StringKind::Literal => self.scan_literal_string(),
            StringKind::MultilineBasic | StringKind::MultilineLiteral => {
                self.scan_multiline_string(kind)
            }
        }
    }

    fn scan_basic_string(&mut self) -> Result<Range<usize>, LexError> {
        let content_start = self.cursor.offset();
        loop {
            let before = self.cursor.offset();
            match self.cursor.advance() {
                None => return Err(LexError::UnterminatedString(StringKind::Basic)),
                Some('"') => return Ok(content_start..before),
                Some('\\') => self.scan_escape()?,
                Some(_) => self.push_raw(before)?,
            }
        }
    }

    /// Literal strings end at the closing quote or, leniently, at end of input
    fn scan_literal_string(&mut self) -> Result<Range<usize>, LexError> {
        let content_start = self.cursor.offset();
        loop {
            let before = self.cursor.offset();
            match self.cursor.advance() {
                None | Some('\'') => return Ok(content_start..before),
                Some(_) => self.push_raw(before)?,
            }
        }
    }

    fn scan_multiline_string(&mut self, kind: StringKind) -> Result<Range<usize>, LexError> {
        let quote = kind.quote();
        let content_start = self.cursor.offset();

        // A newline right after the opening delimiter is not content. Only
        // one is dropped, a blank line after it stays in the payload.
        self.cursor.eat('\n');

        loop {
            let before = self.cursor.offset();
            match self.cursor.advance() {
                None => return Err(LexError::UnterminatedString(kind)),
                Some(c) if c == quote => {
                    let mut run = 1;
                    while run < 5 && self.cursor.eat(quote) {
                        run += 1;
                    }
                    if run >= 3 {
                        // Up to two quotes right before the closing delimiter are content
                        for _ in 3..run {
                            self.push_char(quote)?;
                        }
                        return Ok(content_start..self.cursor.offset() - 3);
                    }
                    for _ in 0..run {
                        self.push_char(quote)?;
                    }
                }
                Some('\\') if kind.allows_escapes() => {
                    if self.at_line_ending_backslash() {
                        self.skip_line_continuation();
                    } else {
                        self.scan_escape()?;
                    }
                }
                Some(c) if kind.allows_escapes() && c != '\n' && chars::is_control(c) => {
                    return Err(LexError::ControlCharacterInString {
                        kind,
                        character: CodePoint(c),
                    });
                }
                Some(_) => self.push_raw(before)?,
            }
        }
    }

    /// True when only spaces and tabs separate the cursor from a newline
    fn at_line_ending_backslash(&self) -> bool {
        let rest = self.cursor.rest().trim_start_matches([' ', '\t']);
        rest.starts_with('\n') || rest.starts_with("\r\n")
    }

    /// Discards whitespace and newlines up to the next content character
    fn skip_line_continuation(&mut self) {
        while self
            .cursor
            .peek()
            .is_some_and(|c| chars::is_whitespace(c) || c == '\n')
        {
            self.cursor.advance();
        }
    }

    /// Decodes the escape after a backslash
    fn scan_escape(&mut self) -> Result<(), LexError> {
        let decoded = match self.cursor.advance() {
            Some('b') => '\u{8}',
            Some('t') => '\t',
            Some('n') => '\n',
            Some('f') => '\u{c}',
            Some('r') => '\r',
            Some('"') => '"',
            Some('\\') => '\\',
            Some('u') => self.scan_unicode_escape('u', 4)?,
            Some('U') => self.scan_unicode_escape('U', 8)?,
            Some(c) => return Err(LexError::InvalidEscape(CodePoint(c))),
            None => return Err(LexError::UnterminatedEscape),
        };
        self.push_char(decoded)
    }

    fn scan_unicode_escape(&mut self, marker: char, len: usize) -> Result<char, LexError> {
        let mut digits: SmallVec<[char; 8]> = SmallVec::new();
        for _ in 0..len {
            match self.cursor.advance() {
                Some(c) if chars::is_hex_digit(c) => digits.push(c),
                Some(c) => return Err(LexError::InvalidHexDigit(CodePoint(c))),
                None => return Err(LexError::UnterminatedEscape),
            }
        }

        let hex: String = digits.iter().collect();
        let invalid = || LexError::InvalidUnicodeScalar(format!("\\{marker}{hex}"));

        let value = u32::from_str_radix(&hex, 16).map_err(|_| invalid())?;
        if !chars::is_unicode_scalar(value) {
            return Err(invalid());
        }
        char::from_u32(value).ok_or_else(invalid)
    }

    /// Appends the raw input from `from` up to the cursor
    fn push_raw(&mut self, from: usize) -> Result<(), LexError> {
        let raw = &self.cursor.input()[from..self.cursor.offset()];
        self.buf.push_str(raw);
        self.check_string_length()
    }

    fn push_char(&mut self, c: char) -> Result<(), LexError> {
        self.buf.push(c);
        self.check_string_length()
    }

    fn check_string_length(&self) -> Result<(), LexError> {
        if self.buf.len() > self.config.max_string_length {
            return Err(LexError::LimitExceeded {
                what: "string length",
                limit: self.config.max_string_length,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{LexerConfig, TokenKind};
    use pretty_assertions::assert_eq;

    /// Lexes `key = <value>` and returns the value token's kind and text
    fn value_of(value: &str) -> (TokenKind, String) {
        let input = format!("key = {value}");
        let token = Lexer::new("test", &input)
            .nth(2)
            .expect("a value token");
        (token.kind, token.text.into_owned())
    }

    fn string(text: &str) -> (TokenKind, String) {
        (TokenKind::StringValue, text.to_string())
    }

    fn error(text: &str) -> (TokenKind, String) {
        (TokenKind::Error, text.to_string())
    }

    #[test]
    fn test_string_kind_helpers() {
        assert_eq!(StringKind::for_delimiter('"', true), Some(StringKind::MultilineBasic));
        assert_eq!(StringKind::for_delimiter('\'', false), Some(StringKind::Literal));
        assert_eq!(StringKind::for_delimiter('`', false), None);
        assert!(!StringKind::Literal.allows_escapes());
        assert_eq!(StringKind::Literal.to_string(), "literal string");
    }

    #[test]
    fn test_basic_string_escapes() {
        assert_eq!(value_of(r#""tab\there""#), string("tab\there"));
        assert_eq!(value_of(r#""quote \" inside""#), string("quote \" inside"));
        assert_eq!(value_of(r#""back\\slash""#), string("back\\slash"));
        assert_eq!(value_of(r#""\u00E9\U0001F600""#), string("é😀"));
    }

    #[test]
    fn test_basic_string_invalid_escape() {
        assert_eq!(value_of(r#""bad \q""#), error("invalid escape: `U+0071 'q'`"));
    }

    #[test]
    fn test_unicode_escape_errors() {
        assert_eq!(value_of(r#""\u00G0""#), error("unexpected character: `U+0047 'G'`"));
        assert_eq!(
            value_of(r#""\uD800""#),
            error("invalid unicode scalar: `\\uD800`")
        );
        assert_eq!(
            value_of(r#""\U00110000""#),
            error("invalid unicode scalar: `\\U00110000`")
        );
        assert_eq!(
            value_of(r#""\u00"#),
            error("unexpected end of input in escape sequence")
        );
    }

    #[test]
    fn test_unterminated_basic_string() {
        assert_eq!(value_of("\"abc"), error("unterminated basic string"));
    }

    #[test]
    fn test_literal_string_is_verbatim() {
        assert_eq!(value_of(r"'C:\Users\nodejs\templates'"), string(r"C:\Users\nodejs\templates"));
        assert_eq!(value_of("'<\\i\\c*\\s*>'"), string("<\\i\\c*\\s*>"));
    }

    #[test]
    fn test_literal_string_runs_to_end_of_input() {
        assert_eq!(value_of("'open"), string("open"));
    }

    #[test]
    fn test_multiline_basic_trims_first_newline() {
        assert_eq!(value_of("\"\"\"\nRoses\nViolets\"\"\""), string("Roses\nViolets"));
        // Only one newline is trimmed
        assert_eq!(value_of("\"\"\"\n\nx\"\"\""), string("\nx"));
    }

    #[test]
    fn test_multiline_basic_keeps_crlf() {
        assert_eq!(value_of("\"\"\"hello\r\nworld\"\"\""), string("hello\r\nworld"));
    }

    #[test]
    fn test_multiline_line_continuation() {
        let input = "\"\"\"\nThe quick brown \\\n\n\n  fox jumps over \\\n    the lazy dog.\"\"\"";
        assert_eq!(
            value_of(input),
            string("The quick brown fox jumps over the lazy dog.")
        );

        let input = "\"\"\"\\\n       The quick brown \\\r\n       fox.\\\n       \"\"\"";
        assert_eq!(value_of(input), string("The quick brown fox."));
    }

    #[test]
    fn test_backslash_space_without_newline_is_invalid() {
        assert_eq!(
            value_of("\"\"\"a \\  b\"\"\""),
            error("invalid escape: `U+0020 ' '`")
        );
    }

    #[test]
    fn test_multiline_quote_runs() {
        assert_eq!(
            value_of(r#""""Here are two quotation marks: "". Simple enough.""""#),
            string(r#"Here are two quotation marks: "". Simple enough."#)
        );

        let escaped = "\\\"".repeat(15);
        let quotes = "\"".repeat(15);
        assert_eq!(
            value_of(&format!("\"\"\"Here are fifteen quotation marks: {escaped}.\"\"\"")),
            string(&format!("Here are fifteen quotation marks: {quotes}."))
        );

        assert_eq!(
            value_of("\"\"\"\"This,\" she said, \"is just a pointless statement.\"\"\"\""),
            string("\"This,\" she said, \"is just a pointless statement.\"")
        );
    }

    #[test]
    fn test_three_quotes_close_the_string() {
        let tokens: Vec<_> = Lexer::new("test", r#"str = """Here are three quotation marks: """.""""#)
            .map(|t| (t.kind, t.text.into_owned()))
            .collect();
        assert_eq!(
            tokens[2..].to_vec(),
            vec![
                string("Here are three quotation marks: "),
                error("invalid character: `U+002E '.'`"),
            ]
        );
    }

    #[test]
    fn test_multiline_literal() {
        assert_eq!(
            value_of("'''\nThe first newline is\ntrimmed in raw strings.\n   All other whitespace\n   is preserved.\n'''"),
            string("The first newline is\ntrimmed in raw strings.\n   All other whitespace\n   is preserved.\n")
        );
        let quotes = "\"".repeat(15);
        assert_eq!(
            value_of(&format!("'''Here are fifteen quotation marks: {quotes}'''")),
            string(&format!("Here are fifteen quotation marks: {quotes}"))
        );
        assert_eq!(
            value_of("''''That,' she said, 'is still pointless.''''"),
            string("'That,' she said, 'is still pointless.'")
        );
        assert_eq!(value_of(r"'''no \escapes\n'''"), string(r"no \escapes\n"));
        assert_eq!(
            value_of("'''\n\nhello\nworld\n'''"),
            string("\nhello\nworld\n")
        );
    }

    #[test]
    fn test_unterminated_multiline_strings() {
        assert_eq!(
            value_of("\"\"\"open\n"),
            error("unterminated multi-line basic string")
        );
        assert_eq!(
            value_of("'''open''"),
            error("unterminated multi-line literal string")
        );
    }

    #[test]
    fn test_multiline_basic_rejects_control_characters() {
        assert_eq!(
            value_of("\"\"\"a\u{1}b\"\"\""),
            error("unexpected control character in multi-line basic string: `U+0001`")
        );
        assert_eq!(value_of("\"\"\"a\tb\"\"\""), string("a\tb"));
    }

    #[test]
    fn test_string_length_limit() {
        let config = LexerConfig {
            max_string_length: 4,
            ..LexerConfig::default()
        };
        let token = Lexer::with_config("test", "key = \"abcde\"", config)
            .last()
            .unwrap();
        assert_eq!(token.kind, TokenKind::Error);
        assert_eq!(token.text, "string length exceeds the limit of 4");
    }

    #[test]
    fn test_quoted_key_prefix_is_discarded() {
        let tokens: Vec<_> = Lexer::new("test", "abc'def' = 1")
            .map(|t| (t.kind, t.text.into_owned()))
            .collect();
        assert_eq!(tokens[0], (TokenKind::Key, "def".to_string()));
    }
}
