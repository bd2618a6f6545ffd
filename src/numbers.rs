//! Numeric and boolean literals
//!
//! Numerals are validated for shape only and emitted verbatim; converting
//! the text to a number is left to the consumer. Underscores may only sit
//! between two digits of the active base.

use crate::chars;
use crate::error::{CodePoint, LexError, Radix};
use crate::lexer::{Lexer, Token, TokenKind};

/// Length of the leading run of bare-key characters
fn bare_word_len(s: &str) -> usize {
    s.find(|c: char| !chars::is_bare_key(c)).unwrap_or(s.len())
}

impl<'a> Lexer<'a> {
    /// Scans an integer or float, optionally signed, including `inf`/`nan`
    pub(crate) fn lex_number(&mut self) -> Result<Token<'a>, LexError> {
        let sign = match self.cursor.peek() {
            Some(s @ ('+' | '-')) => {
                self.cursor.advance();
                Some(s)
            }
            _ => None,
        };

        match (sign, self.cursor.peek()) {
            (_, Some(c)) if chars::is_digit(c) => {}
            (Some(sign), Some('i' | 'n')) => {
                let rest = self.cursor.rest();
                let len = bare_word_len(rest);
                let word = &rest[..len];
                self.cursor.bump(len);
                return match word {
                    "inf" | "nan" => self.emit(TokenKind::FloatValue),
                    _ => Err(LexError::InvalidBareWord(format!("{sign}{word}"))),
                };
            }
            (Some(sign), _) => return Err(LexError::ExpectedDigit(sign.to_string())),
            (None, Some(c)) => return Err(LexError::InvalidValue(CodePoint(c))),
            (None, None) => return Err(LexError::MissingValue),
        }

        if self.cursor.advance() == Some('0') {
            let radix = match self.cursor.peek() {
                Some('x') => Some(Radix::Hexadecimal),
                Some('o') => Some(Radix::Octal),
                Some('b') => Some(Radix::Binary),
                _ => None,
            };
            if let Some(radix) = radix {
                self.cursor.advance();
                // Prefixed integers are unsigned: `-0o17` is an error, not a
                // negative octal
                if sign.is_some() {
                    return Err(LexError::SignedRadixInteger(radix));
                }
                self.scan_digits(&|c| chars::is_radix_digit(c, radix), radix.prefix())?;
                return self.emit(TokenKind::IntegerValue);
            }
        }

        self.scan_digit_tail(&chars::is_digit)?;

        let mut is_float = false;
        if self.cursor.eat('.') {
            self.scan_digits(&chars::is_digit, ".")?;
            is_float = true;
        }

        if let Some(marker @ ('e' | 'E')) = self.cursor.peek() {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            self.scan_digits(&chars::is_digit, &marker.to_string())?;
            is_float = true;
        }

        let kind = if is_float {
            TokenKind::FloatValue
        } else {
            TokenKind::IntegerValue
        };
        self.emit(kind)
    }

    /// Scans `true`, `false`, `inf` or `nan`
    pub(crate) fn lex_bare_word(&mut self) -> Result<Token<'a>, LexError> {
        let rest = self.cursor.rest();
        let len = bare_word_len(rest);
        let word = &rest[..len];
        self.cursor.bump(len);

        match word {
            "true" | "false" => self.emit(TokenKind::BooleanValue),
            "inf" | "nan" => self.emit(TokenKind::FloatValue),
            _ => Err(LexError::InvalidBareWord(word.to_string())),
        }
    }

    /// Scans a digit run that must open with a digit
    fn scan_digits(&mut self, is_digit: &impl Fn(char) -> bool, after: &str) -> Result<(), LexError> {
        match self.cursor.peek() {
            Some(c) if is_digit(c) => {
                self.cursor.advance();
            }
            Some('_') => {
                self.cursor.advance();
                return Err(LexError::UnderscoreNotPrecededByDigit);
            }
            _ => return Err(LexError::ExpectedDigit(after.to_string())),
        }
        self.scan_digit_tail(is_digit)
    }

    /// Continues a digit run once at least one digit has been consumed
    fn scan_digit_tail(&mut self, is_digit: &impl Fn(char) -> bool) -> Result<(), LexError> {
        loop {
            match self.cursor.peek() {
                Some(c) if is_digit(c) => {
                    self.cursor.advance();
                }
                Some('_') => {
                    self.cursor.advance();
                    match self.cursor.peek() {
                        Some(c) if is_digit(c) => {
                            self.cursor.advance();
                        }
                        _ => return Err(LexError::UnderscoreNotFollowedByDigit),
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn value_of(value: &str) -> (TokenKind, String) {
        let input = format!("key = {value}");
        let token = Lexer::new("test", &input)
            .nth(2)
            .expect("a value token");
        (token.kind, token.text.into_owned())
    }

    fn integer(text: &str) -> (TokenKind, String) {
        (TokenKind::IntegerValue, text.to_string())
    }

    fn float(text: &str) -> (TokenKind, String) {
        (TokenKind::FloatValue, text.to_string())
    }

    fn error(text: &str) -> (TokenKind, String) {
        (TokenKind::Error, text.to_string())
    }

    #[test]
    fn test_bare_word_len() {
        assert_eq!(bare_word_len("true # x"), 4);
        assert_eq!(bare_word_len("nan"), 3);
        assert_eq!(bare_word_len(".5"), 0);
    }

    #[test]
    fn test_decimal_integers() {
        for text in ["+99", "42", "0", "-17", "01234", "1_000", "5_349_221", "1_2_3_4_5"] {
            assert_eq!(value_of(text), integer(text));
        }
    }

    #[test]
    fn test_prefixed_integers() {
        for text in ["0xDEADBEEF", "0xdeadbeef", "0xdead_beef", "0o01234567", "0o755", "0b11010110"] {
            assert_eq!(value_of(text), integer(text));
        }
    }

    #[test]
    fn test_prefixed_integer_errors() {
        assert_eq!(value_of("0x"), error("expected digit after '0x'"));
        assert_eq!(value_of("0x_1"), error("expected integer before '_'"));
        assert_eq!(value_of("0b1_"), error("expected integer after '_'"));
        assert_eq!(value_of("+0x1F"), error("sign is not allowed on hexadecimal integers"));
        assert_eq!(value_of("-0o7"), error("sign is not allowed on octal integers"));
        assert_eq!(
            value_of("-0o01234567"),
            error("sign is not allowed on octal integers")
        );
    }

    #[test]
    fn test_prefixed_integer_stops_at_foreign_digit() {
        let kinds: Vec<TokenKind> = Lexer::new("test", "key = 0o78").map(|t| t.kind).collect();
        assert_eq!(kinds[2], TokenKind::IntegerValue);
        let texts: Vec<String> = Lexer::new("test", "key = 0o78")
            .map(|t| t.text.into_owned())
            .collect();
        assert_eq!(texts[2], "0o7");
    }

    #[test]
    fn test_floats() {
        for text in [
            "+1.0",
            "3.1415",
            "-0.01",
            "5e+22",
            "1e06",
            "-2E-2",
            "6.626e-34",
            "224_617.445_991_228",
            "9_224_617.445_991_228_313",
            "1e1_000",
        ] {
            assert_eq!(value_of(text), float(text));
        }
    }

    #[test]
    fn test_special_floats() {
        for text in ["inf", "+inf", "-inf", "nan", "+nan", "-nan"] {
            assert_eq!(value_of(text), float(text));
        }
    }

    #[test]
    fn test_float_errors() {
        assert_eq!(value_of("1."), error("expected digit after '.'"));
        assert_eq!(value_of("1.e5"), error("expected digit after '.'"));
        assert_eq!(value_of("1e"), error("expected digit after 'e'"));
        assert_eq!(value_of("1E+"), error("expected digit after 'E'"));
        assert_eq!(value_of("1._5"), error("expected integer before '_'"));
    }

    #[test]
    fn test_underscore_errors() {
        assert_eq!(value_of("1_"), error("expected integer after '_'"));
        assert_eq!(value_of("1__2"), error("expected integer after '_'"));
        assert_eq!(value_of("1_.5"), error("expected integer after '_'"));
    }

    #[test]
    fn test_sign_errors() {
        assert_eq!(value_of("+"), error("expected digit after '+'"));
        assert_eq!(value_of("-x"), error("expected digit after '-'"));
        assert_eq!(value_of("+infinity"), error("invalid value: `+infinity`"));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(value_of("true"), (TokenKind::BooleanValue, "true".to_string()));
        assert_eq!(value_of("false"), (TokenKind::BooleanValue, "false".to_string()));
    }

    #[test]
    fn test_bare_word_boundary() {
        assert_eq!(value_of("truex"), error("invalid value: `truex`"));
        assert_eq!(value_of("nan_"), error("invalid value: `nan_`"));
        assert_eq!(value_of("yes"), error("invalid value: `yes`"));
    }

    #[test]
    fn test_boolean_followed_by_comment() {
        let kinds: Vec<TokenKind> = Lexer::new("test", "a = true# done\nb = false")
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Key,
                TokenKind::Equals,
                TokenKind::BooleanValue,
                TokenKind::Key,
                TokenKind::Equals,
                TokenKind::BooleanValue,
                TokenKind::EndOfInput,
            ]
        );
    }
}
