//! TOML lexical analyzer
//!
//! This module provides the token model and the state machine that drives
//! scanning. The lexer is pull-based: every call to [`Lexer::next_token`]
//! (or [`Iterator::next`]) runs the state machine until exactly one token is
//! produced, then suspends. The stream ends with a single terminal token,
//! either [`TokenKind::EndOfInput`] or [`TokenKind::Error`], after which the
//! lexer yields nothing.

use std::borrow::Cow;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::chars;
use crate::cursor::Cursor;
use crate::datetime;
use crate::error::{CodePoint, LexError, ScanError};
use crate::strings::StringKind;

/// Configuration options for the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerConfig {
    /// Save comments for later retrieval
    pub save_comments: bool,
    /// Maximum decoded string length to prevent memory exhaustion
    pub max_string_length: usize,
    /// Maximum comment length
    pub max_comment_length: usize,
    /// Maximum number of tokens to prevent runaway inputs
    pub max_tokens: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            save_comments: cfg!(feature = "save-comments"),
            max_string_length: 1024 * 1024, // 1MB default
            max_comment_length: 64 * 1024,  // 64KB for comments
            max_tokens: 1_000_000,          // 1M tokens max
        }
    }
}

/// TOML token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    EndOfInput,
    Error,
    Key,
    Equals,
    StringValue,
    IntegerValue,
    FloatValue,
    BooleanValue,
    TimeValue,
}

impl TokenKind {
    /// Returns a string representation of the token kind for error messages
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::EndOfInput => "end of input",
            TokenKind::Error => "error",
            TokenKind::Key => "key",
            TokenKind::Equals => "'='",
            TokenKind::StringValue => "string",
            TokenKind::IntegerValue => "integer",
            TokenKind::FloatValue => "float",
            TokenKind::BooleanValue => "boolean",
            TokenKind::TimeValue => "date-time",
        }
    }

    /// True for the two kinds that end a stream
    pub fn is_terminal(self) -> bool {
        matches!(self, TokenKind::EndOfInput | TokenKind::Error)
    }

    /// True for the kinds produced at the value position after `=`
    pub fn is_value(self) -> bool {
        matches!(
            self,
            TokenKind::StringValue
                | TokenKind::IntegerValue
                | TokenKind::FloatValue
                | TokenKind::BooleanValue
                | TokenKind::TimeValue
        )
    }
}

/// A classified, positioned fragment of input
///
/// `text` is the verbatim source span for `=`, numerals, booleans, date-times
/// and bare keys, the decoded payload for strings and quoted keys, and the
/// diagnostic message for errors. It borrows from the input whenever the
/// payload is identical to the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    #[serde(borrow)]
    pub text: Cow<'a, str>,
    /// Byte offset where the token starts
    pub offset: usize,
    /// Byte offset one past the raw span
    pub end: usize,
    /// Line where the token starts (1-based)
    pub line: usize,
}

impl<'a> Token<'a> {
    /// The raw byte range the token was scanned from
    pub fn span(&self) -> Range<usize> {
        self.offset..self.end
    }

    /// Detaches the token from the input lifetime
    pub fn into_owned(self) -> Token<'static> {
        Token {
            kind: self.kind,
            text: Cow::Owned(self.text.into_owned()),
            offset: self.offset,
            end: self.end,
            line: self.line,
        }
    }
}

/// Information about a comment found during lexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment<'a> {
    /// The comment text without `#` and without the line terminator
    pub text: &'a str,
    /// Byte offset of the `#`
    pub offset: usize,
    /// Line of the `#`
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Top level, between keys and values
    Text,
    Comment,
    Key,
    Equals,
    /// Right after `=`, a value is mandatory
    Value,
    /// A terminal token has been produced
    Done,
}

/// What a state produced when it ran
enum Transition<'a> {
    Next(State),
    Emit(Token<'a>, State),
}

/// TOML lexer over a fully buffered input
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    /// Advisory input name, used only in diagnostics
    name: &'a str,
    pub(crate) cursor: Cursor<'a>,
    /// Start of the token being accumulated
    start: usize,
    start_line: usize,
    /// Decoded payload of the string being scanned
    pub(crate) buf: String,
    state: State,
    pub(crate) config: LexerConfig,
    token_count: usize,
    comments: Vec<Comment<'a>>,
    error: Option<LexError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer with default configuration
    pub fn new(name: &'a str, input: &'a str) -> Self {
        Self::with_config(name, input, LexerConfig::default())
    }

    /// Creates a new lexer with custom configuration
    pub fn with_config(name: &'a str, input: &'a str, config: LexerConfig) -> Self {
        debug!(input = name, len = input.len(), "starting scan");
        Self {
            name,
            cursor: Cursor::new(input),
            start: 0,
            start_line: 1,
            buf: String::new(),
            state: State::Text,
            config,
            token_count: 0,
            comments: Vec::new(),
            error: None,
        }
    }

    /// The advisory input name
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The underlying source text
    pub fn source(&self) -> &'a str {
        self.cursor.input()
    }

    /// The configuration in effect
    pub fn config(&self) -> &LexerConfig {
        &self.config
    }

    /// Comments collected so far (only populated when `save_comments` is on)
    pub fn comments(&self) -> &[Comment<'a>] {
        &self.comments
    }

    /// Number of tokens produced, not counting the terminal token
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// The typed error behind a terminal `Error` token
    pub fn error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }

    /// True once the terminal token has been handed out
    pub fn is_finished(&self) -> bool {
        self.state == State::Done
    }

    /// Runs the state machine until the next token is produced.
    ///
    /// Returns `None` once the terminal token has been returned.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        match self.pull()? {
            Ok(token) => Some(token),
            Err(error) => Some(self.fail(error)),
        }
    }

    /// Collects the remaining tokens, turning a terminal error into a
    /// [`ScanError`]. The returned tokens end with `EndOfInput`.
    pub fn collect_tokens(mut self) -> Result<Vec<Token<'a>>, ScanError> {
        let mut tokens = Vec::new();
        while let Some(result) = self.pull() {
            match result {
                Ok(token) => tokens.push(token),
                Err(error) => {
                    return Err(ScanError::new(
                        self.name,
                        self.cursor.input(),
                        self.start,
                        error,
                    ));
                }
            }
        }
        Ok(tokens)
    }

    /// Runs states until one produces a token or fails. A failure ends the
    /// stream.
    fn pull(&mut self) -> Option<Result<Token<'a>, LexError>> {
        loop {
            let result = match self.state {
                State::Done => return None,
                State::Text => self.lex_text(),
                State::Comment => self.lex_comment(),
                State::Key => self.lex_key(),
                State::Equals => self.lex_equals(),
                State::Value => self.lex_value(),
            };

            match result {
                Ok(Transition::Next(state)) => self.state = state,
                Ok(Transition::Emit(token, state)) => {
                    self.state = state;
                    return Some(Ok(token));
                }
                Err(error) => {
                    self.state = State::Done;
                    debug!(
                        input = self.name,
                        offset = self.start,
                        line = self.start_line,
                        %error,
                        "scan aborted"
                    );
                    return Some(Err(error));
                }
            }
        }
    }

    fn lex_text(&mut self) -> Result<Transition<'a>, LexError> {
        loop {
            match self.cursor.peek() {
                None => {
                    // Swallows a trailing lone CR
                    self.cursor.advance();
                    self.ignore();
                    let token = self.emit(TokenKind::EndOfInput)?;
                    return Ok(Transition::Emit(token, State::Done));
                }
                Some(c) if chars::is_whitespace(c) || c == '\n' => {
                    self.cursor.advance();
                    self.ignore();
                }
                Some(c) => {
                    // Lone CRs fold into the next code point; keep them out of the token.
                    self.cursor.skip_carriage_returns();
                    self.ignore();
                    return match c {
                        '#' => Ok(Transition::Next(State::Comment)),
                        '=' => Ok(Transition::Next(State::Equals)),
                        c if chars::is_key_start(c) => Ok(Transition::Next(State::Key)),
                        c => {
                            self.cursor.advance();
                            Err(LexError::InvalidCharacter(CodePoint(c)))
                        }
                    };
                }
            }
        }
    }

    fn lex_comment(&mut self) -> Result<Transition<'a>, LexError> {
        self.cursor.advance(); // '#'
        let text_start = self.cursor.offset();

        let text_end = loop {
            let before = self.cursor.offset();
            match self.cursor.advance() {
                None | Some('\n') => break before,
                Some(c) if chars::is_control(c) => {
                    return Err(LexError::ControlCharacterInComment(CodePoint(c)));
                }
                Some(_) => {
                    if self.cursor.offset() - text_start > self.config.max_comment_length {
                        return Err(LexError::LimitExceeded {
                            what: "comment length",
                            limit: self.config.max_comment_length,
                        });
                    }
                }
            }
        };

        if self.config.save_comments {
            self.comments.push(Comment {
                text: &self.cursor.input()[text_start..text_end],
                offset: self.start,
                line: self.start_line,
            });
        }

        self.ignore();
        Ok(Transition::Next(State::Text))
    }

    fn lex_key(&mut self) -> Result<Transition<'a>, LexError> {
        loop {
            match self.cursor.advance() {
                Some(delim @ ('"' | '\'')) => {
                    // A quoted segment replaces whatever bare prefix came before it.
                    let kind = StringKind::for_delimiter(delim, false)
                        .ok_or(LexError::UnsupportedDelimiter(CodePoint(delim)))?;
                    let content = self.scan_string(kind)?;
                    let token = self.emit_buffer(TokenKind::Key, content)?;
                    return Ok(Transition::Emit(token, State::Text));
                }
                Some(c) if chars::is_bare_key(c) || c == '\n' => {}
                _ => {
                    self.cursor.retreat();
                    let token = self.emit(TokenKind::Key)?;
                    return Ok(Transition::Emit(token, State::Text));
                }
            }
        }
    }

    fn lex_equals(&mut self) -> Result<Transition<'a>, LexError> {
        self.cursor.advance();
        let token = self.emit(TokenKind::Equals)?;
        Ok(Transition::Emit(token, State::Value))
    }

    fn lex_value(&mut self) -> Result<Transition<'a>, LexError> {
        self.cursor.skip_whitespace();
        self.cursor.skip_carriage_returns();
        self.ignore();

        let token = match self.cursor.peek() {
            None | Some('\n') => return Err(LexError::MissingValue),
            Some(delim @ ('"' | '\'')) => {
                self.cursor.advance();
                let triple = if delim == '"' { "\"\"" } else { "''" };
                let multiline = self.cursor.is_next(triple);
                if multiline {
                    self.cursor.bump(2);
                }
                let kind = StringKind::for_delimiter(delim, multiline)
                    .ok_or(LexError::UnsupportedDelimiter(CodePoint(delim)))?;
                let content = self.scan_string(kind)?;
                self.emit_buffer(TokenKind::StringValue, content)?
            }
            Some(c) if chars::is_digit(c) && datetime::starts_datetime(self.cursor.rest()) => {
                self.lex_datetime()?
            }
            Some(c) if chars::is_digit(c) || c == '+' || c == '-' => self.lex_number()?,
            Some(c) if c.is_ascii_alphabetic() => self.lex_bare_word()?,
            Some(c) => {
                self.cursor.advance();
                return Err(LexError::InvalidValue(CodePoint(c)));
            }
        };

        Ok(Transition::Emit(token, State::Text))
    }

    fn lex_datetime(&mut self) -> Result<Token<'a>, LexError> {
        let (_, len) = datetime::scan(self.cursor.rest())?;
        // Date-time literals are pure ASCII, one byte per code point
        self.cursor.bump(len);
        self.emit(TokenKind::TimeValue)
    }

    /// Skips over the pending input before this point
    fn ignore(&mut self) {
        self.start = self.cursor.offset();
        self.start_line = self.cursor.line();
    }

    /// Emits the raw source span of the pending token
    pub(crate) fn emit(&mut self, kind: TokenKind) -> Result<Token<'a>, LexError> {
        let input = self.cursor.input();
        let text = Cow::Borrowed(&input[self.start..self.cursor.offset()]);
        self.emit_text(kind, text)
    }

    /// Emits the accumulation buffer, borrowing `content` instead when the
    /// decoded payload is identical to it
    fn emit_buffer(
        &mut self,
        kind: TokenKind,
        content: Range<usize>,
    ) -> Result<Token<'a>, LexError> {
        let input = self.cursor.input();
        let text = if self.buf.as_str() == &input[content.clone()] {
            self.buf.clear();
            Cow::Borrowed(&input[content])
        } else {
            Cow::Owned(std::mem::take(&mut self.buf))
        };
        self.emit_text(kind, text)
    }

    fn emit_text(&mut self, kind: TokenKind, text: Cow<'a, str>) -> Result<Token<'a>, LexError> {
        if kind != TokenKind::EndOfInput {
            self.token_count += 1;
            if self.token_count > self.config.max_tokens {
                return Err(LexError::LimitExceeded {
                    what: "token count",
                    limit: self.config.max_tokens,
                });
            }
        }

        let token = Token {
            kind,
            text,
            offset: self.start,
            end: self.cursor.offset(),
            line: self.start_line,
        };
        trace!(kind = ?token.kind, offset = token.offset, line = token.line, "token");
        self.ignore();
        Ok(token)
    }

    /// Builds the terminal error token and records the typed error
    fn fail(&mut self, error: LexError) -> Token<'a> {
        let token = Token {
            kind: TokenKind::Error,
            text: Cow::Owned(error.to_string()),
            offset: self.start,
            end: self.cursor.offset(),
            line: self.start_line,
        };
        self.error = Some(error);
        token
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
