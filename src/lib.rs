//! # TOML Rust Lexer
//!
//! A pull-based lexer for the key/value subset of TOML, producing positioned,
//! classified tokens for a downstream parser.
//!
//! ## Overview
//!
//! The lexer reads a fully buffered document and hands out one [`Token`] per
//! request. Tokens carry their kind, their text (borrowed from the input
//! whenever possible), a byte offset and the line they start on. The stream
//! always ends with exactly one terminal token: [`TokenKind::EndOfInput`] on
//! success or [`TokenKind::Error`] with a diagnostic message.
//!
//! ## Key Features
//!
//! - **Pull-Based**: tokens are produced lazily, one per call, through
//!   [`Lexer::next_token`] or the [`Iterator`] impl
//! - **All String Forms**: basic, literal, multi-line basic and multi-line
//!   literal strings, with escape decoding and line continuations
//! - **Numbers and Booleans**: decimal, hexadecimal, octal and binary
//!   integers, floats with exponents, `inf`/`nan`, `true`/`false`
//! - **Date-Times**: offset and local date-times, local dates and local times
//! - **Zero-Copy Tokens**: token text borrows from the input unless decoding
//!   changed it
//! - **CRLF Aware**: CRLF counts as one newline; multi-line string payloads keep
//!   their line endings verbatim
//!
//! ## Basic Usage
//!
//! ```rust
//! use toml_lexer::{lex, TokenKind};
//!
//! let input = r#"
//! ## server settings
//! host = "localhost"
//! port = 8080
//! "#;
//!
//! let kinds: Vec<TokenKind> = lex("server.toml", input).map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         TokenKind::Key,
//!         TokenKind::Equals,
//!         TokenKind::StringValue,
//!         TokenKind::Key,
//!         TokenKind::Equals,
//!         TokenKind::IntegerValue,
//!         TokenKind::EndOfInput,
//!     ]
//! );
//! ```
//!
//! ## Collecting Tokens
//!
//! [`tokenize`] drains the lexer and turns a terminal error into a
//! [`ScanError`] with a resolved line and column:
//!
//! ```rust
//! use toml_lexer::tokenize;
//!
//! let tokens = tokenize("app.toml", "name = 'demo'\nretries = 3")?;
//! assert_eq!(tokens[2].text, "demo");
//! assert_eq!(tokens[5].text, "3");
//!
//! let error = tokenize("app.toml", "name = 'demo'\nretries =").unwrap_err();
//! assert_eq!(error.to_string(), "app.toml:2:10: invalid unspecified value");
//! # Ok::<(), toml_lexer::ScanError>(())
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use toml_lexer::{Lexer, LexerConfig};
//!
//! let config = LexerConfig {
//!     save_comments: true,
//!     ..LexerConfig::default()
//! };
//!
//! let mut lexer = Lexer::with_config("notes.toml", "# hello\nkey = true", config);
//! while lexer.next_token().is_some() {}
//! assert_eq!(lexer.comments()[0].text, " hello");
//! ```
//!
//! ## Feature Flags
//!
//! - `save-comments`: Keep comments by default (see [`LexerConfig::save_comments`])

pub mod chars;
pub mod cursor;
pub mod datetime;
pub mod error;
pub mod lexer;
pub mod numbers;
pub mod strings;


// Re-export main types
pub use datetime::{Date, Datetime, DatetimeKind, Offset, Time};
pub use error::{CodePoint, LexError, Position, Radix, ScanError};
pub use lexer::{Comment, Lexer, LexerConfig, Token, TokenKind};
pub use strings::StringKind;

/// Creates a lexer over `input`.
///
/// `name` is advisory and only used in diagnostics. No scanning happens
/// until the first token is requested.
pub fn lex<'a>(name: &'a str, input: &'a str) -> Lexer<'a> {
    Lexer::new(name, input)
}

/// Scans `input` to completion.
///
/// On success the returned tokens end with [`TokenKind::EndOfInput`]. A
/// terminal error becomes a [`ScanError`] carrying the same message the
/// error token would have.
pub fn tokenize<'a>(name: &'a str, input: &'a str) -> Result<Vec<Token<'a>>, ScanError> {
    Lexer::new(name, input).collect_tokens()
}

/// Same as [`tokenize`] with a custom configuration
pub fn tokenize_with_config<'a>(
    name: &'a str,
    input: &'a str,
    config: LexerConfig,
) -> Result<Vec<Token<'a>>, ScanError> {
    Lexer::with_config(name, input, config).collect_tokens()
}
