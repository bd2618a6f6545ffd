//! Property-based tests for the lexer.
//!
//! These tests use proptest to generate documents and verify:
//! 1. Blank documents (whitespace and comments only) yield just `EndOfInput`
//! 2. Token spans are ordered and non-overlapping
//! 3. Re-scanning the same buffer yields identical tokens
//! 4. Every stream ends with exactly one terminal token, whatever the input

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use toml_lexer::{Lexer, Token, TokenKind, lex};

// -- Document Generation Strategies --

/// A single blank line: spaces, tabs and an optional comment
fn blank_line_strategy() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex("[ \t]{0,6}").expect("valid regex"),
        prop::option::of(prop::string::string_regex("#[ -~\t]{0,30}").expect("valid regex")),
        prop::bool::ANY,
    )
        .prop_map(|(indent, comment, crlf)| {
            let newline = if crlf { "\r\n" } else { "\n" };
            format!("{indent}{}{newline}", comment.unwrap_or_default())
        })
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[A-Za-z_][A-Za-z0-9_-]{0,12}").expect("valid regex"),
        prop::string::string_regex("\"[a-z .]{1,10}\"").expect("valid regex"),
        prop::string::string_regex("'[a-z .]{1,10}'").expect("valid regex"),
    ]
}

fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("\"[a-zA-Z0-9 ]{0,20}\"").expect("valid regex"),
        prop::string::string_regex("'[a-zA-Z0-9 \\\\]{0,20}'").expect("valid regex"),
        any::<i64>().prop_map(|n| n.to_string()),
        (0u32..10_000, 0u32..1000).prop_map(|(a, b)| format!("{a}.{b}")),
        prop::sample::select(vec!["true", "false", "inf", "-nan", "0xFF", "0o17", "0b1"])
            .prop_map(str::to_string),
        prop::sample::select(vec![
            "1979-05-27T07:32:00Z",
            "1979-05-27",
            "07:32:00",
            "2024-02-29 23:59:60.5+01:00",
        ])
        .prop_map(str::to_string),
    ]
}

/// A valid document of key/value lines interleaved with blank lines
fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            (key_strategy(), value_strategy()).prop_map(|(k, v)| format!("{k} = {v}\n")),
            blank_line_strategy(),
        ],
        0..30,
    )
    .prop_map(|lines| lines.concat())
}

fn collect(input: &str) -> Vec<Token<'_>> {
    lex("prop.toml", input).collect()
}

proptest! {
    #[test]
    fn blank_documents_only_end(lines in prop::collection::vec(blank_line_strategy(), 0..20)) {
        let input = lines.concat();
        let kinds: Vec<TokenKind> = collect(&input).iter().map(|t| t.kind).collect();
        prop_assert_eq!(kinds, vec![TokenKind::EndOfInput]);
    }

    #[test]
    fn valid_documents_end_cleanly(input in document_strategy()) {
        let tokens = collect(&input);
        let last = tokens.last().expect("a terminal token");
        prop_assert_eq!(last.kind, TokenKind::EndOfInput, "error: {}", last.text);
    }

    #[test]
    fn spans_are_ordered(input in document_strategy()) {
        let tokens = collect(&input);
        for window in tokens.windows(2) {
            prop_assert!(window[0].offset <= window[0].end);
            prop_assert!(window[1].offset >= window[0].end);
            prop_assert!(window[1].line >= window[0].line);
        }
        for token in &tokens {
            prop_assert!(token.end <= input.len());
        }
    }

    #[test]
    fn rescanning_is_identical(input in document_strategy()) {
        prop_assert_eq!(collect(&input), collect(&input));
    }

    #[test]
    fn arbitrary_input_terminates_once(input in any::<String>()) {
        let mut lexer = Lexer::new("prop.toml", &input);
        let tokens: Vec<Token<'_>> = lexer.by_ref().collect();

        let terminals = tokens.iter().filter(|t| t.kind.is_terminal()).count();
        prop_assert_eq!(terminals, 1);
        prop_assert!(tokens.last().is_some_and(|t| t.kind.is_terminal()));
        prop_assert!(lexer.next().is_none());
        prop_assert_eq!(
            lexer.error().is_some(),
            tokens.last().is_some_and(|t| t.kind == TokenKind::Error)
        );
    }

    #[test]
    fn lines_match_newline_count(input in document_strategy()) {
        for token in collect(&input) {
            let newlines = input[..token.offset].matches('\n').count();
            prop_assert_eq!(token.line, newlines + 1);
        }
    }
}
