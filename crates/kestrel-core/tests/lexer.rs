//! Lexer integration tests
//!
//! Drives the scanner through the public API only: whole-source
//! tokenization, numeric literal forms, string escapes and error positions.

use kestrel_core::lexer::{Keyword, Punctuator, Scanner, TokenKind, locus_to_line_column, tokenize};
use kestrel_core::literal::{LiteralPool, LiteralValue};
use kestrel_core::{ErrorKind, FrontendConfig};

fn units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Tokenizes `source` and returns the value of its only numeric token.
fn number_of(source: &str) -> f64 {
    let source = units(source);
    let (tokens, literals) = tokenize(&source, false).unwrap();
    match tokens[0].kind {
        TokenKind::SmallInt(value) => f64::from(value),
        TokenKind::Number(index) => literals.value(index).unwrap().as_number().unwrap(),
        other => panic!("expected a number, got {other:?}"),
    }
}

fn string_of(source: &str) -> String {
    let source = units(source);
    let (tokens, literals) = tokenize(&source, false).unwrap();
    match tokens[0].kind {
        TokenKind::String(index) => String::from_utf16_lossy(&literals.string_units(index).unwrap()),
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn test_names_share_one_literal() {
    let source = units("a=1;var a;");
    let (tokens, literals) = tokenize(&source, false).unwrap();

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    let TokenKind::Name(a) = kinds[0] else {
        panic!("first token should be a name");
    };
    assert_eq!(kinds[1], TokenKind::Punct(Punctuator::Equal));
    assert_eq!(kinds[2], TokenKind::SmallInt(1));
    assert_eq!(kinds[4], TokenKind::Keyword(Keyword::Var));
    assert_eq!(kinds[5], TokenKind::Name(a));
    assert_eq!(*kinds.last().unwrap(), TokenKind::Eof);

    assert_eq!(literals.count(), 1);
    assert_eq!(literals.to_display_string(a), "a");
}

#[test]
fn test_numeric_literal_forms() {
    assert_eq!(number_of("0x1F"), 31.0);
    assert_eq!(number_of("0XfF"), 255.0);
    assert_eq!(number_of("1.5e2"), 150.0);
    assert_eq!(number_of(".5"), 0.5);
    assert_eq!(number_of("256"), 256.0);
    assert_eq!(number_of("010"), 8.0);
    assert_eq!(number_of("09"), 9.0);
    assert_eq!(number_of("18446744073709551616"), 18446744073709551616.0);
}

#[test]
fn test_small_integers_stay_out_of_the_pool() {
    let source = units("0 7 255");
    let (tokens, literals) = tokenize(&source, false).unwrap();
    assert_eq!(tokens[2].kind, TokenKind::SmallInt(255));
    assert!(literals.is_empty());
}

#[test]
fn test_octal_is_rejected_in_strict_mode() {
    let source = units("x = 010");
    let err = tokenize(&source, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.locus(), Some(4));
    assert!(tokenize(&source, false).is_ok());
}

#[test]
fn test_malformed_numbers() {
    for source in ["1e", "1e+", "3in", "0x", "0xg"] {
        let err = tokenize(&units(source), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{source}");
    }
}

#[test]
fn test_string_escapes() {
    assert_eq!(string_of(r#""a\tb""#), "a\tb");
    assert_eq!(string_of(r"'\x41B'"), "AB");
    assert_eq!(string_of(r#"'it\'s'"#), "it's");
    assert_eq!(string_of(r"'\q'"), "q");
    assert_eq!(string_of("'line\\\ncontinued'"), "linecontinued");
    assert_eq!(string_of(r"'\0'"), "\0");
}

#[test]
fn test_unclosed_string_reports_its_start() {
    let source = units("x = 1;\ny = 'abc");
    let err = tokenize(&source, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);

    let locus = err.locus().unwrap();
    assert_eq!(locus, 11);
    assert_eq!(locus_to_line_column(&source, locus), (1, 4));
}

#[test]
fn test_newline_inside_string_is_an_error() {
    let err = tokenize(&units("'a\nb'"), false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.locus(), Some(0));
}

#[test]
fn test_scanner_shares_a_pool_across_sources() {
    let mut pool = LiteralPool::new();
    let shared = pool.insert(LiteralValue::from("shared"));

    let source = units("shared + other");
    let mut scanner = Scanner::with_literals(&source, pool);
    assert_eq!(scanner.next_token().unwrap().kind, TokenKind::Name(shared));

    let rest: Vec<_> = scanner.by_ref().map(|t| t.unwrap().kind).collect();
    assert_eq!(rest.len(), 3);

    let pool = scanner.into_literals();
    assert_eq!(pool.count(), 2);
}

#[test]
fn test_config_drives_strictness() {
    let source = units("010");
    let config = FrontendConfig {
        strict: true,
        ..FrontendConfig::default()
    };
    let mut scanner = config.scanner(&source);
    assert!(scanner.is_strict());
    assert!(scanner.next_token().is_err());
}
