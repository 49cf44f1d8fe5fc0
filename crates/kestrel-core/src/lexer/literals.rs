//! Literal scanning documentation.
//!
//! This module documents the literal scanning logic in `scanner.rs`.
//! The lexer handles numeric, string, and identifier literals.
//!
//! ## Numeric Literals
//!
//! ### Decimal Numbers
//!
//! ```text
//! 42        -> SmallInt(42)
//! 1000      -> Number(#i), value interned
//! 3.14      -> Number(#i)
//! .5        -> Number(#i) (no leading zero)
//! 1e10      -> Exponential
//! 1.5e-3    -> Exponential with negative
//! ```
//!
//! Method: `scan_number`
//!
//! Integers are accumulated in a checked 64-bit integer and only promoted to
//! a double when that would overflow. Values in `0..=255` stay inline in the
//! token as [`TokenKind::SmallInt`](super::TokenKind::SmallInt).
//!
//! ### Integer Bases
//!
//! | Prefix | Base | Example | Method |
//! |--------|------|---------|--------|
//! | `0x` | 16 | `0xFF` | `scan_hex_number` |
//! | `0` | 8 | `017` | `scan_number` (non-strict only) |
//!
//! A legacy literal with a digit above 7 (`08`, `019`) is read as decimal.
//!
//! ## String Literals
//!
//! Method: `scan_string`
//!
//! | Escape | Meaning |
//! |--------|---------|
//! | `\b` `\t` `\n` `\v` `\f` `\r` | Control characters |
//! | `\\` `\'` `\"` | The character itself |
//! | `\0` | Null, when no digit follows |
//! | `\xNN` | Hex escape |
//! | `\uNNNN` | Unicode escape |
//! | `\` + line terminator | Line continuation, produces nothing |
//!
//! Errors in a string report the locus of the opening quote.
//!
//! ## Identifiers and Keywords
//!
//! Method: `scan_name`
//!
//! - Start: `A-Z`, `a-z`, `_`, `$`, Unicode `XID_Start`
//! - Continue: Start chars + `0-9`, Unicode `XID_Continue`
//! - `\uNNNN` escapes may spell any of these
//!
//! Future reserved words such as `let` and `yield` are keywords in strict
//! mode code only; elsewhere they scan as names.

// This module serves as documentation. The actual implementation is in scanner.rs.

#[cfg(test)]
mod tests {
    use crate::lexer::{Scanner, TokenKind};
    use crate::literal::LiteralValue;

    fn scan_number(src: &str) -> f64 {
        let source: Vec<u16> = src.encode_utf16().collect();
        let mut scanner = Scanner::new(&source);
        match scanner.next_token().unwrap().kind {
            TokenKind::SmallInt(n) => f64::from(n),
            TokenKind::Number(index) => scanner.literals().value(index).unwrap().as_number().unwrap(),
            other => panic!("expected a number, got {other:?}"),
        }
    }

    fn scan_string(src: &str) -> String {
        let source: Vec<u16> = src.encode_utf16().collect();
        let mut scanner = Scanner::new(&source);
        match scanner.next_token().unwrap().kind {
            TokenKind::String(index) => scanner.literals().to_display_string(index),
            other => panic!("expected a string, got {other:?}"),
        }
    }

    fn scan_error(src: &str, strict: bool) -> String {
        let source: Vec<u16> = src.encode_utf16().collect();
        let mut scanner = Scanner::new(&source);
        scanner.set_strict(strict);
        scanner.next_token().unwrap_err().to_string()
    }

    // Number tests
    #[test]
    fn test_small_integer_is_inline() {
        let source: Vec<u16> = "255 256".encode_utf16().collect();
        let mut scanner = Scanner::new(&source);
        assert_eq!(scanner.next_token().unwrap().kind, TokenKind::SmallInt(255));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Number(_)));
        assert_eq!(scanner.literals().count(), 1);
    }

    #[test]
    fn test_float() {
        assert!((scan_number("3.14") - 3.14).abs() < 1e-12);
        assert_eq!(scan_number(".5"), 0.5);
        assert_eq!(scan_number("1."), 1.0);
    }

    #[test]
    fn test_exponential() {
        assert_eq!(scan_number("1e10"), 1e10);
        assert_eq!(scan_number("1.5e-3"), 0.0015);
        assert_eq!(scan_number("2E+2"), 200.0);
    }

    #[test]
    fn test_hex_number() {
        assert_eq!(scan_number("0xFF"), 255.0);
        assert_eq!(scan_number("0x1000"), 4096.0);
    }

    #[test]
    fn test_large_integers_promote_to_double() {
        assert_eq!(scan_number("18446744073709551616"), 18446744073709551616.0);
        assert_eq!(scan_number("0xFFFFFFFFFFFFFFFFFF"), 4722366482869645213695.0);
    }

    #[test]
    fn test_legacy_octal() {
        assert_eq!(scan_number("017"), 15.0);
        assert_eq!(scan_number("019"), 19.0);
        assert!(scan_error("017", true).contains("Octal integer literals"));
    }

    #[test]
    fn test_number_errors() {
        assert!(scan_error("0x", false).contains("no digits"));
        assert!(scan_error("0x1g", false).contains("non-digit"));
        assert!(scan_error("3in", false).contains("non-digit"));
        assert!(scan_error("1e+", false).contains("exponential marker"));
    }

    #[test]
    fn test_double_dot_splits() {
        let source: Vec<u16> = "1..toString".encode_utf16().collect();
        let kinds: Vec<TokenKind> = Scanner::new(&source).map(|t| t.unwrap().kind).collect();
        assert_eq!(kinds.len(), 4);
        assert!(matches!(kinds[0], TokenKind::Number(_)));
        assert!(matches!(kinds[2], TokenKind::Name(_)));
    }

    // String tests
    #[test]
    fn test_string_quotes() {
        assert_eq!(scan_string("'single'"), "single");
        assert_eq!(scan_string("\"double\""), "double");
        assert_eq!(scan_string("'it\\'s'"), "it's");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(scan_string(r#""a\tb\nc""#), "a\tb\nc");
        assert_eq!(scan_string(r#""\x41B""#), "AB");
        assert_eq!(scan_string(r#""\0""#), "\0");
        assert_eq!(scan_string(r#""\q""#), "q");
        assert_eq!(scan_string("\"a\\\r\nb\""), "ab");
    }

    #[test]
    fn test_empty_string_is_magic() {
        let source: Vec<u16> = "''".encode_utf16().collect();
        let mut scanner = Scanner::new(&source);
        let TokenKind::String(index) = scanner.next_token().unwrap().kind else {
            panic!("expected a string");
        };
        assert_eq!(scanner.literals().value(index).unwrap(), LiteralValue::from(""));
        assert!(scanner.literals().cache().is_empty());
    }

    #[test]
    fn test_string_errors() {
        assert!(scan_error("'open", false).contains("Unclosed string"));
        assert!(scan_error("'a\nb'", false).contains("newline"));
        assert!(scan_error(r#""\x4""#, false).contains("Malformed escape sequence"));
        assert!(scan_error(r#""\01""#, false).contains("Malformed escape sequence"));
    }

    #[test]
    fn test_string_error_points_at_quote() {
        let source: Vec<u16> = "x = \"abc".encode_utf16().collect();
        let mut scanner = Scanner::new(&source);
        scanner.next_token().unwrap();
        scanner.next_token().unwrap();
        assert_eq!(scanner.next_token().unwrap_err().locus(), Some(4));
    }
}
