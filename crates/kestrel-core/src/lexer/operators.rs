//! Operator scanning documentation.
//!
//! This module documents the operator scanning logic in `scanner.rs`.
//! The lexer handles multi-character operators by looking ahead and always
//! takes the longest match.
//!
//! ## Operator Categories
//!
//! ### Arithmetic Operators
//!
//! | Token | Method | Variants |
//! |-------|--------|----------|
//! | `+` | `scan_doubled_variant` | `+`, `++`, `+=` |
//! | `-` | `scan_doubled_variant` | `-`, `--`, `-=` |
//! | `*` | `scan_assign_variant` | `*`, `*=` |
//! | `/` | `scan_assign_variant` | `/`, `/=` |
//! | `%` | `scan_assign_variant` | `%`, `%=` |
//!
//! ### Comparison Operators
//!
//! | Token | Method | Variants |
//! |-------|--------|----------|
//! | `<` | `scan_less_than` | `<`, `<=`, `<<`, `<<=` |
//! | `>` | `scan_greater_than` | `>`, `>=`, `>>`, `>>>`, `>>=`, `>>>=` |
//! | `=` | `scan_equal` | `=`, `==`, `===` |
//! | `!` | `scan_bang` | `!`, `!=`, `!==` |
//!
//! ### Bitwise Operators
//!
//! | Token | Method | Variants |
//! |-------|--------|----------|
//! | `&` | `scan_doubled_variant` | `&`, `&&`, `&=` |
//! | `\|` | `scan_doubled_variant` | `\|`, `\|\|`, `\|=` |
//! | `^` | `scan_assign_variant` | `^`, `^=` |
//!
//! ## Comment Handling
//!
//! The `/` character can start:
//! - Division: `a / b`
//! - Division assignment: `a /= b`
//! - Single-line comment: `// comment`
//! - Multi-line comment: `/* comment */`
//!
//! Comments are skipped in `scan_token`. A block comment that spans a line
//! feed is reported as a single [`TokenKind::Newline`](super::TokenKind::Newline)
//! so automatic semicolon insertion still sees the break.

// This module serves as documentation. The actual implementation is in scanner.rs.

#[cfg(test)]
mod tests {
    use crate::lexer::{Punctuator, Scanner, TokenKind};

    fn scan_all(src: &str) -> Vec<Punctuator> {
        let source: Vec<u16> = src.encode_utf16().collect();
        Scanner::new(&source)
            .map(|token| token.unwrap().kind)
            .filter_map(|kind| match kind {
                TokenKind::Punct(punct) => Some(punct),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_plus_minus_operators() {
        use Punctuator::*;
        assert_eq!(scan_all("+ ++ +="), [Plus, PlusPlus, PlusEqual]);
        assert_eq!(scan_all("- -- -="), [Minus, MinusMinus, MinusEqual]);
    }

    #[test]
    fn test_multiplicative_operators() {
        use Punctuator::*;
        assert_eq!(scan_all("* *= / /= % %="), [Star, StarEqual, Slash, SlashEqual, Percent, PercentEqual]);
    }

    #[test]
    fn test_less_than_operators() {
        use Punctuator::*;
        assert_eq!(scan_all("< <= << <<="), [LessThan, LessThanEqual, LeftShift, LeftShiftEqual]);
    }

    #[test]
    fn test_greater_than_operators() {
        use Punctuator::*;
        assert_eq!(
            scan_all("> >= >> >>= >>> >>>="),
            [
                GreaterThan,
                GreaterThanEqual,
                RightShift,
                RightShiftEqual,
                UnsignedRightShift,
                UnsignedRightShiftEqual
            ]
        );
    }

    #[test]
    fn test_equality_operators() {
        use Punctuator::*;
        assert_eq!(
            scan_all("= == === ! != !=="),
            [Equal, EqualEqual, EqualEqualEqual, Bang, BangEqual, BangEqualEqual]
        );
    }

    #[test]
    fn test_bitwise_and_logical_operators() {
        use Punctuator::*;
        assert_eq!(
            scan_all("& && &= | || |= ^ ^= ~"),
            [
                Ampersand,
                AmpersandAmpersand,
                AmpersandEqual,
                Pipe,
                PipePipe,
                PipeEqual,
                Caret,
                CaretEqual,
                Tilde
            ]
        );
    }

    #[test]
    fn test_longest_match_without_spaces() {
        use Punctuator::*;
        assert_eq!(scan_all("a>>>=b"), [UnsignedRightShiftEqual]);
        assert_eq!(scan_all("a+++b"), [PlusPlus, Plus]);
    }

    #[test]
    fn test_punctuation() {
        use Punctuator::*;
        assert_eq!(
            scan_all("{}()[].;,:?"),
            [
                LeftBrace,
                RightBrace,
                LeftParen,
                RightParen,
                LeftBracket,
                RightBracket,
                Dot,
                Semicolon,
                Comma,
                Colon,
                Question
            ]
        );
    }
}
