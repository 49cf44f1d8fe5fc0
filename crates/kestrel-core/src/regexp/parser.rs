//! Pattern tokenizer.
//!
//! [`RegExpParser`] splits a pattern into [`RegExpToken`]s. Atoms that may be
//! repeated carry the [`Quantifier`] that follows them, so the compiler sees
//! `a{2,3}?` as one token.

use crate::error::{Error, Locus, Result};
use crate::literal::EcmaChar;

/// `qmax` of an unbounded quantifier.
pub const INFINITE: u32 = u32::MAX;

/// Inclusive code unit range of a character class.
pub type ClassRange = (EcmaChar, EcmaChar);

const DIGIT_RANGES: &[ClassRange] = &[(0x30, 0x39)];
const NOT_DIGIT_RANGES: &[ClassRange] = &[(0x0000, 0x002F), (0x003A, 0xFFFF)];
const WHITE_RANGES: &[ClassRange] = &[
    (0x0009, 0x000D),
    (0x0020, 0x0020),
    (0x00A0, 0x00A0),
    (0x1680, 0x1680),
    (0x180E, 0x180E),
    (0x2000, 0x200A),
    (0x2028, 0x2029),
    (0x202F, 0x202F),
    (0x205F, 0x205F),
    (0x3000, 0x3000),
    (0xFEFF, 0xFEFF),
];
const NOT_WHITE_RANGES: &[ClassRange] = &[
    (0x0000, 0x0008),
    (0x000E, 0x001F),
    (0x0021, 0x009F),
    (0x00A1, 0x167F),
    (0x1681, 0x180D),
    (0x180F, 0x1FFF),
    (0x200B, 0x2027),
    (0x202A, 0x202E),
    (0x2030, 0x205E),
    (0x2060, 0x2FFF),
    (0x3001, 0xFEFE),
    (0xFF00, 0xFFFF),
];
const WORD_RANGES: &[ClassRange] = &[(0x30, 0x39), (0x41, 0x5A), (0x5F, 0x5F), (0x61, 0x7A)];
const NOT_WORD_RANGES: &[ClassRange] = &[
    (0x0000, 0x002F),
    (0x003A, 0x0040),
    (0x005B, 0x005E),
    (0x0060, 0x0060),
    (0x007B, 0xFFFF),
];

/// Repetition bounds attached to an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    /// Minimum number of repetitions
    pub min: u32,
    /// Maximum number of repetitions, [`INFINITE`] when unbounded
    pub max: u32,
    /// False for the lazy `?` suffix
    pub greedy: bool,
}

impl Quantifier {
    /// Exactly once, the implicit quantifier of a bare atom.
    pub const ONCE: Quantifier = Quantifier {
        min: 1,
        max: 1,
        greedy: true,
    };

    /// Returns true for `{1,1}`, which needs no iterator.
    pub fn is_once(&self) -> bool {
        self.min == 1 && self.max == 1
    }
}

/// A pattern token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegExpToken {
    /// End of the pattern
    Eof,
    /// A literal code unit
    Char(EcmaChar, Quantifier),
    /// `.`
    Period(Quantifier),
    /// `|`
    Alternative,
    /// `^`
    AssertStart,
    /// `$`
    AssertEnd,
    /// `\b`
    WordBoundary,
    /// `\B`
    NotWordBoundary,
    /// `\N` naming an existing capture group
    Backreference(u32, Quantifier),
    /// `[...]`, `[^...]` or a class escape such as `\d`
    CharClass {
        /// Ranges listed in the class
        ranges: Vec<ClassRange>,
        /// True for `[^...]`
        inverted: bool,
        /// Attached quantifier
        quantifier: Quantifier,
    },
    /// `(`
    StartCaptureGroup,
    /// `(?:`
    StartNonCaptureGroup,
    /// `(?=`
    StartPositiveLookahead,
    /// `(?!`
    StartNegativeLookahead,
    /// `)`, carrying the quantifier of the whole group
    EndGroup(Quantifier),
}

/// One element of a character class body.
enum ClassAtom {
    Single(EcmaChar),
    Ranges(&'static [ClassRange]),
}

/// Tokenizer over a pattern held as UTF-16 code units.
#[derive(Debug)]
pub struct RegExpParser<'a> {
    pattern: &'a [EcmaChar],
    pos: usize,
    /// Capture groups in the whole pattern, counted on first use
    group_count: Option<u32>,
}

impl<'a> RegExpParser<'a> {
    /// Creates a tokenizer positioned at the start of `pattern`.
    pub fn new(pattern: &'a [EcmaChar]) -> Self {
        Self {
            pattern,
            pos: 0,
            group_count: None,
        }
    }

    /// Offset of the next unread code unit.
    pub fn locus(&self) -> Locus {
        self.pos
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> Result<RegExpToken> {
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(RegExpToken::Eof);
        };

        let token = match as_ascii(ch) {
            Some(b'|') => RegExpToken::Alternative,
            Some(b'^') => RegExpToken::AssertStart,
            Some(b'$') => RegExpToken::AssertEnd,
            Some(b'.') => RegExpToken::Period(self.parse_quantifier()?),
            Some(b'\\') => self.parse_atom_escape(start)?,
            Some(b'(') => self.parse_group_start(start)?,
            Some(b')') => RegExpToken::EndGroup(self.parse_quantifier()?),
            Some(b'[') => self.parse_char_class(start)?,
            Some(b']' | b'}' | b'?' | b'*' | b'+' | b'{') => {
                return Err(Error::syntax("Nothing to repeat", start));
            }
            _ => RegExpToken::Char(ch, self.parse_quantifier()?),
        };
        Ok(token)
    }

    fn peek(&self) -> Option<EcmaChar> {
        self.pattern.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<EcmaChar> {
        self.pattern.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<EcmaChar> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(u16::from(expected)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parses the optional quantifier after an atom.
    fn parse_quantifier(&mut self) -> Result<Quantifier> {
        let start = self.pos;
        let (min, max) = match self.peek().and_then(as_ascii) {
            Some(b'?') => (0, 1),
            Some(b'*') => (0, INFINITE),
            Some(b'+') => (1, INFINITE),
            Some(b'{') => {
                self.pos += 1;
                let bounds = self.parse_bounds(start)?;
                let greedy = !self.eat(b'?');
                return Ok(Quantifier {
                    min: bounds.0,
                    max: bounds.1,
                    greedy,
                });
            }
            _ => return Ok(Quantifier::ONCE),
        };
        self.pos += 1;

        let greedy = !self.eat(b'?');
        Ok(Quantifier { min, max, greedy })
    }

    /// Parses `m}`, `m,}` or `m,n}` after an opening brace.
    fn parse_bounds(&mut self, start: Locus) -> Result<(u32, u32)> {
        let quantifier_error =
            |reason: &str| Error::syntax(format!("Invalid RegExp quantifier: {reason}"), start);

        let min = self
            .parse_decimal()
            .map_err(|_| quantifier_error("too many digits"))?
            .ok_or_else(|| quantifier_error("missing digits"))?;

        let max = if self.eat(b',') {
            let max = self
                .parse_decimal()
                .map_err(|_| quantifier_error("too many digits"))?
                .unwrap_or(INFINITE);
            if self.peek() == Some(u16::from(b',')) {
                return Err(quantifier_error("double comma"));
            }
            max
        } else {
            min
        };

        if !self.eat(b'}') {
            return Err(quantifier_error("unknown char"));
        }
        if min > max {
            return Err(quantifier_error("qmin > qmax"));
        }
        Ok((min, max))
    }

    /// Reads a run of decimal digits. `Ok(None)` when there are none, `Err`
    /// when the value overflows `u32`.
    fn parse_decimal(&mut self) -> std::result::Result<Option<u32>, ()> {
        let mut value: Option<u32> = None;
        while let Some(digit) = self.peek().and_then(decimal_value) {
            self.pos += 1;
            let next = value
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or(())?;
            value = Some(next);
        }
        Ok(value)
    }

    fn parse_group_start(&mut self, start: Locus) -> Result<RegExpToken> {
        if !self.eat(b'?') {
            return Ok(RegExpToken::StartCaptureGroup);
        }
        match self.bump().and_then(as_ascii) {
            Some(b'=') => Ok(RegExpToken::StartPositiveLookahead),
            Some(b'!') => Ok(RegExpToken::StartNegativeLookahead),
            Some(b':') => Ok(RegExpToken::StartNonCaptureGroup),
            _ => Err(Error::syntax("Invalid group", start)),
        }
    }

    /// Parses the escape after a `\` outside a character class.
    fn parse_atom_escape(&mut self, start: Locus) -> Result<RegExpToken> {
        let Some(ch) = self.bump() else {
            return Err(Error::syntax("\\ at end of pattern", start));
        };

        let value = match as_ascii(ch) {
            Some(b'b') => return Ok(RegExpToken::WordBoundary),
            Some(b'B') => return Ok(RegExpToken::NotWordBoundary),
            Some(b'd') => return self.class_escape(DIGIT_RANGES),
            Some(b'D') => return self.class_escape(NOT_DIGIT_RANGES),
            Some(b's') => return self.class_escape(WHITE_RANGES),
            Some(b'S') => return self.class_escape(NOT_WHITE_RANGES),
            Some(b'w') => return self.class_escape(WORD_RANGES),
            Some(b'W') => return self.class_escape(NOT_WORD_RANGES),
            Some(b'0') => {
                if self.peek().and_then(decimal_value).is_some() {
                    return Err(Error::syntax("Invalid decimal escape", start));
                }
                0
            }
            Some(b'1'..=b'9') => {
                self.pos -= 1;
                return self.parse_decimal_escape(start);
            }
            _ => self.character_escape(ch, start)?,
        };
        Ok(RegExpToken::Char(value, self.parse_quantifier()?))
    }

    fn class_escape(&mut self, ranges: &'static [ClassRange]) -> Result<RegExpToken> {
        Ok(RegExpToken::CharClass {
            ranges: ranges.to_vec(),
            inverted: false,
            quantifier: self.parse_quantifier()?,
        })
    }

    /// `\N`: a back-reference when group N exists, otherwise the digit itself.
    fn parse_decimal_escape(&mut self, start: Locus) -> Result<RegExpToken> {
        let first = self.pos;
        let number = self
            .parse_decimal()
            .map_err(|_| Error::syntax("Decimal escape is too long", start))?
            .unwrap_or(0);

        if number <= self.group_count() {
            return Ok(RegExpToken::Backreference(number, self.parse_quantifier()?));
        }

        self.pos = first + 1;
        let digit = self.pattern[first];
        Ok(RegExpToken::Char(digit, self.parse_quantifier()?))
    }

    /// Decodes the control, hex and identity escapes shared by atoms and
    /// class bodies. `ch` is the code unit after the backslash.
    fn character_escape(&mut self, ch: EcmaChar, start: Locus) -> Result<EcmaChar> {
        let value = match as_ascii(ch) {
            Some(b'f') => 0x0C,
            Some(b'n') => 0x0A,
            Some(b't') => 0x09,
            Some(b'r') => 0x0D,
            Some(b'v') => 0x0B,
            Some(b'c') => match self.peek().and_then(as_ascii) {
                Some(letter) if letter.is_ascii_alphabetic() => {
                    self.pos += 1;
                    u16::from(letter % 32)
                }
                _ => return Err(Error::syntax("Invalid control escape", start)),
            },
            Some(b'x') => self.hex_escape(2).unwrap_or(ch),
            Some(b'u') => self.hex_escape(4).unwrap_or(ch),
            _ => ch,
        };
        Ok(value)
    }

    /// Reads exactly `digits` hex digits. Leaves the position untouched and
    /// returns `None` when they are not all there.
    fn hex_escape(&mut self, digits: usize) -> Option<EcmaChar> {
        let mut value: u32 = 0;
        for offset in 0..digits {
            let digit = self.peek_at(offset).and_then(hex_value)?;
            value = value * 16 + digit;
        }
        self.pos += digits;
        u16::try_from(value).ok()
    }

    fn parse_char_class(&mut self, start: Locus) -> Result<RegExpToken> {
        let inverted = self.eat(b'^');
        let mut ranges = Vec::new();

        loop {
            match self.peek() {
                None => return Err(Error::syntax("Unterminated character class", start)),
                Some(0x5D) => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {}
            }

            let atom_start = self.pos;
            let from = self.parse_class_atom(atom_start)?;

            let is_range = self.peek() == Some(u16::from(b'-'))
                && self.peek_at(1).is_some_and(|next| next != 0x5D);
            if !is_range {
                match from {
                    ClassAtom::Single(ch) => ranges.push((ch, ch)),
                    ClassAtom::Ranges(class) => ranges.extend_from_slice(class),
                }
                continue;
            }

            self.pos += 1;
            let to = self.parse_class_atom(self.pos)?;
            match (from, to) {
                (ClassAtom::Single(lo), ClassAtom::Single(hi)) if lo <= hi => ranges.push((lo, hi)),
                _ => return Err(Error::syntax("Invalid character class range", atom_start)),
            }
        }

        Ok(RegExpToken::CharClass {
            ranges,
            inverted,
            quantifier: self.parse_quantifier()?,
        })
    }

    fn parse_class_atom(&mut self, start: Locus) -> Result<ClassAtom> {
        let ch = self
            .bump()
            .ok_or_else(|| Error::syntax("Unterminated character class", start))?;
        if ch != u16::from(b'\\') {
            return Ok(ClassAtom::Single(ch));
        }

        let Some(escaped) = self.bump() else {
            return Err(Error::syntax("\\ at end of pattern", start));
        };
        let atom = match as_ascii(escaped) {
            Some(b'b') => ClassAtom::Single(0x08),
            Some(b'd') => ClassAtom::Ranges(DIGIT_RANGES),
            Some(b'D') => ClassAtom::Ranges(NOT_DIGIT_RANGES),
            Some(b's') => ClassAtom::Ranges(WHITE_RANGES),
            Some(b'S') => ClassAtom::Ranges(NOT_WHITE_RANGES),
            Some(b'w') => ClassAtom::Ranges(WORD_RANGES),
            Some(b'W') => ClassAtom::Ranges(NOT_WORD_RANGES),
            Some(b'0') => ClassAtom::Single(0),
            _ => ClassAtom::Single(self.character_escape(escaped, start)?),
        };
        Ok(atom)
    }

    /// Number of capture groups in the whole pattern.
    fn group_count(&mut self) -> u32 {
        if let Some(count) = self.group_count {
            return count;
        }

        let mut count = 0u32;
        let mut in_class = false;
        let mut i = 0;
        while i < self.pattern.len() {
            match self.pattern[i] {
                0x5C => i += 1,
                0x5B => in_class = true,
                0x5D => in_class = false,
                0x28 if !in_class && self.pattern.get(i + 1) != Some(&0x3F) => count += 1,
                _ => {}
            }
            i += 1;
        }
        self.group_count = Some(count);
        count
    }
}

fn as_ascii(ch: EcmaChar) -> Option<u8> {
    u8::try_from(ch).ok().filter(u8::is_ascii)
}

fn decimal_value(ch: EcmaChar) -> Option<u32> {
    char::from_u32(u32::from(ch))?.to_digit(10)
}

fn hex_value(ch: EcmaChar) -> Option<u32> {
    char::from_u32(u32::from(ch))?.to_digit(16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn tokens(pattern: &str) -> Result<Vec<RegExpToken>> {
        let units: Vec<u16> = pattern.encode_utf16().collect();
        let mut parser = RegExpParser::new(&units);
        let mut out = Vec::new();
        loop {
            let token = parser.next_token()?;
            if token == RegExpToken::Eof {
                return Ok(out);
            }
            out.push(token);
        }
    }

    fn q(min: u32, max: u32, greedy: bool) -> Quantifier {
        Quantifier { min, max, greedy }
    }

    #[test]
    fn test_quantifiers() {
        let toks = tokens("a?b*c+?d{2}e{2,}f{2,5}?").unwrap();
        let quantifiers: Vec<Quantifier> = toks
            .iter()
            .map(|t| match t {
                RegExpToken::Char(_, q) => *q,
                other => panic!("unexpected token {other:?}"),
            })
            .collect();
        assert_eq!(
            quantifiers,
            vec![
                q(0, 1, true),
                q(0, INFINITE, true),
                q(1, INFINITE, false),
                q(2, 2, true),
                q(2, INFINITE, true),
                q(2, 5, false),
            ]
        );
    }

    #[test]
    fn test_quantifier_errors() {
        for pattern in ["a{}", "a{1,2,3}", "a{1x}", "a{3,1}", "a{99999999999}", "a{1"] {
            let err = tokens(pattern).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax, "{pattern}");
        }
        assert!(tokens("a{3,1}").unwrap_err().to_string().contains("qmin > qmax"));
        assert!(tokens("a{1,2,3}").unwrap_err().to_string().contains("double comma"));
    }

    #[test]
    fn test_nothing_to_repeat() {
        for pattern in ["*a", "a|+", "?"] {
            assert_eq!(tokens(pattern).unwrap_err().kind(), ErrorKind::Syntax);
        }
    }

    #[test]
    fn test_escapes() {
        let toks = tokens(r"\n\x41B\cJ\0\q").unwrap();
        let chars: Vec<u16> = toks
            .iter()
            .map(|t| match t {
                RegExpToken::Char(c, _) => *c,
                other => panic!("unexpected token {other:?}"),
            })
            .collect();
        assert_eq!(chars, vec![0x0A, 0x41, 0x42, 0x0A, 0, u16::from(b'q')]);

        assert_eq!(tokens(r"\00").unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(tokens(r"\c1").unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(tokens("\\").unwrap_err().kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_assertions_and_groups() {
        let toks = tokens(r"^(?:a)(?=b)(?!c)\b\B$").unwrap();
        assert_eq!(toks[0], RegExpToken::AssertStart);
        assert_eq!(toks[1], RegExpToken::StartNonCaptureGroup);
        assert_eq!(toks[3], RegExpToken::EndGroup(Quantifier::ONCE));
        assert_eq!(toks[4], RegExpToken::StartPositiveLookahead);
        assert_eq!(toks[7], RegExpToken::StartNegativeLookahead);
        assert_eq!(toks[10], RegExpToken::WordBoundary);
        assert_eq!(toks[11], RegExpToken::NotWordBoundary);
        assert_eq!(toks[12], RegExpToken::AssertEnd);
        assert_eq!(tokens("(?<a)").unwrap_err().kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_backreference_needs_existing_group() {
        let toks = tokens(r"(a)\1").unwrap();
        assert_eq!(toks[3], RegExpToken::Backreference(1, Quantifier::ONCE));

        let toks = tokens(r"\1").unwrap();
        assert_eq!(toks[0], RegExpToken::Char(u16::from(b'1'), Quantifier::ONCE));

        // Groups inside classes and escaped parens do not count.
        let toks = tokens(r"[(]\(\1").unwrap();
        assert!(matches!(toks[2], RegExpToken::Char(0x31, _)));
    }

    #[test]
    fn test_char_classes() {
        let toks = tokens(r"[a-c\d-]+[^x]").unwrap();
        assert_eq!(
            toks[0],
            RegExpToken::CharClass {
                ranges: vec![(0x61, 0x63), (0x30, 0x39), (0x2D, 0x2D)],
                inverted: false,
                quantifier: q(1, INFINITE, true),
            }
        );
        assert!(matches!(&toks[1], RegExpToken::CharClass { inverted: true, .. }));

        assert_eq!(tokens("[z-a]").unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(tokens(r"[\d-z]").unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(tokens("[ab").unwrap_err().kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_class_escape_ranges() {
        let toks = tokens(r"\w\S").unwrap();
        match &toks[0] {
            RegExpToken::CharClass { ranges, .. } => assert_eq!(ranges.as_slice(), WORD_RANGES),
            other => panic!("unexpected token {other:?}"),
        }
        match &toks[1] {
            RegExpToken::CharClass { ranges, .. } => assert_eq!(ranges.len(), 12),
            other => panic!("unexpected token {other:?}"),
        }
    }
}
