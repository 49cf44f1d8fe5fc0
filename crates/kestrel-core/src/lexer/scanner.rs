//! The scanner that produces tokens from source text.

use tracing::debug;
use unicode_xid::UnicodeXID;

use super::{Keyword, Punctuator, Span, Token, TokenKind};
use crate::error::{Error, Locus, Result};
use crate::literal::{EcmaChar, LiteralPool, LiteralValue};

const LF: u16 = 0x0A;
const CR: u16 = 0x0D;
const LS: u16 = 0x2028;
const PS: u16 = 0x2029;

/// A scanner that tokenizes source code held as UTF-16 code units.
///
/// The scanner owns the [`LiteralPool`] of its compilation unit: every name,
/// string and non-inline number it meets is interned there, and tokens carry
/// the resulting index.
pub struct Scanner<'a> {
    source: &'a [EcmaChar],
    pos: usize,
    strict: bool,
    literals: LiteralPool,
    saved: Option<Token>,
    prev: Option<Token>,
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a [EcmaChar]) -> Self {
        Self::with_literals(source, LiteralPool::new())
    }

    /// Creates a scanner that interns into an existing pool.
    pub fn with_literals(source: &'a [EcmaChar], literals: LiteralPool) -> Self {
        Self {
            source,
            pos: 0,
            strict: false,
            literals,
            saved: None,
            prev: None,
            finished: false,
        }
    }

    /// Switches strict mode code handling on or off.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Returns true when scanning strict mode code.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns the next token from the source.
    ///
    /// A token handed back with [`save_token`](Self::save_token) is returned
    /// first.
    pub fn next_token(&mut self) -> Result<Token> {
        let token = match self.saved.take() {
            Some(token) => token,
            None => self.scan_token().inspect_err(|err| {
                debug!(%err, "tokenization failed");
            })?,
        };
        self.prev = Some(token);
        Ok(token)
    }

    /// Pushes one token back so the next call returns it again.
    pub fn save_token(&mut self, token: Token) -> Result<()> {
        if self.saved.is_some() {
            return Err(Error::internal("only one token of pushback is supported"));
        }
        self.saved = Some(token);
        Ok(())
    }

    /// The token most recently returned by [`next_token`](Self::next_token).
    pub fn prev_token(&self) -> Option<&Token> {
        self.prev.as_ref()
    }

    /// Moves the cursor to `locus` and forgets any saved token.
    pub fn seek(&mut self, locus: Locus) {
        self.pos = locus.min(self.source.len());
        self.saved = None;
        self.finished = false;
    }

    /// Current cursor position.
    pub fn locus(&self) -> Locus {
        self.pos
    }

    /// Converts a source offset to a zero-based `(line, column)` pair.
    pub fn locus_to_line_column(&self, locus: Locus) -> (usize, usize) {
        locus_to_line_column(self.source, locus)
    }

    /// The literals interned so far.
    pub fn literals(&self) -> &LiteralPool {
        &self.literals
    }

    /// Mutable access to the pool, for literals the parser adds itself.
    pub fn literals_mut(&mut self) -> &mut LiteralPool {
        &mut self.literals
    }

    /// Finishes scanning and hands the pool over.
    pub fn into_literals(self) -> LiteralPool {
        self.literals
    }

    fn scan_token(&mut self) -> Result<Token> {
        loop {
            let start = self.pos;

            let Some(ch) = self.peek() else {
                return Ok(Token::new(TokenKind::Eof, Span::new(start, start)));
            };

            let kind = match ch {
                _ if is_id_start(ch) || ch == u16::from(b'\\') => self.scan_name()?,
                _ if is_digit(ch) => self.scan_number()?,
                0x2E if self.peek_at(1).is_some_and(is_digit) => self.scan_number()?,
                LF => {
                    self.advance();
                    TokenKind::Newline
                }
                0x22 | 0x27 => self.scan_string(ch)?,
                _ if is_whitespace(ch) => {
                    self.skip_whitespace();
                    continue;
                }
                0x2F if self.peek_at(1) == Some(u16::from(b'*')) => {
                    if self.skip_block_comment()? {
                        TokenKind::Newline
                    } else {
                        continue;
                    }
                }
                0x2F if self.peek_at(1) == Some(u16::from(b'/')) => {
                    self.skip_line_comment();
                    continue;
                }
                _ => TokenKind::Punct(self.scan_punctuator()?),
            };

            return Ok(Token::new(kind, Span::new(start, self.pos)));
        }
    }

    fn advance(&mut self) -> Option<EcmaChar> {
        let ch = self.source.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek(&self) -> Option<EcmaChar> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<EcmaChar> {
        self.source.get(self.pos + offset).copied()
    }

    fn peek_is(&self, offset: usize, ascii: u8) -> bool {
        self.peek_at(offset) == Some(u16::from(ascii))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.advance();
        }
    }

    fn skip_line_comment(&mut self) {
        self.advance(); // consume first '/'
        self.advance(); // consume second '/'
        while let Some(ch) = self.peek() {
            if ch == LF {
                break;
            }
            self.advance();
        }
    }

    /// Skips a block comment, returning true if it contained a line feed.
    fn skip_block_comment(&mut self) -> Result<bool> {
        let start = self.pos;
        self.advance(); // consume '/'
        self.advance(); // consume '*'

        let mut saw_newline = false;
        loop {
            match self.advance() {
                None => return Err(Error::syntax("Unclosed multiline comment", start)),
                Some(0x2A) if self.peek_is(0, b'/') => {
                    self.advance();
                    return Ok(saw_newline);
                }
                Some(LF) => saw_newline = true,
                Some(_) => {}
            }
        }
    }

    fn scan_name(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        let mut name: Vec<EcmaChar> = Vec::new();

        loop {
            match self.peek() {
                Some(0x5C) => {
                    let escape_start = self.pos;
                    self.advance();
                    if !self.peek_is(0, b'u') {
                        return Err(Error::syntax("Malformed escape sequence", escape_start));
                    }
                    self.advance();
                    let decoded = self
                        .scan_hex_digits(4)
                        .ok_or_else(|| Error::syntax("Malformed escape sequence", escape_start))?;

                    let allowed = if name.is_empty() {
                        is_id_start(decoded)
                    } else {
                        is_id_continue(decoded)
                    };
                    if !allowed {
                        return Err(Error::syntax("Malformed identifier name", start));
                    }
                    name.push(decoded);
                }
                Some(ch) if is_id_continue(ch) => {
                    self.advance();
                    name.push(ch);
                }
                _ => break,
            }
        }

        if let Some(keyword) = Keyword::from_units(&name) {
            if self.strict || !keyword.is_strict_only() {
                return Ok(TokenKind::Keyword(keyword));
            }
        }

        let kind = match name.as_slice() {
            [0x74, 0x72, 0x75, 0x65] => TokenKind::Boolean(true),
            [0x66, 0x61, 0x6C, 0x73, 0x65] => TokenKind::Boolean(false),
            [0x6E, 0x75, 0x6C, 0x6C] => TokenKind::Null,
            _ => TokenKind::Name(self.literals.insert(LiteralValue::string(&name))),
        };
        Ok(kind)
    }

    fn scan_number(&mut self) -> Result<TokenKind> {
        let start = self.pos;

        if self.peek_is(0, b'0') && (self.peek_is(1, b'x') || self.peek_is(1, b'X')) {
            return self.scan_hex_number(start);
        }

        let mut is_float = false;

        // Integer part; empty when the literal starts with '.'
        self.skip_digits();

        if self.peek_is(0, b'.') {
            is_float = true;
            self.advance();
            self.skip_digits();
        }

        if self.peek_is(0, b'e') || self.peek_is(0, b'E') {
            is_float = true;
            self.advance();
            if self.peek_is(0, b'+') || self.peek_is(0, b'-') {
                self.advance();
            }
            if !self.peek().is_some_and(is_digit) {
                return Err(Error::syntax(
                    "Number literal shall contain a digit after exponential marker ('e' or 'E')",
                    self.pos,
                ));
            }
            self.skip_digits();
        }

        if self.peek().is_some_and(|ch| is_id_start(ch) || ch == 0x5C) {
            return Err(Error::syntax(
                "Number literal shall not contain non-digit characters",
                self.pos,
            ));
        }

        let text = &self.source[start..self.pos];

        if is_float {
            let ascii: String = text.iter().map(|&u| char::from(u as u8)).collect();
            let value = ascii
                .parse::<f64>()
                .map_err(|_| Error::syntax("Malformed number literal", start))?;
            return Ok(self.number_token(value));
        }

        let radix = if text.len() > 1 && text[0] == u16::from(b'0') {
            if self.strict {
                return Err(Error::syntax(
                    "Octal integer literals are not allowed in strict mode",
                    start,
                ));
            }
            // Legacy literals such as `08` fall back to decimal.
            if text.iter().all(|&u| is_octal_digit(u)) { 8 } else { 10 }
        } else {
            10
        };

        Ok(self.integer_token(text, radix))
    }

    fn scan_hex_number(&mut self, start: Locus) -> Result<TokenKind> {
        // Eat up '0x'
        self.advance();
        self.advance();

        let digits_start = self.pos;
        while self.peek().is_some_and(is_hex_digit) {
            self.advance();
        }

        if self.peek().is_some_and(|ch| is_id_start(ch) || ch == 0x5C) {
            return Err(Error::syntax(
                "Number literal shall not contain non-digit characters",
                self.pos,
            ));
        }
        if self.pos == digits_start {
            return Err(Error::syntax("Hexadecimal literal has no digits", start));
        }

        let digits = &self.source[digits_start..self.pos];
        Ok(self.integer_token(digits, 16))
    }

    /// Accumulates `digits` in `radix`, promoting to a double only when the
    /// integer accumulator would overflow.
    fn integer_token(&mut self, digits: &[EcmaChar], radix: u32) -> TokenKind {
        let mut exact: Option<u64> = Some(0);
        let mut approx = 0f64;

        for &unit in digits {
            let digit = hex_value(unit).unwrap_or(0);
            exact = exact
                .and_then(|acc| acc.checked_mul(u64::from(radix)))
                .and_then(|acc| acc.checked_add(u64::from(digit)));
            approx = approx * f64::from(radix) + f64::from(digit);
        }

        match exact {
            Some(value) if value <= u64::from(u8::MAX) => TokenKind::SmallInt(value as u8),
            Some(value) => self.number_token(value as f64),
            None if radix == 10 => {
                // Let the float parser round long decimal literals correctly.
                let ascii: String = digits.iter().map(|&u| char::from(u as u8)).collect();
                let value = ascii.parse::<f64>().unwrap_or(approx);
                self.number_token(value)
            }
            None => self.number_token(approx),
        }
    }

    fn number_token(&mut self, value: f64) -> TokenKind {
        TokenKind::Number(self.literals.insert(LiteralValue::Number(value)))
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(is_digit) {
            self.advance();
        }
    }

    /// Reads exactly `count` hex digits, leaving the cursor unchanged on failure.
    fn scan_hex_digits(&mut self, count: usize) -> Option<EcmaChar> {
        let mut value: u16 = 0;
        for offset in 0..count {
            let digit = self.peek_at(offset).and_then(hex_value)?;
            value = (value << 4) | digit as u16;
        }
        self.pos += count;
        Some(value)
    }

    fn scan_string(&mut self, quote: EcmaChar) -> Result<TokenKind> {
        let start = self.pos;
        self.advance(); // opening quote

        let mut text: Vec<EcmaChar> = Vec::new();

        loop {
            let Some(ch) = self.advance() else {
                return Err(Error::syntax("Unclosed string", start));
            };

            match ch {
                _ if ch == quote => break,
                LF | CR | LS | PS => {
                    return Err(Error::syntax(
                        "String literal shall not contain newline character",
                        start,
                    ));
                }
                0x5C => {
                    if let Some(decoded) = self.scan_escape(start)? {
                        text.push(decoded);
                    }
                }
                _ => text.push(ch),
            }
        }

        Ok(TokenKind::String(self.literals.insert(LiteralValue::string(&text))))
    }

    /// Decodes the escape after a backslash; `None` for a line continuation.
    fn scan_escape(&mut self, string_start: Locus) -> Result<Option<EcmaChar>> {
        let escape_start = self.pos - 1;
        let Some(ch) = self.advance() else {
            return Err(Error::syntax("Unclosed string", string_start));
        };

        let decoded = match ch {
            0x62 => 0x08, // \b
            0x74 => 0x09, // \t
            0x6E => LF,   // \n
            0x76 => 0x0B, // \v
            0x66 => 0x0C, // \f
            0x72 => CR,   // \r
            0x30 if !self.peek().is_some_and(is_digit) => 0x00,
            _ if is_digit(ch) => {
                return Err(Error::syntax("Malformed escape sequence", escape_start));
            }
            0x78 | 0x75 => {
                let count = if ch == 0x78 { 2 } else { 4 };
                self.scan_hex_digits(count)
                    .ok_or_else(|| Error::syntax("Malformed escape sequence", escape_start))?
            }
            CR => {
                if self.peek() == Some(LF) {
                    self.advance();
                }
                return Ok(None);
            }
            LF | LS | PS => return Ok(None),
            // `\"`, `\'`, `\\` and every other character stand for themselves.
            _ => ch,
        };
        Ok(Some(decoded))
    }

    fn scan_punctuator(&mut self) -> Result<Punctuator> {
        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Err(Error::syntax("Unexpected end of input", start));
        };
        let Ok(ch) = u8::try_from(ch) else {
            return Err(Error::syntax("Unknown character", start));
        };

        use Punctuator::*;
        let punct = match ch {
            b'{' => LeftBrace,
            b'}' => RightBrace,
            b'(' => LeftParen,
            b')' => RightParen,
            b'[' => LeftBracket,
            b']' => RightBracket,
            b'.' => Dot,
            b';' => Semicolon,
            b',' => Comma,
            b'~' => Tilde,
            b':' => Colon,
            b'?' => Question,
            b'*' => self.scan_assign_variant(Star, StarEqual),
            b'/' => self.scan_assign_variant(Slash, SlashEqual),
            b'^' => self.scan_assign_variant(Caret, CaretEqual),
            b'%' => self.scan_assign_variant(Percent, PercentEqual),
            b'+' => self.scan_doubled_variant(b'+', Plus, PlusPlus, PlusEqual),
            b'-' => self.scan_doubled_variant(b'-', Minus, MinusMinus, MinusEqual),
            b'&' => self.scan_doubled_variant(b'&', Ampersand, AmpersandAmpersand, AmpersandEqual),
            b'|' => self.scan_doubled_variant(b'|', Pipe, PipePipe, PipeEqual),
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'=' => self.scan_equal(),
            b'!' => self.scan_bang(),
            _ => return Err(Error::syntax("Unknown character", start)),
        };
        Ok(punct)
    }

    fn eat(&mut self, ascii: u8) -> bool {
        if self.peek_is(0, ascii) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn scan_assign_variant(&mut self, plain: Punctuator, assign: Punctuator) -> Punctuator {
        if self.eat(b'=') { assign } else { plain }
    }

    fn scan_doubled_variant(
        &mut self,
        ch: u8,
        plain: Punctuator,
        doubled: Punctuator,
        assign: Punctuator,
    ) -> Punctuator {
        if self.eat(ch) {
            doubled
        } else if self.eat(b'=') {
            assign
        } else {
            plain
        }
    }

    fn scan_less_than(&mut self) -> Punctuator {
        match self.peek().and_then(|ch| u8::try_from(ch).ok()) {
            Some(b'<') => {
                self.advance();
                self.scan_assign_variant(Punctuator::LeftShift, Punctuator::LeftShiftEqual)
            }
            Some(b'=') => {
                self.advance();
                Punctuator::LessThanEqual
            }
            _ => Punctuator::LessThan,
        }
    }

    fn scan_greater_than(&mut self) -> Punctuator {
        match self.peek().and_then(|ch| u8::try_from(ch).ok()) {
            Some(b'>') => {
                self.advance();
                match self.peek().and_then(|ch| u8::try_from(ch).ok()) {
                    Some(b'>') => {
                        self.advance();
                        self.scan_assign_variant(
                            Punctuator::UnsignedRightShift,
                            Punctuator::UnsignedRightShiftEqual,
                        )
                    }
                    Some(b'=') => {
                        self.advance();
                        Punctuator::RightShiftEqual
                    }
                    _ => Punctuator::RightShift,
                }
            }
            Some(b'=') => {
                self.advance();
                Punctuator::GreaterThanEqual
            }
            _ => Punctuator::GreaterThan,
        }
    }

    fn scan_equal(&mut self) -> Punctuator {
        if self.eat(b'=') {
            self.scan_assign_variant(Punctuator::EqualEqual, Punctuator::EqualEqualEqual)
        } else {
            Punctuator::Equal
        }
    }

    fn scan_bang(&mut self) -> Punctuator {
        if self.eat(b'=') {
            self.scan_assign_variant(Punctuator::BangEqual, Punctuator::BangEqualEqual)
        } else {
            Punctuator::Bang
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token>;

    /// Yields tokens up to and including [`TokenKind::Eof`], then `None`.
    /// Scanning stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        self.finished = result.as_ref().map_or(true, Token::is_eof);
        Some(result)
    }
}

/// Converts a source offset to a zero-based `(line, column)` pair by
/// re-scanning for line feeds.
pub fn locus_to_line_column(source: &[EcmaChar], locus: Locus) -> (usize, usize) {
    let end = locus.min(source.len());
    let mut line = 0;
    let mut column = 0;
    for &unit in &source[..end] {
        if unit == LF {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    (line, column)
}

fn is_digit(ch: EcmaChar) -> bool {
    (0x30..=0x39).contains(&ch)
}

fn is_octal_digit(ch: EcmaChar) -> bool {
    (0x30..=0x37).contains(&ch)
}

fn is_hex_digit(ch: EcmaChar) -> bool {
    hex_value(ch).is_some()
}

fn hex_value(ch: EcmaChar) -> Option<u32> {
    char::from_u32(u32::from(ch)).and_then(|c| c.to_digit(16))
}

fn is_whitespace(ch: EcmaChar) -> bool {
    matches!(ch, 0x09 | 0x0B | 0x0C | 0x20 | CR | 0xA0 | 0xFEFF | LS | PS)
}

fn is_id_start(ch: EcmaChar) -> bool {
    match u8::try_from(ch) {
        Ok(b) if b.is_ascii() => b.is_ascii_alphabetic() || b == b'$' || b == b'_',
        _ => char::from_u32(u32::from(ch)).is_some_and(UnicodeXID::is_xid_start),
    }
}

fn is_id_continue(ch: EcmaChar) -> bool {
    match u8::try_from(ch) {
        Ok(b) if b.is_ascii() => b.is_ascii_alphanumeric() || b == b'$' || b == b'_',
        _ => char::from_u32(u32::from(ch)).is_some_and(UnicodeXID::is_xid_continue),
    }
}
