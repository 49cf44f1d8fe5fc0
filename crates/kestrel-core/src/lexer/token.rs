//! Token definitions for the lexer.

use crate::literal::LiteralIndex;

/// A span in the source buffer, counted in code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of this span in code units.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The span in the source buffer
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Source offset where the token starts.
    pub fn locus(&self) -> usize {
        self.span.start
    }

    /// Returns true for the end-of-input token.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// The different kinds of tokens.
///
/// Literal-bearing kinds carry the index of the interned value, except
/// [`TokenKind::SmallInt`], which carries integers `0..=255` inline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// Identifier, interned as a string literal
    Name(LiteralIndex),
    /// Reserved word
    Keyword(Keyword),
    /// Integer literal small enough to live in the token
    SmallInt(u8),
    /// Any other numeric literal
    Number(LiteralIndex),
    /// String literal, escapes decoded
    String(LiteralIndex),
    /// `true` or `false`
    Boolean(bool),
    /// `null`
    Null,
    /// Operator or punctuation
    Punct(Punctuator),
    /// Line break, or a block comment that spanned one
    Newline,
    /// End of input
    Eof,
    /// No token
    Empty,
}

impl TokenKind {
    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Eof => "End of file",
            TokenKind::Name(_) => "Identifier",
            TokenKind::Keyword(_) => "Keyword",
            TokenKind::SmallInt(_) | TokenKind::Number(_) => "Number",
            TokenKind::String(_) => "string",
            TokenKind::Boolean(_) => "bool",
            TokenKind::Null => "null",
            TokenKind::Newline => "newline",
            TokenKind::Punct(punct) => punct.as_str(),
            TokenKind::Empty => "empty",
        }
    }
}

macro_rules! keywords {
    ($( $(#[$strict:ident])? $variant:ident => $text:literal, )*) => {
        /// Reserved words of ES5, including the strict-mode future reserved words.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $(
                #[doc = concat!("`", $text, "`")]
                $variant,
            )*
        }

        impl Keyword {
            /// Every keyword, in table order.
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant),*];

            /// Returns the spelling of this keyword.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }

            /// Returns true for words that are only reserved in strict mode code.
            pub fn is_strict_only(self) -> bool {
                match self {
                    $(Keyword::$variant => keywords!(@strict $($strict)?),)*
                }
            }
        }
    };
    (@strict strict) => { true };
    (@strict) => { false };
}

keywords! {
    Break => "break",
    Case => "case",
    Catch => "catch",
    Class => "class",
    Const => "const",
    Continue => "continue",
    Debugger => "debugger",
    Default => "default",
    Delete => "delete",
    Do => "do",
    Else => "else",
    Enum => "enum",
    Export => "export",
    Extends => "extends",
    Finally => "finally",
    For => "for",
    Function => "function",
    If => "if",
    In => "in",
    Instanceof => "instanceof",
    #[strict] Interface => "interface",
    Import => "import",
    #[strict] Implements => "implements",
    #[strict] Let => "let",
    New => "new",
    #[strict] Package => "package",
    #[strict] Private => "private",
    #[strict] Protected => "protected",
    #[strict] Public => "public",
    Return => "return",
    #[strict] Static => "static",
    Super => "super",
    Switch => "switch",
    This => "this",
    Throw => "throw",
    Try => "try",
    Typeof => "typeof",
    Var => "var",
    Void => "void",
    While => "while",
    With => "with",
    #[strict] Yield => "yield",
}

impl Keyword {
    /// Finds the keyword spelled by `units`.
    pub fn from_units(units: &[u16]) -> Option<Self> {
        // Every keyword is lowercase ASCII.
        if !units.iter().all(|&u| (u16::from(b'a')..=u16::from(b'z')).contains(&u)) {
            return None;
        }
        Self::ALL.iter().copied().find(|kw| {
            let text = kw.as_str();
            text.len() == units.len() && text.bytes().zip(units).all(|(b, &u)| u16::from(b) == u)
        })
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operators and punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punctuator {
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `~`
    Tilde,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `*`
    Star,
    /// `*=`
    StarEqual,
    /// `/`
    Slash,
    /// `/=`
    SlashEqual,
    /// `^`
    Caret,
    /// `^=`
    CaretEqual,
    /// `%`
    Percent,
    /// `%=`
    PercentEqual,
    /// `+`
    Plus,
    /// `++`
    PlusPlus,
    /// `+=`
    PlusEqual,
    /// `-`
    Minus,
    /// `--`
    MinusMinus,
    /// `-=`
    MinusEqual,
    /// `&`
    Ampersand,
    /// `&&`
    AmpersandAmpersand,
    /// `&=`
    AmpersandEqual,
    /// `|`
    Pipe,
    /// `||`
    PipePipe,
    /// `|=`
    PipeEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
    /// `<<`
    LeftShift,
    /// `<<=`
    LeftShiftEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
    /// `>>`
    RightShift,
    /// `>>=`
    RightShiftEqual,
    /// `>>>`
    UnsignedRightShift,
    /// `>>>=`
    UnsignedRightShiftEqual,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `===`
    EqualEqualEqual,
    /// `!`
    Bang,
    /// `!=`
    BangEqual,
    /// `!==`
    BangEqualEqual,
}

impl Punctuator {
    /// Returns the spelling of this punctuator.
    pub fn as_str(self) -> &'static str {
        use Punctuator::*;
        match self {
            LeftBrace => "{",
            RightBrace => "}",
            LeftParen => "(",
            RightParen => ")",
            LeftBracket => "[",
            RightBracket => "]",
            Dot => ".",
            Semicolon => ";",
            Comma => ",",
            Tilde => "~",
            Colon => ":",
            Question => "?",
            Star => "*",
            StarEqual => "*=",
            Slash => "/",
            SlashEqual => "/=",
            Caret => "^",
            CaretEqual => "^=",
            Percent => "%",
            PercentEqual => "%=",
            Plus => "+",
            PlusPlus => "++",
            PlusEqual => "+=",
            Minus => "-",
            MinusMinus => "--",
            MinusEqual => "-=",
            Ampersand => "&",
            AmpersandAmpersand => "&&",
            AmpersandEqual => "&=",
            Pipe => "|",
            PipePipe => "||",
            PipeEqual => "|=",
            LessThan => "<",
            LessThanEqual => "<=",
            LeftShift => "<<",
            LeftShiftEqual => "<<=",
            GreaterThan => ">",
            GreaterThanEqual => ">=",
            RightShift => ">>",
            RightShiftEqual => ">>=",
            UnsignedRightShift => ">>>",
            UnsignedRightShiftEqual => ">>>=",
            Equal => "=",
            EqualEqual => "==",
            EqualEqualEqual => "===",
            Bang => "!",
            BangEqual => "!=",
            BangEqualEqual => "!==",
        }
    }
}

impl std::fmt::Display for Punctuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
