//! Lexical analysis (tokenization) for ECMAScript source code.
//!
//! The lexer transforms UTF-16 source text into a stream of tokens that can
//! be consumed by a parser. Names, strings and numbers are interned into the
//! scanner's [`LiteralPool`](crate::literal::LiteralPool) as they are met.
//!
//! ## Structure
//!
//! - `scanner.rs` - Main `Scanner` struct that produces tokens
//! - `token.rs` - `Token`, `TokenKind`, `Keyword` and `Punctuator` definitions
//!
//! ## Documentation Submodules
//!
//! - `operators` - Multi-character operator scanning
//! - `literals` - Number, string, and identifier literals
//!
//! ## Usage
//!
//! ```rust
//! use kestrel_core::lexer::{Scanner, TokenKind};
//!
//! let source: Vec<u16> = "var x = 42;".encode_utf16().collect();
//! let mut scanner = Scanner::new(&source);
//!
//! loop {
//!     let token = scanner.next_token().unwrap();
//!     if matches!(token.kind, TokenKind::Eof) {
//!         break;
//!     }
//!     println!("{:?}", token.kind);
//! }
//! ```

mod scanner;
mod token;

// Documentation and test submodules
pub mod literals;
pub mod operators;

pub use scanner::{Scanner, locus_to_line_column};
pub use token::{Keyword, Punctuator, Span, Token, TokenKind};

use crate::error::Result;
use crate::literal::{EcmaChar, LiteralPool};

/// Tokenizes a whole source, returning the tokens up to and including
/// [`TokenKind::Eof`] together with the literals they refer to.
pub fn tokenize(source: &[EcmaChar], strict: bool) -> Result<(Vec<Token>, LiteralPool)> {
    let mut scanner = Scanner::new(source);
    scanner.set_strict(strict);
    let tokens = scanner.by_ref().collect::<Result<Vec<_>>>()?;
    Ok((tokens, scanner.into_literals()))
}
