//! Regular expression compiler.
//!
//! A pattern is tokenized by [`RegExpParser`] and compiled by
//! [`RegExpCompiler`] into a [`RegExpBytecode`] word stream for a
//! backtracking matcher.
//!
//! ## Structure
//!
//! - `flags` - [`RegExpFlags`]
//! - `parser` - Pattern tokens and quantifiers
//! - `compiler` - Recursive descent, one level per open group
//! - `bytecode` - Opcodes, the compiled form and its disassembly
//!
//! ```
//! use kestrel_core::regexp;
//!
//! let bytecode = regexp::compile("a|b", "g").unwrap();
//! assert!(bytecode.disassemble().contains("ALTERNATIVE"));
//! ```

mod bytecode;
mod compiler;
mod flags;
mod parser;

pub use bytecode::{HEADER_WORDS, Instruction, RegExpBytecode, RegExpOpcode};
pub use compiler::RegExpCompiler;
pub use flags::RegExpFlags;
pub use parser::{ClassRange, INFINITE, Quantifier, RegExpParser, RegExpToken};

use crate::error::Result;

/// Default cap on group nesting.
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// Compiles `pattern` with the flags string `flags`.
///
/// Flags are checked before the pattern is looked at.
pub fn compile(pattern: &str, flags: &str) -> Result<RegExpBytecode> {
    compile_with_limit(pattern, flags, DEFAULT_RECURSION_LIMIT)
}

/// Compiles `pattern`, failing with a RangeError past `recursion_limit`
/// nested groups.
pub fn compile_with_limit(pattern: &str, flags: &str, recursion_limit: usize) -> Result<RegExpBytecode> {
    let flags = RegExpFlags::parse(flags)?;
    let units: Vec<u16> = pattern.encode_utf16().collect();
    RegExpCompiler::new(&units, flags)
        .with_recursion_limit(recursion_limit)
        .compile()
}
