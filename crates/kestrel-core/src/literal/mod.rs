// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Literal storage for one compilation unit.
//!
//! ## Structure
//!
//! - `pool.rs` - [`LiteralPool`], the deduplicating table, and its string cache
//! - `magic.rs` - [`MagicString`], well-known strings with fixed ids
//!
//! Bytecode refers to literals by [`LiteralIndex`]. Indices are dense, stable
//! for the life of the pool, and never reused.
//!
//! ## Usage
//!
//! ```rust
//! use kestrel_core::literal::{LiteralPool, LiteralValue};
//!
//! let mut pool = LiteralPool::new();
//! let name: Vec<u16> = "counter".encode_utf16().collect();
//!
//! let a = pool.insert(LiteralValue::string(&name));
//! let b = pool.insert(LiteralValue::string(&name));
//! assert_eq!(a, b);
//! assert_eq!(pool.count(), 1);
//! ```

mod magic;
mod pool;

pub use magic::MagicString;
pub use pool::{LiteralPool, StringCache};

use std::borrow::Cow;

/// A UTF-16 code unit, the fixed-width character of source text.
pub type EcmaChar = u16;

/// Dense index of a literal in its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiteralIndex(pub u32);

impl LiteralIndex {
    /// Returns the index as a `usize` for table access.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for LiteralIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a string's code units in the [`StringCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef {
    /// Offset of the first code unit
    pub offset: u32,
    /// Number of code units
    pub length: u32,
    /// Hash of the code units
    pub hash: u32,
}

/// An entry of the literal pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    /// String stored in the cache
    String(StringRef),
    /// Well-known string
    Magic(MagicString),
    /// Number
    Number(f64),
}

impl Literal {
    /// Returns true for cached and magic strings.
    pub fn is_string(&self) -> bool {
        matches!(self, Literal::String(_) | Literal::Magic(_))
    }

    /// Returns the number, if this is a number literal.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// The content of a literal, independent of where it is stored.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue<'a> {
    /// String content
    String(Cow<'a, [EcmaChar]>),
    /// Number
    Number(f64),
}

impl<'a> LiteralValue<'a> {
    /// Borrows a string value.
    pub fn string(units: &'a [EcmaChar]) -> Self {
        LiteralValue::String(Cow::Borrowed(units))
    }

    /// Returns the code units of a string value.
    pub fn as_units(&self) -> Option<&[EcmaChar]> {
        match self {
            LiteralValue::String(units) => Some(units),
            LiteralValue::Number(_) => None,
        }
    }

    /// Returns the number of a number value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiteralValue::Number(n) => Some(*n),
            LiteralValue::String(_) => None,
        }
    }

    /// Copies borrowed content so the value outlives its source.
    pub fn into_owned(self) -> LiteralValue<'static> {
        match self {
            LiteralValue::String(units) => LiteralValue::String(Cow::Owned(units.into_owned())),
            LiteralValue::Number(n) => LiteralValue::Number(n),
        }
    }
}

impl From<&str> for LiteralValue<'static> {
    fn from(text: &str) -> Self {
        LiteralValue::String(Cow::Owned(text.encode_utf16().collect()))
    }
}

impl From<f64> for LiteralValue<'static> {
    fn from(n: f64) -> Self {
        LiteralValue::Number(n)
    }
}

impl std::fmt::Display for LiteralValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiteralValue::String(units) => write!(f, "{:?}", String::from_utf16_lossy(units)),
            LiteralValue::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

/// Formats a number the way script code prints it (`1`, `1.5`, `NaN`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // Covers -0 as well.
        "0".to_string()
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}
