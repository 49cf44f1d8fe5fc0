// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types shared by every stage of the front-end.
//!
//! A failed operation returns `Err(Error)`. That is the "throw" state of
//! the completion protocol (see [`crate::vm::Completion`]), so `?` forwards
//! an exception unchanged and skips the rest of the caller.

use thiserror::Error;

use crate::vm::Value;

/// Offset of a code unit in the source buffer.
pub type Locus = usize;

/// Result type for front-end operations
pub type Result<T> = std::result::Result<T, Error>;

/// The ECMAScript error class an [`Error`] maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `SyntaxError`
    Syntax,
    /// `RangeError`
    Range,
    /// `TypeError`
    Type,
    /// `ReferenceError`
    Reference,
    /// A user value passed to `throw`
    Thrown,
    /// Engine invariant violation or corrupt bytecode
    Internal,
}

impl ErrorKind {
    /// Returns the name of the standard constructor for this kind.
    pub fn constructor_name(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Thrown => "Error",
            ErrorKind::Internal => "InternalError",
        }
    }
}

/// Errors raised while tokenizing, encoding, resolving or compiling.
#[derive(Debug, Error)]
pub enum Error {
    /// Syntax error, positioned in the source when the lexer raised it
    #[error("SyntaxError: {message}{}", format_locus(.locus))]
    Syntax {
        /// Human readable description
        message: String,
        /// Offending source offset, if known
        locus: Option<Locus>,
    },

    /// Range error (recursion limit, out of range operand)
    #[error("RangeError: {0}")]
    Range(String),

    /// Type error
    #[error("TypeError: {0}")]
    Type(String),

    /// Reference error (unresolvable binding)
    #[error("ReferenceError: {0}")]
    Reference(String),

    /// A value thrown by script code
    #[error("Uncaught {0:?}")]
    Thrown(Value),

    /// Malformed or truncated bytecode blob
    #[error("invalid bytecode: {0}")]
    Bytecode(String),

    /// Internal engine error
    #[error("InternalError: {0}")]
    Internal(String),
}

impl Error {
    /// Create a positioned SyntaxError
    pub fn syntax(message: impl Into<String>, locus: Locus) -> Self {
        Self::Syntax {
            message: message.into(),
            locus: Some(locus),
        }
    }

    /// Create a SyntaxError without a source position
    pub fn syntax_unpositioned(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            locus: None,
        }
    }

    /// Create a new RangeError
    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }

    /// Create a new ReferenceError
    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    /// Create a bytecode decoding error
    pub fn bytecode(msg: impl Into<String>) -> Self {
        Self::Bytecode(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the ECMAScript error class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::Range(_) => ErrorKind::Range,
            Error::Type(_) => ErrorKind::Type,
            Error::Reference(_) => ErrorKind::Reference,
            Error::Thrown(_) => ErrorKind::Thrown,
            Error::Bytecode(_) | Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the source offset of a positioned syntax error.
    pub fn locus(&self) -> Option<Locus> {
        match self {
            Error::Syntax { locus, .. } => *locus,
            _ => None,
        }
    }
}

fn format_locus(locus: &Option<Locus>) -> String {
    match locus {
        Some(locus) => format!(" (at {locus})"),
        None => String::new(),
    }
}
