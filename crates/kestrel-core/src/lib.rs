// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # kestrel-core
//!
//! The front-end of a small embedded ECMAScript engine.
//!
//! ## Overview
//!
//! This crate turns source text into what an interpreter executes:
//! - A lexer producing tokens from UTF-16 source
//! - A deduplicating literal pool with a relocatable string cache
//! - A bytecode serializer and a blob codec for the register machine
//! - Variable resolution for interpreter frames
//! - A regular expression compiler
//!
//! Each compilation unit owns its state through explicit context values
//! ([`lexer::Scanner`], [`bytecode::Serializer`], [`vm::Frame`]), so units
//! can be compiled side by side.
//!
//! ## Quick Start
//!
//! ```rust
//! use kestrel_core::lexer::{self, TokenKind};
//!
//! let source: Vec<u16> = "a = 1;".encode_utf16().collect();
//! let (tokens, literals) = lexer::tokenize(&source, false).unwrap();
//! assert_eq!(tokens[2].kind, TokenKind::SmallInt(1));
//! assert_eq!(literals.count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod bytecode;
pub mod config;
pub mod error;
pub mod lexer;
pub mod literal;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod regexp;
pub mod vm;

// Re-exports for convenience
pub use config::FrontendConfig;
pub use error::{Error, ErrorKind, Result};
pub use vm::{Completion, Value};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
