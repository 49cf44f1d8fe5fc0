// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Front-end settings.
//!
//! [`FrontendConfig`] is plain data. Front-ends read it from the `[frontend]`
//! table of a `kestrel.toml` file; every field falls back to its default.

use serde::Deserialize;

use crate::bytecode::Serializer;
use crate::error::Result;
use crate::lexer::Scanner;
use crate::literal::{EcmaChar, LiteralPool};
use crate::regexp::{self, DEFAULT_RECURSION_LIMIT, RegExpBytecode};

/// Settings shared by the lexer, serializer and regexp compiler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Scan sources as strict mode code
    pub strict: bool,

    /// Log a disassembly of every merged bytecode blob
    pub show_opcodes: bool,

    /// Maximum group nesting accepted by the regexp compiler
    pub regexp_recursion_limit: usize,

    /// Initial string cache capacity, in code units
    pub string_cache_capacity: usize,

    /// Worker threads for parallel compilation; 0 picks one per core
    pub parallel_threads: usize,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            strict: false,
            show_opcodes: false,
            regexp_recursion_limit: DEFAULT_RECURSION_LIMIT,
            string_cache_capacity: 256,
            parallel_threads: 0,
        }
    }
}

impl FrontendConfig {
    /// Creates a literal pool sized by `string_cache_capacity`.
    pub fn literal_pool(&self) -> LiteralPool {
        LiteralPool::with_cache_capacity(self.string_cache_capacity)
    }

    /// Creates a scanner honoring `strict` and the cache size.
    pub fn scanner<'a>(&self, source: &'a [EcmaChar]) -> Scanner<'a> {
        let mut scanner = Scanner::with_literals(source, self.literal_pool());
        scanner.set_strict(self.strict);
        scanner
    }

    /// Creates a serializer honoring `show_opcodes`.
    pub fn serializer(&self) -> Serializer {
        let mut serializer = Serializer::new();
        serializer.set_show_opcodes(self.show_opcodes);
        serializer
    }

    /// Compiles a regular expression under `regexp_recursion_limit`.
    pub fn compile_regexp(&self, pattern: &str, flags: &str) -> Result<RegExpBytecode> {
        regexp::compile_with_limit(pattern, flags, self.regexp_recursion_limit)
    }
}
