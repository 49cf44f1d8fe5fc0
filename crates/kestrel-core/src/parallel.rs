// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Parallel compilation of independent units.
//!
//! Every unit gets its own scanner, literal pool or regexp compiler, so
//! units share nothing and run on a rayon pool without locking.
//!
//! # Example
//!
//! ```
//! use kestrel_core::config::FrontendConfig;
//! use kestrel_core::parallel::ParallelCompiler;
//!
//! let compiler = ParallelCompiler::new(FrontendConfig::default()).unwrap();
//! let results = compiler.tokenize_all(&["var a = 1;", "b + c"]);
//! assert!(results.iter().all(|r| r.is_ok()));
//! ```

use rayon::prelude::*;
use tracing::debug;

use crate::config::FrontendConfig;
use crate::error::{Error, Result};
use crate::lexer::Token;
use crate::literal::LiteralPool;
use crate::regexp::RegExpBytecode;

/// Tokens and literals of one source.
pub type TokenizedUnit = (Vec<Token>, LiteralPool);

/// Runs independent compilation units on a thread pool.
pub struct ParallelCompiler {
    /// Thread pool for CPU-bound work
    pool: rayon::ThreadPool,
    config: FrontendConfig,
}

impl ParallelCompiler {
    /// Creates a compiler whose pool size comes from
    /// `config.parallel_threads` (0 means one thread per core).
    pub fn new(config: FrontendConfig) -> Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if config.parallel_threads > 0 {
            builder = builder.num_threads(config.parallel_threads);
        }
        let pool = builder
            .build()
            .map_err(|e| Error::internal(format!("failed to create thread pool: {e}")))?;
        debug!(threads = pool.current_num_threads(), "parallel compiler ready");
        Ok(Self { pool, config })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Tokenizes each source. Results come back in input order.
    pub fn tokenize_all(&self, sources: &[&str]) -> Vec<Result<TokenizedUnit>> {
        self.pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    let units: Vec<u16> = source.encode_utf16().collect();
                    let mut scanner = self.config.scanner(&units);
                    let tokens = scanner.by_ref().collect::<Result<Vec<_>>>()?;
                    Ok((tokens, scanner.into_literals()))
                })
                .collect()
        })
    }

    /// Compiles each `(pattern, flags)` pair. Results come back in input
    /// order.
    pub fn compile_regexps(&self, patterns: &[(&str, &str)]) -> Vec<Result<RegExpBytecode>> {
        self.pool.install(|| {
            patterns
                .par_iter()
                .map(|(pattern, flags)| self.config.compile_regexp(pattern, flags))
                .collect()
        })
    }
}
