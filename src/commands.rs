// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Implementations of the `lex`, `regexp` and `inspect` subcommands.

use std::fmt::Write;

use anyhow::Context;
use kestrel_core::bytecode::Deserializer;
use kestrel_core::lexer::{Token, TokenKind, locus_to_line_column};
use kestrel_core::literal::LiteralPool;
use kestrel_core::parallel::ParallelCompiler;
use kestrel_core::FrontendConfig;
use owo_colors::OwoColorize;
use tracing::info;

use crate::cli::{InspectArgs, LexArgs, RegexpArgs};

/// Tokenizes every file and prints its token listing and literal table.
pub fn lex(args: &LexArgs, config: &FrontendConfig) -> anyhow::Result<()> {
    let config = FrontendConfig {
        strict: config.strict || args.strict,
        ..config.clone()
    };

    let sources = args
        .files
        .iter()
        .map(|path| {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let source_refs: Vec<&str> = sources.iter().map(String::as_str).collect();

    let compiler = ParallelCompiler::new(config)?;
    info!(files = sources.len(), threads = compiler.threads(), "tokenizing");
    let results = compiler.tokenize_all(&source_refs);

    let mut failed = 0;
    for ((path, source), result) in args.files.iter().zip(&sources).zip(results) {
        let units: Vec<u16> = source.encode_utf16().collect();
        if args.files.len() > 1 {
            println!("{}", format!("==> {} <==", path.display()).bold());
        }
        match result {
            Ok((tokens, literals)) => print!("{}", render_tokens(&units, &tokens, &literals)),
            Err(err) => {
                failed += 1;
                let position = err
                    .locus()
                    .map(|locus| {
                        let (line, column) = locus_to_line_column(&units, locus);
                        format!("{}:{}:{}: ", path.display(), line + 1, column + 1)
                    })
                    .unwrap_or_default();
                eprintln!("{}{}", position, err.to_string().red());
            }
        }
    }

    anyhow::ensure!(failed == 0, "{failed} of {} file(s) failed to tokenize", args.files.len());
    Ok(())
}

/// Compiles a pattern and prints its bytecode.
pub fn regexp(args: &RegexpArgs, config: &FrontendConfig) -> anyhow::Result<()> {
    let bytecode = config.compile_regexp(&args.pattern, &args.flags)?;
    print!("{}", bytecode.disassemble());
    Ok(())
}

/// Loads a serialized blob and prints its disassembly.
pub fn inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.blob)
        .with_context(|| format!("failed to read {}", args.blob.display()))?;
    let mut deserializer = Deserializer::new();
    let blob = deserializer
        .load(&bytes)
        .with_context(|| format!("failed to decode {}", args.blob.display()))?;
    print!("{}", blob.disassemble());
    Ok(())
}

/// One line per token, `line:column kind text`, followed by the literals.
pub fn render_tokens(source: &[u16], tokens: &[Token], literals: &LiteralPool) -> String {
    let mut out = String::new();
    for token in tokens {
        let (line, column) = locus_to_line_column(source, token.locus());
        let _ = writeln!(
            out,
            "{:>4}:{:<4} {:<12} {}",
            line + 1,
            column + 1,
            token.kind.describe(),
            token_text(&token.kind, literals)
        );
    }

    if !literals.is_empty() {
        let _ = writeln!(out, "; literals");
        for (index, _) in literals.iter() {
            let _ = writeln!(out, ";   {index} = {}", literals.to_display_string(index));
        }
    }
    out
}

/// The source-level text of a token.
pub fn token_text(kind: &TokenKind, literals: &LiteralPool) -> String {
    match kind {
        TokenKind::Name(index) | TokenKind::String(index) | TokenKind::Number(index) => {
            literals.to_display_string(*index)
        }
        TokenKind::Keyword(keyword) => keyword.to_string(),
        TokenKind::SmallInt(value) => value.to_string(),
        TokenKind::Boolean(value) => value.to_string(),
        TokenKind::Null => "null".to_string(),
        TokenKind::Punct(punct) => punct.to_string(),
        TokenKind::Newline | TokenKind::Eof | TokenKind::Empty => String::new(),
    }
}
