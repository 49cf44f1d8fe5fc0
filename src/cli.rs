// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// kestrel - Inspect what the ECMAScript front-end makes of your code
#[derive(Parser, Debug)]
#[command(name = "kestrel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read settings from this file instead of searching for kestrel.toml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tokens and literal table of source files
    Lex(LexArgs),

    /// Print the bytecode of a regular expression
    #[command(alias = "re")]
    Regexp(RegexpArgs),

    /// Disassemble a serialized bytecode blob
    Inspect(InspectArgs),

    /// Tokenize lines interactively (the default)
    Repl,
}

#[derive(Args, Debug)]
pub struct LexArgs {
    /// Source files; several files are tokenized in parallel
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Scan as strict mode code
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct RegexpArgs {
    /// The pattern, without slashes
    pub pattern: String,

    /// Flags such as "gi"
    #[arg(short, long, default_value = "")]
    pub flags: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path of the blob
    pub blob: PathBuf,
}
