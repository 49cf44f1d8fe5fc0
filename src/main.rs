// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! kestrel - command line front-end for the kestrel-core ECMAScript front-end.
//!
//! ## Features
//!
//! - Token and literal dumps for source files, tokenized in parallel
//! - RegExp bytecode disassembly
//! - Bytecode blob inspection
//! - Interactive REPL with highlighting and history

mod cli;
mod commands;
mod config;
mod repl;

use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Installs the log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "kestrel=debug,kestrel_core=debug" } else { "kestrel=warn,kestrel_core=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = config::load_config(cli.config.as_deref())?.frontend;

    match &cli.command {
        Some(Commands::Lex(args)) => commands::lex(args, &config),
        Some(Commands::Regexp(args)) => commands::regexp(args, &config),
        Some(Commands::Inspect(args)) => commands::inspect(args),
        Some(Commands::Repl) | None => {
            let mut repl = repl::Repl::new(config)?;
            repl.run()?;
            Ok(())
        }
    }
}
