// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration file parsing for kestrel.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;
use kestrel_core::FrontendConfig;
use serde::Deserialize;
use tracing::debug;

/// File names searched for, in order, in each directory.
const CONFIG_NAMES: &[&str] = &["kestrel.toml", ".kestrel.toml"];

/// Prefix of environment variables that override file settings.
const ENV_PREFIX: &str = "KESTREL_";

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Lexer, serializer and regexp settings
    #[serde(default)]
    pub frontend: FrontendConfig,
}

/// Load configuration from a file or search for default config files,
/// then apply `KESTREL_*` environment overrides.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = match path {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file {} does not exist", path.display());
            Some(path.to_path_buf())
        }
        None => std::env::current_dir().ok().and_then(|cwd| find_config_file(&cwd)),
    };

    let mut config = match config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_config(&content).with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config.frontend, |name| std::env::var(name).ok())?;
    Ok(config)
}

fn parse_config(content: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Search for a configuration file in `start` and its parents.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    })
}

/// Overrides fields from variables such as `KESTREL_STRICT=1`.
fn apply_env_overrides(
    config: &mut FrontendConfig,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    let lookup = |field: &str| var(&format!("{ENV_PREFIX}{}", field.to_uppercase()));

    if let Some(value) = lookup("strict") {
        config.strict = parse_bool("strict", &value)?;
    }
    if let Some(value) = lookup("show_opcodes") {
        config.show_opcodes = parse_bool("show_opcodes", &value)?;
    }
    if let Some(value) = lookup("regexp_recursion_limit") {
        config.regexp_recursion_limit = parse_number("regexp_recursion_limit", &value)?;
    }
    if let Some(value) = lookup("string_cache_capacity") {
        config.string_cache_capacity = parse_number("string_cache_capacity", &value)?;
    }
    if let Some(value) = lookup("parallel_threads") {
        config.parallel_threads = parse_number("parallel_threads", &value)?;
    }
    Ok(())
}

fn parse_bool(field: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{ENV_PREFIX}{}: expected a boolean, got '{other}'", field.to_uppercase()),
    }
}

fn parse_number(field: &str, value: &str) -> anyhow::Result<usize> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{ENV_PREFIX}{}: expected a number, got '{value}'", field.to_uppercase()))
}
