// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive REPL that tokenizes each line it reads.

use std::borrow::Cow;
use std::path::PathBuf;

use kestrel_core::lexer::{Keyword, TokenKind};
use kestrel_core::{Error, FrontendConfig};
use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Config, Editor, Helper};

use crate::commands::token_text;

/// REPL configuration constants
const HISTORY_FILE: &str = ".kestrel_history";
const MAX_HISTORY_SIZE: usize = 1000;

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Strict,
    Version,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let rest = input.trim().strip_prefix('.')?;
        let mut parts = rest.splitn(2, char::is_whitespace);
        let cmd = parts.next()?.to_lowercase();
        let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

        match cmd.as_str() {
            "help" | "h" | "?" => Some((ReplCommand::Help, arg)),
            "exit" | "quit" | "q" => Some((ReplCommand::Exit, arg)),
            "clear" | "cls" => Some((ReplCommand::Clear, arg)),
            "strict" => Some((ReplCommand::Strict, arg)),
            "version" | "v" => Some((ReplCommand::Version, arg)),
            _ => None,
        }
    }

    /// Get all available commands for help/completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".strict [on|off]", "Toggle or set strict mode scanning"),
            (".version", "Show version information"),
        ]
    }
}

/// Helper struct for rustyline that provides completion, hints, and validation
struct KestrelHelper {
    /// Keywords and REPL commands for completion
    words: Vec<&'static str>,
}

impl KestrelHelper {
    fn new() -> Self {
        let mut words: Vec<&'static str> = Keyword::ALL.iter().map(|kw| kw.as_str()).collect();
        words.extend(["true", "false", "null"]);
        words.extend(
            ReplCommand::all_commands()
                .iter()
                .map(|&(cmd, _)| cmd.split_whitespace().next().unwrap_or(cmd)),
        );
        words.sort_unstable();
        words.dedup();
        Self { words }
    }

    fn word_start(line: &str) -> usize {
        line.rfind(|c: char| !c.is_alphanumeric() && c != '_' && c != '.')
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

impl Completer for KestrelHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = Self::word_start(&line[..pos]);
        let word = &line[start..pos];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches = self
            .words
            .iter()
            .filter(|candidate| candidate.starts_with(word))
            .map(|candidate| Pair {
                display: candidate.to_string(),
                replacement: candidate[word.len()..].to_string(),
            })
            .collect();

        Ok((pos, matches))
    }
}

impl Hinter for KestrelHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }

        let word = &line[Self::word_start(line)..];
        if word.len() < 2 {
            return None;
        }

        self.words
            .iter()
            .find(|candidate| candidate.starts_with(word) && candidate.len() > word.len())
            .map(|candidate| (&candidate[word.len()..]).dimmed().to_string())
    }
}

impl Highlighter for KestrelHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let mut result = String::with_capacity(line.len() * 2);
        let mut word = String::new();

        for c in line.chars() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                word.push(c);
                continue;
            }
            if !word.is_empty() {
                result.push_str(&highlight_word(&word));
                word.clear();
            }
            let colored = match c {
                '(' | ')' | '[' | ']' | '{' | '}' => c.yellow().to_string(),
                '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '&' | '|' | '^' | '~' => {
                    c.cyan().to_string()
                }
                '"' | '\'' => c.green().to_string(),
                _ => c.to_string(),
            };
            result.push_str(&colored);
        }
        if !word.is_empty() {
            result.push_str(&highlight_word(&word));
        }

        Cow::Owned(result)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn highlight_word(word: &str) -> String {
    let units: Vec<u16> = word.encode_utf16().collect();
    if Keyword::from_units(&units).is_some() {
        word.magenta().bold().to_string()
    } else if matches!(word, "true" | "false" | "null") {
        word.blue().to_string()
    } else if word.starts_with(|c: char| c.is_ascii_digit()) {
        word.yellow().to_string()
    } else {
        word.to_string()
    }
}

impl Validator for KestrelHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();

        if !is_balanced(input) || input.trim_end().ends_with('\\') {
            return Ok(ValidationResult::Incomplete);
        }

        Ok(ValidationResult::Valid(None))
    }
}

/// Check if brackets, braces, and parentheses are balanced
fn is_balanced(input: &str) -> bool {
    let mut stack = Vec::new();
    let mut in_string = None;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string.is_some() {
            escape_next = true;
            continue;
        }

        match in_string {
            Some(quote) if c == quote => in_string = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => in_string = Some(c),
                '(' => stack.push(')'),
                '[' => stack.push(']'),
                '{' => stack.push('}'),
                ')' | ']' | '}' => {
                    if stack.pop() != Some(c) {
                        // Let the lexer report it
                        return true;
                    }
                }
                _ => {}
            },
        }
    }

    stack.is_empty() && in_string.is_none()
}

impl Helper for KestrelHelper {}

/// The interactive REPL
pub struct Repl {
    config: FrontendConfig,
    editor: Editor<KestrelHelper, DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(config: FrontendConfig) -> rustyline::Result<Self> {
        let editor_config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(MAX_HISTORY_SIZE)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(editor_config)?;
        editor.set_helper(Some(KestrelHelper::new()));

        let history_path = dirs::home_dir().map(|home| home.join(HISTORY_FILE));
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        Ok(Self {
            config,
            editor,
            history_path,
        })
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            let prompt = self.format_prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    if let Some((cmd, arg)) = ReplCommand::parse(trimmed) {
                        match self.execute_command(cmd, arg) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                        }
                    }

                    self.lex_and_print(&line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".dimmed());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "^D".dimmed());
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {:?}", "Error".red().bold(), err);
                    break;
                }
            }
        }

        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }

        println!();
        Ok(())
    }

    fn print_banner(&self) {
        println!();
        println!(
            "  {} {} {}",
            "Kestrel ECMAScript front-end".white().bold(),
            "v".dimmed(),
            kestrel_core::VERSION.bright_yellow()
        );
        println!(
            "  {} {} {}",
            "Type".dimmed(),
            ".help".cyan(),
            "for available commands".dimmed()
        );
        println!();
    }

    fn format_prompt(&self) -> String {
        if self.config.strict {
            format!("{} ", "kestrel(strict)>".bright_green().bold())
        } else {
            format!("{} ", "kestrel>".bright_green().bold())
        }
    }

    fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        match cmd {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Strict => match parse_toggle(arg, self.config.strict) {
                Some(strict) => {
                    self.config.strict = strict;
                    println!(
                        "{} {}",
                        "strict mode".dimmed(),
                        if strict { "on".green().to_string() } else { "off".yellow().to_string() }
                    );
                }
                None => eprintln!(
                    "{}: {} {}",
                    "Error".red().bold(),
                    ".strict".cyan(),
                    "expects 'on' or 'off'".dimmed()
                ),
            },
            ReplCommand::Version => {
                println!("{}: {}", "kestrel".bright_cyan().bold(), kestrel_core::VERSION.yellow());
            }
        }
        CommandResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "REPL Commands:".white().bold());
        println!();
        for (cmd, desc) in ReplCommand::all_commands() {
            println!("  {:18} {}", cmd.cyan(), desc.dimmed());
        }
        println!();
        println!("{}", "Keyboard Shortcuts:".white().bold());
        println!();
        println!("  {:18} {}", "Ctrl+C".yellow(), "Cancel current input".dimmed());
        println!("  {:18} {}", "Ctrl+D".yellow(), "Exit REPL".dimmed());
        println!("  {:18} {}", "Tab".yellow(), "Autocomplete".dimmed());
        println!();
    }

    fn lex_and_print(&self, line: &str) {
        match lex_line(&self.config, line) {
            Ok(tokens) => {
                for (kind, text) in tokens {
                    println!("  {:<12} {}", kind.dimmed(), text);
                }
            }
            Err(e) => print_error(&e),
        }
    }
}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}

/// `.strict` flips the mode, `.strict on|off` sets it.
fn parse_toggle(arg: Option<&str>, current: bool) -> Option<bool> {
    match arg.map(str::to_ascii_lowercase).as_deref() {
        None => Some(!current),
        Some("on" | "true" | "1") => Some(true),
        Some("off" | "false" | "0") => Some(false),
        Some(_) => None,
    }
}

/// Tokenizes one line into `(kind, text)` pairs, end of input excluded.
fn lex_line(config: &FrontendConfig, line: &str) -> Result<Vec<(&'static str, String)>, Error> {
    let units: Vec<u16> = line.encode_utf16().collect();
    let mut scanner = config.scanner(&units);
    let tokens = scanner.by_ref().collect::<Result<Vec<_>, Error>>()?;
    let literals = scanner.into_literals();

    Ok(tokens
        .iter()
        .filter(|token| token.kind != TokenKind::Eof)
        .map(|token| (token.kind.describe(), token_text(&token.kind, &literals)))
        .collect())
}

/// Print a formatted error message
fn print_error(error: &Error) {
    let error_str = error.to_string();

    if let Some(colon_pos) = error_str.find(':') {
        let (error_type, message) = error_str.split_at(colon_pos);
        eprintln!("{}{}", error_type.red().bold(), message);
    } else {
        eprintln!("{}", error_str.red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repl_command_parse() {
        assert!(matches!(
            ReplCommand::parse(".help"),
            Some((ReplCommand::Help, None))
        ));
        assert!(matches!(
            ReplCommand::parse(".exit"),
            Some((ReplCommand::Exit, None))
        ));
        assert!(matches!(
            ReplCommand::parse(".strict off"),
            Some((ReplCommand::Strict, Some("off")))
        ));
        assert!(ReplCommand::parse(".load x.js").is_none());
        assert!(ReplCommand::parse("not a command").is_none());
    }

    #[test]
    fn test_parse_toggle() {
        assert_eq!(parse_toggle(None, false), Some(true));
        assert_eq!(parse_toggle(Some("OFF"), true), Some(false));
        assert_eq!(parse_toggle(Some("maybe"), true), None);
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("(1 + 2)"));
        assert!(is_balanced("{ a: 1 }"));
        assert!(!is_balanced("(1 + 2"));
        assert!(!is_balanced("{ a: 1"));
        assert!(is_balanced("'string with (unbalanced'"));
    }

    #[test]
    fn test_lex_line_follows_strict_setting() {
        let mut config = FrontendConfig::default();
        let tokens = lex_line(&config, "x = 010").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2], ("Number", "8".to_string()));

        config.strict = true;
        assert!(lex_line(&config, "x = 010").is_err());
    }

    #[test]
    fn test_helper_words_include_keywords_and_commands() {
        let helper = KestrelHelper::new();
        assert!(helper.words.contains(&"typeof"));
        assert!(helper.words.contains(&".strict"));
        assert!(helper.words.contains(&"null"));
    }
}
