// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Recursive-descent compiler from pattern tokens to RegExp bytecode.

use tracing::debug;

use super::bytecode::{RegExpBytecode, RegExpOpcode};
use super::flags::RegExpFlags;
use super::parser::{Quantifier, RegExpParser, RegExpToken};
use super::DEFAULT_RECURSION_LIMIT;
use crate::buffer::{GrowableBuffer, Placeholder};
use crate::error::{Error, Result};
use crate::literal::EcmaChar;

/// How an alternative list ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    /// The whole pattern: must end at EOF
    Eof,
    /// A group body: must end at `)`
    Group,
}

/// Compiles one pattern.
///
/// # Example
///
/// ```
/// use kestrel_core::regexp::{RegExpCompiler, RegExpFlags};
///
/// let pattern: Vec<u16> = "(a)*".encode_utf16().collect();
/// let bytecode = RegExpCompiler::new(&pattern, RegExpFlags::empty())
///     .compile()
///     .unwrap();
/// assert_eq!(bytecode.capture_count(), 2);
/// ```
#[derive(Debug)]
pub struct RegExpCompiler<'a> {
    parser: RegExpParser<'a>,
    code: GrowableBuffer<u32>,
    flags: RegExpFlags,
    /// Next capture index; 0 is the whole match
    captures: u32,
    non_captures: u32,
    depth: usize,
    recursion_limit: usize,
}

impl<'a> RegExpCompiler<'a> {
    /// Creates a compiler for `pattern`.
    pub fn new(pattern: &'a [EcmaChar], flags: RegExpFlags) -> Self {
        Self {
            parser: RegExpParser::new(pattern),
            code: GrowableBuffer::new(),
            flags,
            captures: 1,
            non_captures: 0,
            depth: 0,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Caps group nesting. Deeper patterns fail with a RangeError.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Compiles the pattern.
    pub fn compile(mut self) -> Result<RegExpBytecode> {
        let header = [
            self.code.reserve_slot(),
            self.code.reserve_slot(),
            self.code.reserve_slot(),
        ];

        self.emit(RegExpOpcode::SaveAtStart);
        self.parse_alternatives(Terminator::Eof)?;
        self.emit(RegExpOpcode::SaveAndMatch);
        self.emit(RegExpOpcode::Eof);

        self.code.fill(header[0], self.flags.bits());
        self.code.fill(header[1], self.captures * 2);
        self.code.fill(header[2], self.non_captures);

        debug!(
            words = self.code.len(),
            captures = self.captures,
            non_captures = self.non_captures,
            "regexp compiled"
        );
        Ok(RegExpBytecode::from_words_unchecked(self.code.to_vec()))
    }

    fn emit(&mut self, opcode: RegExpOpcode) {
        self.code.append(opcode as u32);
    }

    fn emit_word(&mut self, word: u32) {
        self.code.append(word);
    }

    /// Words emitted since `slot`, not counting the slot itself.
    fn words_after(&self, slot: Placeholder) -> u32 {
        (self.code.len() - slot.index() - 1) as u32
    }

    /// Compiles `alt ( '|' alt )*` up to the terminator, returning the
    /// quantifier of a closing `)`.
    fn parse_alternatives(&mut self, terminator: Terminator) -> Result<Quantifier> {
        if self.depth >= self.recursion_limit {
            return Err(Error::range(format!(
                "RegExp nesting exceeds the limit of {}",
                self.recursion_limit
            )));
        }
        self.depth += 1;

        let mut alternative = self.code.reserve_slot();
        loop {
            let locus = self.parser.locus();
            let token = self.parser.next_token()?;
            match token {
                RegExpToken::Alternative => {
                    debug!("compile an alternative");
                    let len = self.words_after(alternative);
                    self.code.fill(alternative, len);
                    self.emit(RegExpOpcode::Alternative);
                    alternative = self.code.reserve_slot();
                }
                RegExpToken::EndGroup(quantifier) => {
                    if terminator == Terminator::Eof {
                        return Err(Error::syntax("Unmatched ')'", locus));
                    }
                    let len = self.words_after(alternative);
                    self.code.fill(alternative, len);
                    self.depth -= 1;
                    return Ok(quantifier);
                }
                RegExpToken::Eof => {
                    if terminator == Terminator::Group {
                        return Err(Error::syntax("Unterminated group", locus));
                    }
                    let len = self.words_after(alternative);
                    self.code.fill(alternative, len);
                    self.depth -= 1;
                    return Ok(Quantifier::ONCE);
                }
                RegExpToken::StartCaptureGroup => {
                    let index = self.captures;
                    self.captures += 1;
                    debug!(index, "compile a capture group");
                    self.compile_group(true, index)?;
                }
                RegExpToken::StartNonCaptureGroup => {
                    let index = self.non_captures;
                    self.non_captures += 1;
                    debug!(index, "compile a non-capture group");
                    self.compile_group(false, index)?;
                }
                RegExpToken::StartPositiveLookahead => {
                    self.compile_lookahead(RegExpOpcode::LookaheadPos, locus)?;
                }
                RegExpToken::StartNegativeLookahead => {
                    self.compile_lookahead(RegExpOpcode::LookaheadNeg, locus)?;
                }
                RegExpToken::Char(ch, quantifier) => {
                    debug!(ch, min = quantifier.min, max = quantifier.max, "compile a character");
                    self.compile_atom(quantifier, |this| {
                        this.emit(RegExpOpcode::Char);
                        this.emit_word(u32::from(ch));
                    });
                }
                RegExpToken::Period(quantifier) => {
                    debug!(min = quantifier.min, max = quantifier.max, "compile a period");
                    self.compile_atom(quantifier, |this| this.emit(RegExpOpcode::Period));
                }
                RegExpToken::Backreference(index, quantifier) => {
                    debug!(index, "compile a back-reference");
                    self.compile_atom(quantifier, |this| {
                        this.emit(RegExpOpcode::Backreference);
                        this.emit_word(index);
                    });
                }
                RegExpToken::CharClass {
                    ranges,
                    inverted,
                    quantifier,
                } => {
                    debug!(ranges = ranges.len(), inverted, "compile a character class");
                    let opcode = if inverted {
                        RegExpOpcode::InvCharClass
                    } else {
                        RegExpOpcode::CharClass
                    };
                    self.compile_atom(quantifier, |this| {
                        this.emit(opcode);
                        this.emit_word(ranges.len() as u32);
                        for (from, to) in &ranges {
                            this.emit_word(u32::from(*from));
                            this.emit_word(u32::from(*to));
                        }
                    });
                }
                RegExpToken::AssertStart => self.emit(RegExpOpcode::AssertStart),
                RegExpToken::AssertEnd => self.emit(RegExpOpcode::AssertEnd),
                RegExpToken::WordBoundary => self.emit(RegExpOpcode::AssertWordBoundary),
                RegExpToken::NotWordBoundary => self.emit(RegExpOpcode::AssertNotWordBoundary),
            }
        }
    }

    /// Emits a simple atom, wrapped in an iterator unless it occurs exactly
    /// once: `[ITERATOR, min, max, len] atom MATCH`.
    fn compile_atom(&mut self, quantifier: Quantifier, atom: impl FnOnce(&mut Self)) {
        if quantifier.is_once() {
            atom(self);
            return;
        }

        self.emit(if quantifier.greedy {
            RegExpOpcode::GreedyIterator
        } else {
            RegExpOpcode::NonGreedyIterator
        });
        self.emit_word(quantifier.min);
        self.emit_word(quantifier.max);
        let length = self.code.reserve_slot();
        atom(self);
        self.emit(RegExpOpcode::Match);
        let len = self.words_after(length);
        self.code.fill(length, len);
    }

    /// Emits `[start_op, index, skip] body [end_op, index, min, max, jump]`.
    ///
    /// The group's quantifier is only known at its `)`, so the whole start
    /// header is reserved up front.
    fn compile_group(&mut self, capturing: bool, index: u32) -> Result<()> {
        let start_op = self.code.reserve_slot();
        let start_index = self.code.reserve_slot();
        let skip = self.code.reserve_slot();
        let body_start = self.code.len();

        let quantifier = self.parse_alternatives(Terminator::Group)?;

        self.emit(RegExpOpcode::group_end(capturing, quantifier.greedy));
        self.emit_word(index);
        self.emit_word(quantifier.min);
        self.emit_word(quantifier.max);
        // Distance from the body to the end of the group, jump word included.
        let span = (self.code.len() + 1 - body_start) as u32;
        self.emit_word(span);

        let opcode = RegExpOpcode::group_start(capturing, quantifier.min, quantifier.greedy);
        self.code.fill(start_op, opcode as u32);
        self.code.fill(start_index, index);
        self.code.fill(skip, span);
        Ok(())
    }

    /// Emits `[LOOKAHEAD_*, skip] body MATCH`.
    fn compile_lookahead(&mut self, opcode: RegExpOpcode, locus: usize) -> Result<()> {
        debug!(negative = opcode == RegExpOpcode::LookaheadNeg, "compile a lookahead");
        self.emit(opcode);
        let skip = self.code.reserve_slot();

        let quantifier = self.parse_alternatives(Terminator::Group)?;
        if !quantifier.is_once() {
            return Err(Error::syntax("Lookahead assertion cannot be quantified", locus));
        }

        self.emit(RegExpOpcode::Match);
        let len = self.words_after(skip);
        self.code.fill(skip, len);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::regexp::parser::INFINITE;

    fn compile(pattern: &str) -> Result<RegExpBytecode> {
        let units: Vec<u16> = pattern.encode_utf16().collect();
        RegExpCompiler::new(&units, RegExpFlags::empty()).compile()
    }

    fn op(opcode: RegExpOpcode) -> u32 {
        opcode as u32
    }

    #[test]
    fn test_single_char() {
        let bytecode = compile("a").unwrap();
        assert_eq!(
            bytecode.words(),
            &[
                0,
                2,
                0,
                op(RegExpOpcode::SaveAtStart),
                2,
                op(RegExpOpcode::Char),
                0x61,
                op(RegExpOpcode::SaveAndMatch),
                op(RegExpOpcode::Eof),
            ]
        );
    }

    #[test]
    fn test_alternatives_have_equal_lengths() {
        let bytecode = compile("a|b").unwrap();
        let words = bytecode.words();
        // SAVE_AT_START <len> CHAR a ALTERNATIVE <len> CHAR b
        assert_eq!(words[3], op(RegExpOpcode::SaveAtStart));
        assert_eq!(words[4], 2);
        assert_eq!(words[7], op(RegExpOpcode::Alternative));
        assert_eq!(words[8], 2);
        assert_eq!(words[4], words[8]);
        assert_eq!(&words[5..7], &[op(RegExpOpcode::Char), 0x61]);
        assert_eq!(&words[9..11], &[op(RegExpOpcode::Char), 0x62]);
    }

    #[test]
    fn test_starred_capture_group() {
        let bytecode = compile("(a)*").unwrap();
        assert_eq!(bytecode.capture_count(), 2);
        assert_eq!(bytecode.words()[1], 4);

        let words = bytecode.words();
        assert_eq!(
            &words[3..],
            &[
                op(RegExpOpcode::SaveAtStart),
                11,
                op(RegExpOpcode::CaptureGreedyZeroGroupStart),
                1,
                8,
                2,
                op(RegExpOpcode::Char),
                0x61,
                op(RegExpOpcode::CaptureGreedyGroupEnd),
                1,
                0,
                INFINITE,
                8,
                op(RegExpOpcode::SaveAndMatch),
                op(RegExpOpcode::Eof),
            ]
        );
    }

    #[test]
    fn test_quantified_atom_is_wrapped() {
        let bytecode = compile("a{2,3}?").unwrap();
        assert_eq!(
            &bytecode.words()[5..12],
            &[
                op(RegExpOpcode::NonGreedyIterator),
                2,
                3,
                3,
                op(RegExpOpcode::Char),
                0x61,
                op(RegExpOpcode::Match),
            ]
        );
    }

    #[test]
    fn test_non_capture_and_lookahead() {
        let bytecode = compile("(?:a)+(?=b)").unwrap();
        assert_eq!(bytecode.capture_count(), 1);
        assert_eq!(bytecode.non_capture_count(), 1);

        let opcodes: Vec<RegExpOpcode> = bytecode
            .instructions()
            .unwrap()
            .iter()
            .map(|i| i.opcode)
            .collect();
        assert_eq!(
            opcodes,
            vec![
                RegExpOpcode::SaveAtStart,
                RegExpOpcode::NonCaptureGroupStart,
                RegExpOpcode::Char,
                RegExpOpcode::NonCaptureGreedyGroupEnd,
                RegExpOpcode::LookaheadPos,
                RegExpOpcode::Char,
                RegExpOpcode::Match,
                RegExpOpcode::SaveAndMatch,
                RegExpOpcode::Eof,
            ]
        );
    }

    #[test]
    fn test_unbalanced_parens() {
        assert_eq!(compile("a)").unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(compile("(a").unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(compile("(?=a)*").unwrap_err().kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_recursion_limit_is_range_error() {
        let units: Vec<u16> = "((((a))))".encode_utf16().collect();
        let err = RegExpCompiler::new(&units, RegExpFlags::empty())
            .with_recursion_limit(3)
            .compile()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        assert!(
            RegExpCompiler::new(&units, RegExpFlags::empty())
                .with_recursion_limit(5)
                .compile()
                .is_ok()
        );
    }

    #[test]
    fn test_output_decodes() {
        for pattern in [r"^\d+(\.\d*)?$", r"[^a-z]|\bfoo\B", r"(a)(?!b)\1", "x.y*?"] {
            let bytecode = compile(pattern).unwrap();
            let reparsed = RegExpBytecode::from_words(bytecode.words().to_vec()).unwrap();
            assert_eq!(reparsed, bytecode, "{pattern}");
        }
    }
}
