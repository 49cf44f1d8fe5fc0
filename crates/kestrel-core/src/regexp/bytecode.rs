// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compiled regular expressions.
//!
//! # Layout
//!
//! ```text
//! word 0      flags
//! word 1      capture slot count (2 per group, group 0 included)
//! word 2      non-capture group count
//! word 3..    SAVE_AT_START <alt_len> ... SAVE_AND_MATCH EOF
//! ```
//!
//! Every alternative is preceded by its length in words. Operands follow
//! their opcode in the word stream.

use std::fmt::Write;

use super::flags::RegExpFlags;
use super::parser::INFINITE;
use crate::error::{Error, Result};

/// Number of header words before the first opcode.
pub const HEADER_WORDS: usize = 3;

macro_rules! regexp_opcodes {
    ($( $variant:ident = $value:literal, $name:literal, $operands:literal; )*) => {
        /// RegExp bytecode operations.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum RegExpOpcode {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant = $value,
            )*
        }

        impl RegExpOpcode {
            /// Decodes an opcode word.
            pub fn from_u32(word: u32) -> Option<Self> {
                match word {
                    $($value => Some(RegExpOpcode::$variant),)*
                    _ => None,
                }
            }

            /// Mnemonic used in disassembly.
            pub fn name(self) -> &'static str {
                match self {
                    $(RegExpOpcode::$variant => $name,)*
                }
            }

            /// Fixed operand words. Character classes carry a further
            /// `2 * count` range words.
            pub fn operand_count(self) -> usize {
                match self {
                    $(RegExpOpcode::$variant => $operands,)*
                }
            }
        }
    };
}

regexp_opcodes! {
    Eof = 0, "EOF", 0;
    Match = 1, "MATCH", 0;
    Char = 2, "CHAR", 1;
    SaveAtStart = 3, "SAVE_AT_START", 1;
    SaveAndMatch = 4, "SAVE_AND_MATCH", 0;
    Period = 5, "PERIOD", 0;
    Alternative = 6, "ALTERNATIVE", 1;
    GreedyIterator = 7, "GREEDY_ITERATOR", 3;
    NonGreedyIterator = 8, "NON_GREEDY_ITERATOR", 3;
    CaptureGroupStart = 9, "CAPTURE_GROUP_START", 3;
    CaptureGreedyZeroGroupStart = 10, "CAPTURE_GREEDY_ZERO_GROUP_START", 3;
    CaptureNonGreedyZeroGroupStart = 11, "CAPTURE_NON_GREEDY_ZERO_GROUP_START", 3;
    CaptureGreedyGroupEnd = 12, "CAPTURE_GREEDY_GROUP_END", 4;
    CaptureNonGreedyGroupEnd = 13, "CAPTURE_NON_GREEDY_GROUP_END", 4;
    NonCaptureGroupStart = 14, "NON_CAPTURE_GROUP_START", 3;
    NonCaptureGreedyZeroGroupStart = 15, "NON_CAPTURE_GREEDY_ZERO_GROUP_START", 3;
    NonCaptureNonGreedyZeroGroupStart = 16, "NON_CAPTURE_NON_GREEDY_ZERO_GROUP_START", 3;
    NonCaptureGreedyGroupEnd = 17, "NON_CAPTURE_GREEDY_GROUP_END", 4;
    NonCaptureNonGreedyGroupEnd = 18, "NON_CAPTURE_NON_GREEDY_GROUP_END", 4;
    AssertStart = 19, "ASSERT_START", 0;
    AssertEnd = 20, "ASSERT_END", 0;
    AssertWordBoundary = 21, "ASSERT_WORD_BOUNDARY", 0;
    AssertNotWordBoundary = 22, "ASSERT_NOT_WORD_BOUNDARY", 0;
    LookaheadPos = 23, "LOOKAHEAD_POS", 2;
    LookaheadNeg = 24, "LOOKAHEAD_NEG", 2;
    Backreference = 25, "BACKREFERENCE", 1;
    CharClass = 26, "CHAR_CLASS", 1;
    InvCharClass = 27, "INV_CHAR_CLASS", 1;
}

impl RegExpOpcode {
    /// Group start opcode for the given shape.
    pub fn group_start(capturing: bool, min: u32, greedy: bool) -> Self {
        match (capturing, min == 0, greedy) {
            (true, false, _) => RegExpOpcode::CaptureGroupStart,
            (true, true, true) => RegExpOpcode::CaptureGreedyZeroGroupStart,
            (true, true, false) => RegExpOpcode::CaptureNonGreedyZeroGroupStart,
            (false, false, _) => RegExpOpcode::NonCaptureGroupStart,
            (false, true, true) => RegExpOpcode::NonCaptureGreedyZeroGroupStart,
            (false, true, false) => RegExpOpcode::NonCaptureNonGreedyZeroGroupStart,
        }
    }

    /// Group end opcode for the given shape.
    pub fn group_end(capturing: bool, greedy: bool) -> Self {
        match (capturing, greedy) {
            (true, true) => RegExpOpcode::CaptureGreedyGroupEnd,
            (true, false) => RegExpOpcode::CaptureNonGreedyGroupEnd,
            (false, true) => RegExpOpcode::NonCaptureGreedyGroupEnd,
            (false, false) => RegExpOpcode::NonCaptureNonGreedyGroupEnd,
        }
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Word offset of the opcode
    pub offset: usize,
    /// The operation
    pub opcode: RegExpOpcode,
    /// Operand words following the opcode
    pub operands: &'a [u32],
}

/// A compiled regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegExpBytecode {
    words: Vec<u32>,
}

impl RegExpBytecode {
    /// Wraps a word stream, checking the header and instruction structure.
    pub fn from_words(words: Vec<u32>) -> Result<Self> {
        if words.len() < HEADER_WORDS {
            return Err(Error::bytecode("regexp bytecode is missing its header"));
        }
        if RegExpFlags::from_bits(words[0]).is_none() {
            return Err(Error::bytecode(format!("unknown regexp flags {:#x}", words[0])));
        }
        let bytecode = Self { words };
        bytecode.instructions()?;
        Ok(bytecode)
    }

    pub(crate) fn from_words_unchecked(words: Vec<u32>) -> Self {
        Self { words }
    }

    /// Raw word stream, header included.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Flags the pattern was compiled with.
    pub fn flags(&self) -> RegExpFlags {
        RegExpFlags::from_bits(self.words[0]).unwrap_or_default()
    }

    /// Capture slots: a start and an end per group, group 0 included.
    pub fn capture_slot_count(&self) -> u32 {
        self.words[1]
    }

    /// Capture groups, group 0 included.
    pub fn capture_count(&self) -> u32 {
        self.words[1] / 2
    }

    /// Number of `(?:...)` groups.
    pub fn non_capture_count(&self) -> u32 {
        self.words[2]
    }

    /// Decodes the opcode stream after the header, up to and including `EOF`.
    pub fn instructions(&self) -> Result<Vec<Instruction<'_>>> {
        let mut out = Vec::new();
        let mut offset = HEADER_WORDS;
        loop {
            let word = *self
                .words
                .get(offset)
                .ok_or_else(|| Error::bytecode("regexp bytecode ends without EOF"))?;
            let opcode = RegExpOpcode::from_u32(word).ok_or_else(|| {
                Error::bytecode(format!("unknown regexp opcode {word} at word {offset}"))
            })?;

            let mut count = opcode.operand_count();
            if matches!(opcode, RegExpOpcode::CharClass | RegExpOpcode::InvCharClass) {
                let ranges = self.words.get(offset + 1).copied().unwrap_or(0) as usize;
                count += ranges * 2;
            }
            let operands = self
                .words
                .get(offset + 1..offset + 1 + count)
                .ok_or_else(|| Error::bytecode(format!("truncated {} at word {offset}", opcode.name())))?;

            out.push(Instruction {
                offset,
                opcode,
                operands,
            });
            offset += 1 + count;

            if opcode == RegExpOpcode::Eof {
                if offset != self.words.len() {
                    return Err(Error::bytecode("trailing words after regexp EOF"));
                }
                return Ok(out);
            }
        }
    }

    /// Human readable listing of the header and every instruction.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "; flags: /{}/  capture slots: {}  non-capture groups: {}",
            self.flags(),
            self.capture_slot_count(),
            self.non_capture_count()
        );

        let instructions = match self.instructions() {
            Ok(instructions) => instructions,
            Err(err) => {
                let _ = writeln!(out, "; {err}");
                return out;
            }
        };

        for instruction in instructions {
            let _ = write!(out, "{:5}  {}", instruction.offset, instruction.opcode.name());
            match instruction.opcode {
                RegExpOpcode::Char => {
                    let _ = write!(out, " {}", format_unit(instruction.operands[0]));
                }
                RegExpOpcode::CharClass | RegExpOpcode::InvCharClass => {
                    for range in instruction.operands[1..].chunks(2) {
                        let _ = write!(
                            out,
                            " {}-{}",
                            format_unit(range[0]),
                            format_unit(range[1])
                        );
                    }
                }
                _ => {
                    for operand in instruction.operands {
                        if *operand == INFINITE {
                            out.push_str(" inf");
                        } else {
                            let _ = write!(out, " {operand}");
                        }
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

fn format_unit(unit: u32) -> String {
    match char::from_u32(unit) {
        Some(ch) if ch.is_ascii_graphic() => format!("'{ch}'"),
        _ => format!("\\u{unit:04X}"),
    }
}
