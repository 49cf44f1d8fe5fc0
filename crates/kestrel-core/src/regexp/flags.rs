// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! RegExp flags.

use std::fmt;
use std::ops::BitOr;

use crate::error::{Error, Result};

/// The `g`, `i` and `m` flags of a regular expression, as a bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegExpFlags(u8);

impl RegExpFlags {
    /// `g`
    pub const GLOBAL: RegExpFlags = RegExpFlags(1);
    /// `i`
    pub const IGNORE_CASE: RegExpFlags = RegExpFlags(2);
    /// `m`
    pub const MULTILINE: RegExpFlags = RegExpFlags(4);

    const ALL: [(RegExpFlags, char); 3] = [
        (RegExpFlags::GLOBAL, 'g'),
        (RegExpFlags::IGNORE_CASE, 'i'),
        (RegExpFlags::MULTILINE, 'm'),
    ];

    /// No flags set.
    pub const fn empty() -> Self {
        RegExpFlags(0)
    }

    /// Parses a flags string such as `"gi"`.
    ///
    /// A repeated or unknown flag is a SyntaxError.
    pub fn parse(text: &str) -> Result<Self> {
        let mut flags = RegExpFlags::empty();
        for ch in text.chars() {
            let flag = Self::ALL
                .iter()
                .find(|(_, name)| *name == ch)
                .map(|(flag, _)| *flag)
                .ok_or_else(|| Error::syntax_unpositioned(format!("Invalid RegExp flags: '{text}'")))?;
            if flags.contains(flag) {
                return Err(Error::syntax_unpositioned(format!(
                    "Invalid RegExp flags: '{text}'"
                )));
            }
            flags = flags | flag;
        }
        Ok(flags)
    }

    /// Rebuilds flags from the header word of compiled bytecode.
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits & !0b111 == 0 {
            Some(RegExpFlags(bits as u8))
        } else {
            None
        }
    }

    /// Raw bits, as stored in the bytecode header.
    pub fn bits(self) -> u32 {
        u32::from(self.0)
    }

    /// Returns true if every flag in `other` is set.
    pub fn contains(self, other: RegExpFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for RegExpFlags {
    type Output = RegExpFlags;

    fn bitor(self, rhs: RegExpFlags) -> RegExpFlags {
        RegExpFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for RegExpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in Self::ALL {
            if self.contains(flag) {
                write!(f, "{name}")?;
            }
        }
        Ok(())
    }
}
