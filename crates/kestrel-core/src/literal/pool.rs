// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The deduplicating literal table and the string cache behind it.

use std::borrow::Cow;
use std::hash::Hasher;

use rustc_hash::FxHasher;
use tracing::trace;

use super::{EcmaChar, Literal, LiteralIndex, LiteralValue, MagicString, StringRef, format_number};
use crate::buffer::GrowableBuffer;
use crate::error::{Error, Result};

/// Initial string cache size in code units.
const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Append-only arena of string literal code units.
///
/// String literals store an offset into this arena instead of a pointer, so
/// relocating the arena on growth leaves every stored literal valid.
#[derive(Debug, Clone, Default)]
pub struct StringCache {
    units: GrowableBuffer<EcmaChar>,
}

impl StringCache {
    /// Creates a cache with room for `capacity` code units.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            units: GrowableBuffer::with_capacity(capacity),
        }
    }

    /// Copies `units` into the cache and returns the reference to them.
    pub fn store(&mut self, units: &[EcmaChar]) -> StringRef {
        let offset = self.units.extend_from_slice(units);
        StringRef {
            offset: offset as u32,
            length: units.len() as u32,
            hash: hash_units(units),
        }
    }

    /// Returns the code units behind `string`.
    pub fn get(&self, string: StringRef) -> Option<&[EcmaChar]> {
        self.units.range(string.offset as usize, string.length as usize)
    }

    /// Number of code units stored.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if no string has been stored.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of times the arena has been relocated.
    pub fn growth_count(&self) -> usize {
        self.units.growth_count()
    }
}

/// Deduplicated table of the literals of one compilation unit.
#[derive(Debug, Clone)]
pub struct LiteralPool {
    literals: Vec<Literal>,
    cache: StringCache,
}

impl LiteralPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates an empty pool whose string cache starts at `capacity` units.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            literals: Vec::new(),
            cache: StringCache::with_capacity(capacity),
        }
    }

    /// Inserts `value`, returning the index of an equal entry if one exists.
    ///
    /// Strings are equal when their code units are; numbers when they compare
    /// equal as IEEE doubles (so `NaN` is never deduplicated).
    pub fn insert(&mut self, value: LiteralValue<'_>) -> LiteralIndex {
        if let Some(index) = self.lookup_by_value(&value) {
            return index;
        }

        let literal = match value {
            LiteralValue::Number(n) => Literal::Number(n),
            LiteralValue::String(units) => match MagicString::find(&units) {
                Some(magic) => Literal::Magic(magic),
                None => Literal::String(self.cache.store(&units)),
            },
        };

        let index = LiteralIndex(self.literals.len() as u32);
        self.literals.push(literal);
        trace!(%index, ?literal, "literal added");
        index
    }

    /// Returns the entry at `index`.
    pub fn lookup(&self, index: LiteralIndex) -> Result<Literal> {
        self.literals
            .get(index.as_usize())
            .copied()
            .ok_or_else(|| Error::internal(format!("literal index {index} out of range")))
    }

    /// Finds the index of an entry equal to `value`.
    pub fn lookup_by_value(&self, value: &LiteralValue<'_>) -> Option<LiteralIndex> {
        let position = match value {
            LiteralValue::Number(n) => self
                .literals
                .iter()
                .position(|literal| matches!(literal, Literal::Number(m) if m == n)),
            LiteralValue::String(units) => {
                let hash = hash_units(units);
                self.literals
                    .iter()
                    .position(|literal| self.string_matches(literal, units, hash))
            }
        }?;
        Some(LiteralIndex(position as u32))
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.literals.len()
    }

    /// Returns true if no literal has been inserted.
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Materializes the content of the entry at `index`.
    pub fn value(&self, index: LiteralIndex) -> Result<LiteralValue<'_>> {
        let literal = self.lookup(index)?;
        self.resolve(&literal)
    }

    /// Materializes the content of a literal taken from this pool.
    pub fn resolve(&self, literal: &Literal) -> Result<LiteralValue<'_>> {
        match *literal {
            Literal::Number(n) => Ok(LiteralValue::Number(n)),
            Literal::Magic(magic) => Ok(LiteralValue::String(Cow::Owned(magic.to_units()))),
            Literal::String(string) => self
                .cache
                .get(string)
                .map(LiteralValue::string)
                .ok_or_else(|| Error::internal("string literal outside of cache")),
        }
    }

    /// Returns the code units of a string entry.
    pub fn string_units(&self, index: LiteralIndex) -> Result<Cow<'_, [EcmaChar]>> {
        match self.value(index)? {
            LiteralValue::String(units) => Ok(units),
            LiteralValue::Number(_) => Err(Error::internal(format!("literal {index} is not a string"))),
        }
    }

    /// Renders the entry at `index` for diagnostics.
    pub fn to_display_string(&self, index: LiteralIndex) -> String {
        match self.value(index) {
            Ok(LiteralValue::String(units)) => String::from_utf16_lossy(&units),
            Ok(LiteralValue::Number(n)) => format_number(n),
            Err(_) => format!("<invalid {index}>"),
        }
    }

    /// Iterates over `(index, literal)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (LiteralIndex, &Literal)> {
        self.literals
            .iter()
            .enumerate()
            .map(|(i, literal)| (LiteralIndex(i as u32), literal))
    }

    /// The string cache backing this pool.
    pub fn cache(&self) -> &StringCache {
        &self.cache
    }

    fn string_matches(&self, literal: &Literal, units: &[EcmaChar], hash: u32) -> bool {
        match *literal {
            Literal::Magic(magic) => {
                let text = magic.as_str();
                text.len() == units.len()
                    && text.bytes().zip(units).all(|(b, &u)| u16::from(b) == u)
            }
            Literal::String(string) => {
                string.length as usize == units.len()
                    && string.hash == hash
                    && self.cache.get(string) == Some(units)
            }
            Literal::Number(_) => false,
        }
    }
}

impl Default for LiteralPool {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_units(units: &[EcmaChar]) -> u32 {
    let mut hasher = FxHasher::default();
    for &unit in units {
        hasher.write_u16(unit);
    }
    hasher.finish() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(text: &str) -> Vec<u16> {
        text.encode_utf16().collect()
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut pool = LiteralPool::new();
        let a = pool.insert(LiteralValue::from("alpha"));
        let b = pool.insert(LiteralValue::from("beta"));
        let n = pool.insert(LiteralValue::from(3.5));

        assert_eq!(pool.insert(LiteralValue::from("alpha")), a);
        assert_eq!(pool.insert(LiteralValue::from(3.5)), n);
        assert_ne!(a, b);
        assert_eq!(pool.count(), 3);
    }

    #[test]
    fn test_string_and_number_never_collide() {
        let mut pool = LiteralPool::new();
        let s = pool.insert(LiteralValue::from("1"));
        let n = pool.insert(LiteralValue::from(1.0));
        assert_ne!(s, n);
    }

    #[test]
    fn test_magic_strings_use_no_cache_space() {
        let mut pool = LiteralPool::new();
        let index = pool.insert(LiteralValue::from("length"));
        assert_eq!(pool.lookup(index).unwrap(), Literal::Magic(MagicString::Length));
        assert!(pool.cache().is_empty());

        let empty = pool.insert(LiteralValue::from(""));
        assert_eq!(pool.lookup(empty).unwrap(), Literal::Magic(MagicString::Empty));
    }

    #[test]
    fn test_nan_is_not_deduplicated() {
        let mut pool = LiteralPool::new();
        let a = pool.insert(LiteralValue::from(f64::NAN));
        let b = pool.insert(LiteralValue::from(f64::NAN));
        assert_ne!(a, b);
    }

    #[test]
    fn test_lookup_out_of_range() {
        let pool = LiteralPool::new();
        assert!(pool.lookup(LiteralIndex(0)).is_err());
        assert!(pool.lookup_by_value(&LiteralValue::from("x")).is_none());
    }

    #[test]
    fn test_literals_survive_cache_growth() {
        let mut pool = LiteralPool::with_cache_capacity(4);
        let words: Vec<String> = (0..64).map(|i| format!("identifier_{i}")).collect();

        let inserted: Vec<(LiteralIndex, Literal)> = words
            .iter()
            .map(|word| {
                let index = pool.insert(LiteralValue::string(&units(word)));
                (index, pool.lookup(index).unwrap())
            })
            .collect();

        assert!(pool.cache().growth_count() >= 2);
        for ((index, literal), word) in inserted.iter().zip(&words) {
            assert_eq!(pool.resolve(literal).unwrap(), LiteralValue::string(&units(word)));
            assert_eq!(pool.to_display_string(*index), *word);
        }
    }

    #[test]
    fn test_string_units_rejects_numbers() {
        let mut pool = LiteralPool::new();
        let n = pool.insert(LiteralValue::from(2.0));
        assert!(pool.string_units(n).is_err());
        assert_eq!(pool.to_display_string(n), "2");
    }
}
