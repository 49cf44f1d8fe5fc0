//! Property-based tests for the literal pool.
//!
//! Tests the following properties:
//! - Inserting a value twice yields the same index
//! - Every inserted value reads back unchanged
//! - Entries stay valid while the string cache relocates

use kestrel_core::buffer::GrowableBuffer;
use kestrel_core::literal::{LiteralPool, LiteralValue};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Short strings over a small alphabet, so duplicates are common.
fn arb_name() -> impl Strategy<Value = String> {
    "[a-e]{0,4}"
}

/// Finite numbers, plus a handful that tend to collide.
fn arb_number() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        Just(1.5),
        Just(-2.0),
        any::<f64>().prop_filter("must not be NaN", |f| !f.is_nan()),
    ]
}

#[derive(Debug, Clone)]
enum Entry {
    Text(String),
    Number(f64),
}

fn arb_entry() -> impl Strategy<Value = Entry> {
    prop_oneof![arb_name().prop_map(Entry::Text), arb_number().prop_map(Entry::Number)]
}

fn to_value(entry: &Entry) -> LiteralValue<'static> {
    match entry {
        Entry::Text(text) => LiteralValue::from(text.as_str()),
        Entry::Number(n) => LiteralValue::from(*n),
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_insert_is_idempotent(entries in prop::collection::vec(arb_entry(), 1..40)) {
        let mut pool = LiteralPool::with_cache_capacity(4);
        let first: Vec<_> = entries.iter().map(|e| pool.insert(to_value(e))).collect();
        let count = pool.count();

        let second: Vec<_> = entries.iter().map(|e| pool.insert(to_value(e))).collect();
        prop_assert_eq!(first, second);
        prop_assert_eq!(pool.count(), count);
    }

    #[test]
    fn prop_lookup_returns_inserted_value(entries in prop::collection::vec(arb_entry(), 1..40)) {
        let mut pool = LiteralPool::with_cache_capacity(4);
        let indices: Vec<_> = entries.iter().map(|e| pool.insert(to_value(e))).collect();

        for (entry, index) in entries.iter().zip(indices) {
            let value = pool.value(index).unwrap();
            match entry {
                Entry::Text(text) => {
                    let expected: Vec<u16> = text.encode_utf16().collect();
                    prop_assert_eq!(value.as_units(), Some(expected.as_slice()));
                }
                Entry::Number(n) => prop_assert_eq!(value.as_number(), Some(*n)),
            }
        }
    }

    #[test]
    fn prop_count_matches_distinct_values(names in prop::collection::vec(arb_name(), 0..30)) {
        let mut pool = LiteralPool::new();
        for name in &names {
            pool.insert(LiteralValue::from(name.as_str()));
        }
        let mut distinct = names.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(pool.count(), distinct.len());
    }

    #[test]
    fn prop_buffer_reads_back_appends(values in prop::collection::vec(any::<u32>(), 0..200)) {
        let mut buffer = GrowableBuffer::new();
        for (i, value) in values.iter().enumerate() {
            prop_assert_eq!(buffer.append(*value), i);
        }
        prop_assert_eq!(buffer.as_slice(), values.as_slice());
        prop_assert!(buffer.capacity() >= buffer.len());
    }
}

#[test]
fn test_strings_survive_two_cache_relocations() {
    let mut pool = LiteralPool::with_cache_capacity(8);
    let early = pool.insert(LiteralValue::from("early"));

    let mut later = Vec::new();
    for i in 0..64 {
        later.push(pool.insert(LiteralValue::from(format!("name{i}").as_str())));
    }
    assert!(pool.cache().growth_count() >= 2);

    assert_eq!(pool.to_display_string(early), "early");
    assert_eq!(pool.to_display_string(later[63]), "name63");
    assert_eq!(pool.insert(LiteralValue::from("early")), early);
}

#[test]
fn test_magic_strings_are_recognised() {
    let mut pool = LiteralPool::with_cache_capacity(0);
    let length = pool.insert(LiteralValue::from("length"));
    assert!(pool.cache().is_empty());
    assert_eq!(pool.to_display_string(length), "length");
}
