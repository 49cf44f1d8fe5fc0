// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Append-only storage with geometric growth.
//!
//! [`GrowableBuffer`] backs the literal pool's string cache and the regexp
//! bytecode stream. Elements are addressed by integer handle, never by
//! reference, so a relocation during [`GrowableBuffer::append`] cannot leave a
//! holder pointing at released storage.
//!
//! # Memory Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ [e0][e1][e2] ... [e(len-1)] [0][0] ... [0]   │
//! │                             ↑              ↑ │
//! │                             len     capacity │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The tail past `len` always holds `T::default()`.

use tracing::trace;

/// Smallest block allocated on first growth.
const MIN_BLOCK: usize = 16;

/// Handle to a slot reserved for a value that is not known yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder {
    index: usize,
}

impl Placeholder {
    /// Returns the offset of the reserved slot.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// An append-only vector with explicit capacity management.
#[derive(Debug, Clone)]
pub struct GrowableBuffer<T: Copy + Default> {
    /// Backing block, always fully initialized
    block: Vec<T>,
    /// Number of live elements
    len: usize,
    /// Number of reallocations performed
    growths: usize,
}

impl<T: Copy + Default> GrowableBuffer<T> {
    /// Creates an empty buffer without allocating.
    pub fn new() -> Self {
        Self {
            block: Vec::new(),
            len: 0,
            growths: 0,
        }
    }

    /// Creates an empty buffer with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            block: vec![T::default(); capacity],
            len: 0,
            growths: 0,
        }
    }

    /// Creates a buffer holding a copy of `data`.
    pub fn from_slice(data: &[T]) -> Self {
        let mut buffer = Self::with_capacity(recommended_size(data.len()));
        buffer.block[..data.len()].copy_from_slice(data);
        buffer.len = data.len();
        buffer
    }

    /// Appends an element and returns its handle.
    ///
    /// Storage may be relocated; earlier slices obtained from
    /// [`as_slice`](Self::as_slice) must not be held across this call.
    #[inline]
    pub fn append(&mut self, element: T) -> usize {
        self.ensure_capacity(self.len + 1);
        let index = self.len;
        self.block[index] = element;
        self.len += 1;
        index
    }

    /// Appends every element of `data`, returning the handle of the first.
    pub fn extend_from_slice(&mut self, data: &[T]) -> usize {
        self.ensure_capacity(self.len + data.len());
        let start = self.len;
        self.block[start..start + data.len()].copy_from_slice(data);
        self.len += data.len();
        start
    }

    /// Returns the element at `index`, or `None` past the end.
    #[inline]
    pub fn element(&self, index: usize) -> Option<T> {
        if index < self.len {
            Some(self.block[index])
        } else {
            None
        }
    }

    /// Replaces the element at `index`.
    ///
    /// Returns `false` if `index` is past the end.
    pub fn set_element(&mut self, index: usize, value: T) -> bool {
        if index < self.len {
            self.block[index] = value;
            true
        } else {
            false
        }
    }

    /// Returns the last element.
    pub fn last_element(&self) -> Option<T> {
        self.len.checked_sub(1).map(|index| self.block[index])
    }

    /// Replaces the last element. Returns `false` on an empty buffer.
    pub fn set_last_element(&mut self, value: T) -> bool {
        match self.len.checked_sub(1) {
            Some(index) => {
                self.block[index] = value;
                true
            }
            None => false,
        }
    }

    /// Removes the last element. Capacity is kept.
    pub fn drop_last(&mut self) -> Option<T> {
        let index = self.len.checked_sub(1)?;
        let value = self.block[index];
        self.block[index] = T::default();
        self.len = index;
        Some(value)
    }

    /// Appends a default sentinel to be overwritten by [`fill`](Self::fill).
    pub fn reserve_slot(&mut self) -> Placeholder {
        Placeholder {
            index: self.append(T::default()),
        }
    }

    /// Writes the final value into a reserved slot.
    pub fn fill(&mut self, placeholder: Placeholder, value: T) {
        // Slots are never removed below a placeholder while it is outstanding.
        debug_assert!(placeholder.index < self.len);
        self.block[placeholder.index] = value;
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no element has been appended.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current block can hold.
    pub fn capacity(&self) -> usize {
        self.block.len()
    }

    /// Number of reallocations performed so far.
    pub fn growth_count(&self) -> usize {
        self.growths
    }

    /// Live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.block[..self.len]
    }

    /// Live elements in `start..start + len`, if in bounds.
    pub fn range(&self, start: usize, len: usize) -> Option<&[T]> {
        let end = start.checked_add(len)?;
        if end <= self.len {
            Some(&self.block[start..end])
        } else {
            None
        }
    }

    /// Copies the live elements into a fresh vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    /// Releases the backing block.
    pub fn free(&mut self) {
        self.block = Vec::new();
        self.len = 0;
        self.growths = 0;
    }

    fn ensure_capacity(&mut self, required: usize) {
        if required <= self.block.len() {
            return;
        }

        let new_size = recommended_size(required);
        let mut block = vec![T::default(); new_size];
        block[..self.len].copy_from_slice(&self.block[..self.len]);
        // The old block is released when it goes out of scope here.
        self.block = block;
        self.growths += 1;

        trace!(new_size, live = self.len, "buffer grown");
    }
}

impl<T: Copy + Default> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Recommended block size for at least `required` elements.
fn recommended_size(required: usize) -> usize {
    required.max(MIN_BLOCK).next_power_of_two()
}
