//! Packed dynamic array of 128-bit identifiers.
//!
//! [`SlugIdArray`] stores identifiers as consecutive 16-byte slots in one
//! contiguous buffer: `length` live slots followed by `avail` unused ones,
//! with `buffer.len() == (length + avail) * 16` at all times. Capacity
//! doubles when full and is repacked down when the live region becomes
//! sparse, never below the 32-slot floor. Iteration order is insertion
//! order.

use super::SlugId;
use crate::constants::{INITIAL_SLOTS, SLUG_SIZE};
use crate::errors::{CodecError, Result};
use std::fmt;

/// Packed array of [`SlugId`] values with amortized growth.
///
/// Not internally synchronized; callers own mutation exclusivity. The view
/// returned by [`as_bytes`](Self::as_bytes) is valid until the next
/// mutating operation.
#[derive(Clone)]
pub struct SlugIdArray {
    buffer: Vec<u8>,
    length: usize,
    avail: usize,
}

impl SlugIdArray {
    /// Create an empty array with the initial 32-slot capacity.
    pub fn new() -> Self {
        Self {
            buffer: vec![0; INITIAL_SLOTS * SLUG_SIZE],
            length: 0,
            avail: INITIAL_SLOTS,
        }
    }

    /// Adopt `raw` as the backing store, all slots live.
    ///
    /// Rejects buffers whose size is not a multiple of 16.
    pub fn from_buffer(raw: Vec<u8>) -> Result<Self> {
        if raw.len() % SLUG_SIZE != 0 {
            return Err(CodecError::FormatInvalid {
                type_name: "slugid array",
                property: format!("{} bytes", raw.len()),
                message: format!("packed buffer size must be a multiple of {SLUG_SIZE}"),
            });
        }
        let length = raw.len() / SLUG_SIZE;
        Ok(Self {
            buffer: raw,
            length,
            avail: 0,
        })
    }

    /// Number of live identifiers.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true when no identifiers are stored.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Total slot capacity (live plus unused).
    pub fn capacity(&self) -> usize {
        self.length + self.avail
    }

    /// Borrow the live region: `length * 16` packed bytes.
    ///
    /// The view is invalidated by the next mutating operation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.length * SLUG_SIZE]
    }

    /// Append an identifier, growing the buffer if needed.
    pub fn push(&mut self, slug: SlugId) {
        if self.avail == 0 {
            self.grow();
        }
        let at = self.length * SLUG_SIZE;
        self.buffer[at..at + SLUG_SIZE].copy_from_slice(slug.as_bytes());
        self.length += 1;
        self.avail -= 1;
    }

    /// Remove and return the last identifier.
    pub fn pop(&mut self) -> Option<SlugId> {
        if self.length == 0 {
            return None;
        }
        let slug = self.slot(self.length - 1);
        self.length -= 1;
        self.avail += 1;
        self.shrink_if_sparse();
        Some(slug)
    }

    /// Remove and return the first identifier, sliding the rest down.
    pub fn shift(&mut self) -> Option<SlugId> {
        if self.length == 0 {
            return None;
        }
        let slug = self.slot(0);
        let live_end = self.length * SLUG_SIZE;
        // Move exactly (length - 1) * 16 bytes; trailing stale bytes are
        // never observed because reads are bounded by `length`.
        self.buffer.copy_within(SLUG_SIZE..live_end, 0);
        self.length -= 1;
        self.avail += 1;
        self.shrink_if_sparse();
        Some(slug)
    }

    /// Index of the first occurrence of `slug`, scanning in slot order.
    ///
    /// A byte-level match at a misaligned offset is skipped and the scan
    /// resumes one byte later.
    pub fn index_of(&self, slug: &SlugId) -> Option<usize> {
        let live = self.as_bytes();
        let needle: &[u8] = slug.as_bytes();
        let mut from = 0;
        while let Some(found) = find_subslice(&live[from..], needle) {
            let at = from + found;
            if at % SLUG_SIZE == 0 {
                return Some(at / SLUG_SIZE);
            }
            from = at + 1;
        }
        None
    }

    /// Returns true if `slug` is present.
    pub fn contains(&self, slug: &SlugId) -> bool {
        self.index_of(slug).is_some()
    }

    /// Remove the first occurrence of `slug`; returns whether one was
    /// removed.
    pub fn remove(&mut self, slug: &SlugId) -> bool {
        match self.index_of(slug) {
            Some(index) => {
                let start = index * SLUG_SIZE;
                let live_end = self.length * SLUG_SIZE;
                self.buffer.copy_within(start + SLUG_SIZE..live_end, start);
                self.length -= 1;
                self.avail += 1;
                self.shrink_if_sparse();
                true
            }
            None => false,
        }
    }

    /// Copy out the subrange `[begin, end)` with Python-style negative
    /// indices. `None` for `end` means the full tail.
    pub fn slice(&self, begin: i64, end: Option<i64>) -> Vec<SlugId> {
        let len = self.length as i64;
        let begin = if begin < 0 { len + begin } else { begin }.clamp(0, len);
        let end = match end {
            Some(e) if e < 0 => len + e,
            Some(e) => e,
            None => len,
        }
        .clamp(0, len);
        if begin >= end {
            return Vec::new();
        }
        (begin as usize..end as usize).map(|i| self.slot(i)).collect()
    }

    /// Copy out all identifiers in insertion order.
    pub fn to_vec(&self) -> Vec<SlugId> {
        (0..self.length).map(|i| self.slot(i)).collect()
    }

    /// Iterate over identifiers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = SlugId> + '_ {
        (0..self.length).map(|i| self.slot(i))
    }

    fn slot(&self, index: usize) -> SlugId {
        let at = index * SLUG_SIZE;
        let mut raw = [0u8; SLUG_SIZE];
        raw.copy_from_slice(&self.buffer[at..at + SLUG_SIZE]);
        SlugId::from_bytes(raw)
    }

    fn grow(&mut self) {
        let capacity = self.capacity();
        let new_capacity = (capacity * 2).max(INITIAL_SLOTS);
        self.buffer.resize(new_capacity * SLUG_SIZE, 0);
        self.avail = new_capacity - self.length;
    }

    /// Repack into a smaller buffer once the live region is outnumbered
    /// two-to-one by free slots, respecting the 32-slot floor.
    fn shrink_if_sparse(&mut self) {
        if self.avail > 2 * self.length && self.capacity() > INITIAL_SLOTS {
            let new_capacity = self.length.max(INITIAL_SLOTS);
            let mut fresh = vec![0u8; new_capacity * SLUG_SIZE];
            fresh[..self.length * SLUG_SIZE].copy_from_slice(self.as_bytes());
            self.buffer = fresh;
            self.avail = new_capacity - self.length;
        }
    }
}

impl Default for SlugIdArray {
    fn default() -> Self {
        Self::new()
    }
}

/// Equality is byte-exact over the live regions only.
impl PartialEq for SlugIdArray {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for SlugIdArray {}

impl fmt::Debug for SlugIdArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlugIdArray")
            .field("length", &self.length)
            .field("avail", &self.avail)
            .finish()
    }
}

impl FromIterator<SlugId> for SlugIdArray {
    fn from_iter<I: IntoIterator<Item = SlugId>>(iter: I) -> Self {
        let mut array = Self::new();
        for slug in iter {
            array.push(slug);
        }
        array
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
