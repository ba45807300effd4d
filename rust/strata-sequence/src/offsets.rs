//! A collection of offsets for variable-length data.

use std::ops::Range;

/// A collection of offsets for variable-length data.
///
/// Stores a sequence of monotonically non-decreasing offsets, where each pair of
/// adjacent offsets defines the range of a single item. The first offset is
/// always included, representing the start position of the first item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offsets(Vec<u64>);

impl Offsets {
    /// Creates a new empty `Offsets` collection with a single offset at position 0.
    pub fn new() -> Offsets {
        Self::with_capacity(0)
    }

    /// Creates a new `Offsets` collection with space reserved for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Offsets {
        let mut offsets = Vec::with_capacity(capacity + 1);
        offsets.push(0);
        Offsets(offsets)
    }

    /// Builds offsets from per-item lengths.
    pub fn from_lengths(lengths: impl IntoIterator<Item = usize>) -> Offsets {
        let lengths = lengths.into_iter();
        let mut offsets = Offsets::with_capacity(lengths.size_hint().0);
        lengths.for_each(|len| offsets.push_length(len));
        offsets
    }

    /// Returns the number of items represented by these offsets.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.0.len() - 1
    }

    /// Returns `true` if the collection contains no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Returns a reference to the underlying slice of offsets.
    #[inline]
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Returns the last offset, which marks the end of the last item.
    #[inline]
    pub fn last(&self) -> u64 {
        self.0[self.0.len() - 1]
    }

    /// Returns a range at a given logical index.
    #[inline]
    pub fn range_at(&self, index: usize) -> Range<usize> {
        self.0[index] as usize..self.0[index + 1] as usize
    }

    /// Adds a new offset by incrementing the last offset by the given length.
    #[inline]
    pub fn push_length(&mut self, len: usize) {
        let last = self.last();
        self.0.push(last + len as u64);
    }

    /// Heap bytes held by this collection.
    pub fn retained_size_in_bytes(&self) -> usize {
        self.0.capacity() * std::mem::size_of::<u64>()
    }
}

impl Default for Offsets {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lengths() {
        let offsets = Offsets::from_lengths([3, 0, 2]);
        assert_eq!(offsets.as_slice(), &[0, 3, 3, 5]);
        assert_eq!(offsets.item_count(), 3);
        assert_eq!(offsets.range_at(0), 0..3);
        assert_eq!(offsets.range_at(1), 3..3);
        assert_eq!(offsets.range_at(2), 3..5);
        assert_eq!(offsets.last(), 5);
    }

    #[test]
    fn test_empty() {
        let offsets = Offsets::new();
        assert!(offsets.is_empty());
        assert_eq!(offsets.last(), 0);
    }
}
