//! Decoded block of variable-length byte values.

use crate::{offsets::Offsets, presence::Presence};

/// An immutable sequence of byte-string values with a null mask.
///
/// Value `i` occupies `values[offsets[i]..offsets[i + 1]]`. Null values occupy
/// an empty range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesSequence {
    values: Vec<u8>,
    offsets: Offsets,
    presence: Presence,
}

impl BytesSequence {
    /// Assembles a sequence from its parts.
    ///
    /// # Panics
    ///
    /// Panics if the offsets and the presence disagree on the number of values, or
    /// if the offsets reach past the end of `values`.
    pub fn new(values: Vec<u8>, offsets: Offsets, presence: Presence) -> BytesSequence {
        assert_eq!(offsets.item_count(), presence.len());
        assert!(offsets.last() as usize <= values.len());
        BytesSequence {
            values,
            offsets,
            presence,
        }
    }

    /// Creates a sequence of `len` null values.
    pub fn nulls(len: usize) -> BytesSequence {
        BytesSequence {
            values: Vec::new(),
            offsets: Offsets::from_lengths(std::iter::repeat_n(0, len)),
            presence: Presence::Nulls(len),
        }
    }

    pub fn len(&self) -> usize {
        self.presence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.presence.is_null(index)
    }

    /// Returns the value at `index`, or `None` if it is null.
    pub fn value(&self, index: usize) -> Option<&[u8]> {
        if self.presence.is_null(index) {
            None
        } else {
            Some(&self.values[self.offsets.range_at(index)])
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&[u8]>> + '_ {
        (0..self.len()).map(|i| self.value(i))
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn offsets(&self) -> &Offsets {
        &self.offsets
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    /// Heap bytes held by this sequence.
    pub fn retained_size_in_bytes(&self) -> usize {
        self.values.capacity()
            + self.offsets.retained_size_in_bytes()
            + self.presence.retained_size_in_bytes()
    }
}

/// Incremental builder for [`BytesSequence`].
#[derive(Debug, Default)]
pub struct BytesSequenceBuilder {
    values: Vec<u8>,
    offsets: Offsets,
    is_null: Vec<bool>,
}

impl BytesSequenceBuilder {
    pub fn with_capacity(items: usize, bytes: usize) -> BytesSequenceBuilder {
        BytesSequenceBuilder {
            values: Vec::with_capacity(bytes),
            offsets: Offsets::with_capacity(items),
            is_null: Vec::with_capacity(items),
        }
    }

    pub fn push_value(&mut self, value: &[u8]) {
        self.values.extend_from_slice(value);
        self.offsets.push_length(value.len());
        self.is_null.push(false);
    }

    pub fn push_null(&mut self) {
        self.offsets.push_length(0);
        self.is_null.push(true);
    }

    pub fn push(&mut self, value: Option<&[u8]>) {
        match value {
            Some(value) => self.push_value(value),
            None => self.push_null(),
        }
    }

    pub fn len(&self) -> usize {
        self.is_null.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_null.is_empty()
    }

    pub fn build(self) -> BytesSequence {
        BytesSequence::new(
            self.values,
            self.offsets,
            Presence::from_null_flags(&self.is_null),
        )
    }
}

impl<'a> FromIterator<Option<&'a [u8]>> for BytesSequence {
    fn from_iter<T: IntoIterator<Item = Option<&'a [u8]>>>(iter: T) -> Self {
        let mut builder = BytesSequenceBuilder::default();
        iter.into_iter().for_each(|value| builder.push(value));
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let mut builder = BytesSequenceBuilder::with_capacity(3, 8);
        builder.push_value(b"abc");
        builder.push_null();
        builder.push_value(b"");
        assert_eq!(builder.len(), 3);

        let seq = builder.build();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.value(0), Some(&b"abc"[..]));
        assert_eq!(seq.value(1), None);
        assert_eq!(seq.value(2), Some(&b""[..]));
        assert_eq!(seq.presence().count_nulls(), 1);
        assert_eq!(
            seq.iter().collect::<Vec<_>>(),
            vec![Some(&b"abc"[..]), None, Some(&b""[..])]
        );
    }

    #[test]
    fn test_nulls() {
        let seq = BytesSequence::nulls(4);
        assert_eq!(seq.len(), 4);
        assert!(seq.iter().all(|v| v.is_none()));
        assert!(seq.presence().is_trivial_all_null());
    }

    #[test]
    fn test_from_iter_equals_builder() {
        let seq: BytesSequence = [Some(&b"x"[..]), Some(&b"yz"[..])].into_iter().collect();
        assert!(seq.presence().is_trivial_non_null());
        assert_eq!(seq.values(), b"xyz");
        assert_eq!(seq.offsets().as_slice(), &[0, 1, 3]);
    }

    #[test]
    #[should_panic]
    fn test_new_rejects_mismatched_parts() {
        BytesSequence::new(b"ab".to_vec(), Offsets::from_lengths([1, 1]), Presence::Trivial(3));
    }
}
