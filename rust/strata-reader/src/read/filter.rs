//! Single-column predicates evaluated during the scan (predicate pushdown).

use std::ops::Bound;

use ahash::AHashSet;

/// A predicate over the values of one column.
///
/// Readers hand each decoded value to the filter through
/// [`ColumnReader::filter_test`](crate::read::column_reader::ColumnReader::filter_test):
/// nulls go to [`test_null`](Self::test_null), everything else to
/// [`test_bytes`](Self::test_bytes).
pub trait TupleDomainFilter: Send + Sync {
    /// Whether a null value passes the filter.
    fn test_null(&self) -> bool;

    /// Whether the non-null value `value` passes the filter.
    fn test_bytes(&self, value: &[u8]) -> bool;
}

/// Passes null values only.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsNull;

impl TupleDomainFilter for IsNull {
    fn test_null(&self) -> bool {
        true
    }

    fn test_bytes(&self, _value: &[u8]) -> bool {
        false
    }
}

/// Passes non-null values only.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsNotNull;

impl TupleDomainFilter for IsNotNull {
    fn test_null(&self) -> bool {
        false
    }

    fn test_bytes(&self, _value: &[u8]) -> bool {
        true
    }
}

/// Passes values within a range, compared bytewise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesRange {
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
    null_allowed: bool,
}

impl BytesRange {
    pub fn new(lower: Bound<Vec<u8>>, upper: Bound<Vec<u8>>, null_allowed: bool) -> BytesRange {
        BytesRange {
            lower,
            upper,
            null_allowed,
        }
    }

    /// Passes exactly `value`.
    pub fn equal_to(value: impl Into<Vec<u8>>, null_allowed: bool) -> BytesRange {
        let value = value.into();
        BytesRange::new(
            Bound::Included(value.clone()),
            Bound::Included(value),
            null_allowed,
        )
    }
}

impl TupleDomainFilter for BytesRange {
    fn test_null(&self) -> bool {
        self.null_allowed
    }

    fn test_bytes(&self, value: &[u8]) -> bool {
        let above_lower = match &self.lower {
            Bound::Included(lower) => value >= lower.as_slice(),
            Bound::Excluded(lower) => value > lower.as_slice(),
            Bound::Unbounded => true,
        };
        let below_upper = match &self.upper {
            Bound::Included(upper) => value <= upper.as_slice(),
            Bound::Excluded(upper) => value < upper.as_slice(),
            Bound::Unbounded => true,
        };
        above_lower && below_upper
    }
}

/// Passes values from a fixed set.
#[derive(Debug, Clone)]
pub struct BytesValues {
    values: AHashSet<Vec<u8>>,
    null_allowed: bool,
}

impl BytesValues {
    pub fn new<I, V>(values: I, null_allowed: bool) -> BytesValues
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        BytesValues {
            values: values.into_iter().map(Into::into).collect(),
            null_allowed,
        }
    }
}

impl TupleDomainFilter for BytesValues {
    fn test_null(&self) -> bool {
        self.null_allowed
    }

    fn test_bytes(&self, value: &[u8]) -> bool {
        self.values.contains(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_filters() {
        assert!(IsNull.test_null());
        assert!(!IsNull.test_bytes(b""));
        assert!(!IsNotNull.test_null());
        assert!(IsNotNull.test_bytes(b"x"));
    }

    #[test]
    fn test_range() {
        let range = BytesRange::new(
            Bound::Included(b"b".to_vec()),
            Bound::Excluded(b"d".to_vec()),
            false,
        );
        assert!(!range.test_bytes(b"a"));
        assert!(range.test_bytes(b"b"));
        assert!(range.test_bytes(b"cz"));
        assert!(!range.test_bytes(b"d"));
        assert!(!range.test_null());

        let eq = BytesRange::equal_to("ab", true);
        assert!(eq.test_bytes(b"ab"));
        assert!(!eq.test_bytes(b"ab "));
        assert!(eq.test_null());

        let open = BytesRange::new(Bound::Unbounded, Bound::Unbounded, false);
        assert!(open.test_bytes(b""));
    }

    #[test]
    fn test_values() {
        let values = BytesValues::new(["apple", "pear"], false);
        assert!(values.test_bytes(b"pear"));
        assert!(!values.test_bytes(b"plum"));
        assert!(!values.test_null());
    }
}
