//! A byte buffer used to encode validity for the values in a sequence.

/// A byte buffer used to encode validity for the values in a sequence.
///
/// This enum provides three different storage methods for tracking null/non-null values:
/// - `Trivial`: All values are valid (non-null) - most memory efficient for non-null data
/// - `Nulls`: All values are null - memory efficient for all-null data
/// - `Bytes`: Mixed null/non-null values using a byte array (1=present, 0=null)
#[derive(Debug, Clone)]
pub enum Presence {
    /// All values are valid (present).
    Trivial(usize),

    /// All values are null.
    Nulls(usize),

    /// Presence encoded as byte array, where a byte at position `i` indicates whether
    /// the value at position `i` is valid or not (`1` - value is present, `0` - value
    /// is null).
    Bytes(Vec<u8>),
}

impl Presence {
    /// Builds the most compact presence for the given null flags.
    pub fn from_null_flags(is_null: &[bool]) -> Presence {
        if is_null.iter().all(|&null| !null) {
            Presence::Trivial(is_null.len())
        } else if is_null.iter().all(|&null| null) {
            Presence::Nulls(is_null.len())
        } else {
            Presence::Bytes(is_null.iter().map(|&null| (!null) as u8).collect())
        }
    }

    /// Returns the number of values in this presence.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Trivial(len) => *len,
            Self::Nulls(len) => *len,
            Self::Bytes(presence) => presence.len(),
        }
    }

    /// Returns `true` if the length is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of null values in this `Presence`.
    pub fn count_nulls(&self) -> usize {
        match self {
            Self::Trivial(_) => 0,
            Self::Nulls(len) => *len,
            Self::Bytes(presence) => presence.iter().filter(|&&b| b == 0).count(),
        }
    }

    /// Returns the number of non-null values in this `Presence`.
    pub fn count_non_nulls(&self) -> usize {
        self.len() - self.count_nulls()
    }

    /// Returns `true` if all values are present (non-null).
    #[inline]
    pub fn is_trivial_non_null(&self) -> bool {
        matches!(self, Self::Trivial(_))
    }

    /// Returns `true` if all values are null.
    #[inline]
    pub fn is_trivial_all_null(&self) -> bool {
        matches!(self, Self::Nulls(_))
    }

    /// Returns `true` if the value at the specified index is null.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn is_null(&self, index: usize) -> bool {
        assert!(index < self.len());
        match self {
            Self::Trivial(_) => false,
            Self::Nulls(_) => true,
            Self::Bytes(presence) => presence[index] == 0,
        }
    }

    /// Returns `true` if the value at the specified index is valid (not null).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        !self.is_null(index)
    }

    /// Heap bytes held by this presence.
    pub fn retained_size_in_bytes(&self) -> usize {
        match self {
            Self::Bytes(presence) => presence.capacity(),
            _ => 0,
        }
    }
}

impl PartialEq for Presence {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        match (self, other) {
            (Self::Trivial(_), Self::Trivial(_)) | (Self::Nulls(_), Self::Nulls(_)) => true,
            (Self::Bytes(left), Self::Bytes(right)) => left == right,
            _ => (0..self.len()).all(|i| self.is_null(i) == other.is_null(i)),
        }
    }
}

impl Eq for Presence {}

impl Default for Presence {
    fn default() -> Self {
        Presence::Trivial(0)
    }
}
