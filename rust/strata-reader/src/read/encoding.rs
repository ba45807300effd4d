//! Per-stripe column encodings.

use std::{collections::HashMap, fmt};

use super::column::ColumnId;

/// Encoding of a column's streams within one stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnEncodingKind {
    Direct,
    DirectV2,
    Dictionary,
    DictionaryV2,
    /// Direct encoding as written by DWRF producers.
    DwrfDirect,
}

impl ColumnEncodingKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnEncodingKind::Direct => "DIRECT",
            ColumnEncodingKind::DirectV2 => "DIRECT_V2",
            ColumnEncodingKind::Dictionary => "DICTIONARY",
            ColumnEncodingKind::DictionaryV2 => "DICTIONARY_V2",
            ColumnEncodingKind::DwrfDirect => "DWRF_DIRECT",
        }
    }
}

impl fmt::Display for ColumnEncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoding announced for one column in a stripe footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnEncoding {
    kind: ColumnEncodingKind,
    /// Number of distinct entries in the stripe dictionary. Zero for
    /// non-dictionary encodings.
    dictionary_size: u32,
}

impl ColumnEncoding {
    pub fn new(kind: ColumnEncodingKind, dictionary_size: u32) -> ColumnEncoding {
        ColumnEncoding {
            kind,
            dictionary_size,
        }
    }

    pub fn direct() -> ColumnEncoding {
        ColumnEncoding::new(ColumnEncodingKind::DirectV2, 0)
    }

    pub fn dictionary(dictionary_size: u32) -> ColumnEncoding {
        ColumnEncoding::new(ColumnEncodingKind::DictionaryV2, dictionary_size)
    }

    pub fn kind(&self) -> ColumnEncodingKind {
        self.kind
    }

    pub fn dictionary_size(&self) -> u32 {
        self.dictionary_size
    }
}

/// The encodings of all columns of one stripe.
#[derive(Debug, Clone, Default)]
pub struct ColumnEncodings(HashMap<ColumnId, ColumnEncoding>);

impl ColumnEncodings {
    pub fn new() -> ColumnEncodings {
        Default::default()
    }

    pub fn insert(&mut self, column: ColumnId, encoding: ColumnEncoding) {
        self.0.insert(column, encoding);
    }

    pub fn with(mut self, column: ColumnId, encoding: ColumnEncoding) -> ColumnEncodings {
        self.insert(column, encoding);
        self
    }

    pub fn get(&self, column: ColumnId) -> Option<&ColumnEncoding> {
        self.0.get(&column)
    }
}

impl FromIterator<(ColumnId, ColumnEncoding)> for ColumnEncodings {
    fn from_iter<T: IntoIterator<Item = (ColumnId, ColumnEncoding)>>(iter: T) -> Self {
        ColumnEncodings(iter.into_iter().collect())
    }
}
