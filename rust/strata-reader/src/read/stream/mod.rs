//! Decoded column streams and the sources they are opened from.
//!
//! Run-length, bit-packing and compression codecs live below this layer: the
//! traits here describe streams that already yield logical values. A stream
//! that ends before the requested values were produced reports a corruption
//! error naming the stream.

use std::{collections::HashMap, fmt, sync::Arc};

use strata_common::{Result, error::Error};

use super::column::ColumnId;

pub mod memory;

/// Role of a stream within a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// One bit per row, set for non-null rows.
    Present,
    /// Value bytes (direct encoding) or dictionary indices (dictionary encoding).
    Data,
    /// Byte length of each non-null value or of each dictionary entry.
    Length,
    /// Concatenated bytes of the stripe dictionary entries.
    DictionaryData,
}

impl StreamKind {
    pub fn name(&self) -> &'static str {
        match self {
            StreamKind::Present => "PRESENT",
            StreamKind::Data => "DATA",
            StreamKind::Length => "LENGTH",
            StreamKind::DictionaryData => "DICTIONARY_DATA",
        }
    }
}

/// Identifies a stream of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId {
    pub column: ColumnId,
    pub kind: StreamKind,
}

impl StreamId {
    pub fn new(column: ColumnId, kind: StreamKind) -> StreamId {
        StreamId { column, kind }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.kind.name())
    }
}

/// Stream of bits, used for row presence.
pub trait BooleanInputStream: Send {
    /// Replaces the content of `out` with the next `count` bits.
    fn next_vector(&mut self, count: usize, out: &mut Vec<bool>) -> Result<()>;

    /// Consumes the next `count` bits and returns how many of them were set.
    fn count_bits_set(&mut self, count: usize) -> Result<usize>;
}

/// Stream of signed integers, used for lengths and dictionary indices.
pub trait LongInputStream: Send {
    /// Replaces the content of `out` with the next `count` values.
    fn next_vector(&mut self, count: usize, out: &mut Vec<i64>) -> Result<()>;

    /// Consumes the next `count` values and returns their sum.
    fn sum(&mut self, count: usize) -> Result<i64>;

    /// Consumes the next `count` values.
    fn skip(&mut self, count: usize) -> Result<()> {
        self.sum(count).map(|_| ())
    }
}

/// Stream of raw bytes.
pub trait ByteArrayInputStream: Send {
    /// Fills `out` with the next `out.len()` bytes.
    fn next(&mut self, out: &mut [u8]) -> Result<()>;

    /// Consumes the next `count` bytes.
    fn skip(&mut self, count: u64) -> Result<()>;
}

/// An opened stream of one of the supported value shapes.
pub enum InputStream {
    Boolean(Box<dyn BooleanInputStream>),
    Long(Box<dyn LongInputStream>),
    Bytes(Box<dyn ByteArrayInputStream>),
}

impl InputStream {
    fn shape(&self) -> &'static str {
        match self {
            InputStream::Boolean(_) => "boolean",
            InputStream::Long(_) => "long",
            InputStream::Bytes(_) => "bytes",
        }
    }
}

/// Opens a stream positioned at its beginning. Each call yields an independent
/// stream.
pub trait InputStreamSource: Send + Sync {
    fn open(&self, id: StreamId) -> Result<InputStream>;
}

/// A stream source bound to the stream it provides.
#[derive(Clone)]
pub struct StreamSource {
    id: StreamId,
    source: Arc<dyn InputStreamSource>,
}

impl StreamSource {
    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn open_boolean(&self) -> Result<Box<dyn BooleanInputStream>> {
        match self.source.open(self.id)? {
            InputStream::Boolean(stream) => Ok(stream),
            other => Err(self.unexpected_shape("boolean", &other)),
        }
    }

    pub fn open_long(&self) -> Result<Box<dyn LongInputStream>> {
        match self.source.open(self.id)? {
            InputStream::Long(stream) => Ok(stream),
            other => Err(self.unexpected_shape("long", &other)),
        }
    }

    pub fn open_bytes(&self) -> Result<Box<dyn ByteArrayInputStream>> {
        match self.source.open(self.id)? {
            InputStream::Bytes(stream) => Ok(stream),
            other => Err(self.unexpected_shape("bytes", &other)),
        }
    }

    fn unexpected_shape(&self, expected: &str, actual: &InputStream) -> Error {
        Error::invalid_format(
            format!("stream {}", self.id),
            format!("opened as {} stream, expected {expected}", actual.shape()),
        )
    }
}

impl fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSource")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// The stream sources of a stripe (dictionary streams) or of a row group
/// (data streams), keyed by stream id.
#[derive(Clone, Default)]
pub struct InputStreamSources(HashMap<StreamId, Arc<dyn InputStreamSource>>);

impl InputStreamSources {
    pub fn new() -> InputStreamSources {
        Default::default()
    }

    pub fn insert(&mut self, id: StreamId, source: Arc<dyn InputStreamSource>) {
        self.0.insert(id, source);
    }

    pub fn with(
        mut self,
        id: StreamId,
        source: impl InputStreamSource + 'static,
    ) -> InputStreamSources {
        self.insert(id, Arc::new(source));
        self
    }

    /// Returns the source of the given stream, or `None` if the stream is absent.
    pub fn get(&self, column: ColumnId, kind: StreamKind) -> Option<StreamSource> {
        let id = StreamId::new(column, kind);
        self.0.get(&id).map(|source| StreamSource {
            id,
            source: source.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for InputStreamSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}
