/// Default upper bound on the bytes of values a single block may carry (1 GiB).
pub const DEFAULT_MAX_BLOCK_BYTES: u64 = 1 << 30;

/// Tunables of a column reader, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReaderOptions {
    /// A block whose values would take more bytes than this fails to read.
    pub max_block_bytes: u64,
}

impl ColumnReaderOptions {
    pub fn new() -> ColumnReaderOptions {
        Default::default()
    }

    pub fn max_block_bytes(mut self, max_block_bytes: u64) -> Self {
        self.max_block_bytes = max_block_bytes;
        self
    }
}

impl Default for ColumnReaderOptions {
    fn default() -> Self {
        ColumnReaderOptions {
            max_block_bytes: DEFAULT_MAX_BLOCK_BYTES,
        }
    }
}
