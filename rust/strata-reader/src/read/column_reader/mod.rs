//! Column readers and the lifecycle contract they share.
//!
//! A reader is driven through a fixed protocol:
//!
//! 1. [`start_stripe`](ColumnReader::start_stripe) once per stripe, with the stripe's
//!    dictionary stream sources and column encodings;
//! 2. [`start_row_group`](ColumnReader::start_row_group) once per row group of that
//!    stripe, with the row group's data stream sources;
//! 3. any number of [`prepare_next_read`](ColumnReader::prepare_next_read) /
//!    [`read_block`](ColumnReader::read_block) pairs within the row group.
//!
//! A batch that is prepared but never read is skipped by the next read, so callers
//! can drop batches whose rows were filtered out by other columns.

use strata_common::Result;
use strata_sequence::bytes_sequence::BytesSequence;

use super::{encoding::ColumnEncodings, filter::TupleDomainFilter, stream::InputStreamSources};

pub mod slice;
pub mod slice_dictionary;
pub mod slice_direct;
pub mod truncation;

pub use slice::SliceColumnReader;

/// The lifecycle contract of a column reader.
pub trait ColumnReader: Send {
    /// Begins a new stripe.
    ///
    /// # Arguments
    ///
    /// * `time_zone` - Time zone id of the file writer, for readers of temporal types.
    /// * `dictionary_sources` - Stripe-scoped streams (dictionaries).
    /// * `encodings` - The stripe's column encodings.
    fn start_stripe(
        &mut self,
        time_zone: &str,
        dictionary_sources: &InputStreamSources,
        encodings: &ColumnEncodings,
    ) -> Result<()>;

    /// Begins a new row group of the current stripe, binding its data streams.
    fn start_row_group(&mut self, data_sources: &InputStreamSources) -> Result<()>;

    /// Sets the number of rows the next [`read_block`](Self::read_block) returns.
    /// Performs no I/O.
    fn prepare_next_read(&mut self, batch_size: usize);

    /// Decodes the prepared batch.
    fn read_block(&mut self) -> Result<BytesSequence>;

    /// Evaluates `filter` against a decoded value, `None` standing for null.
    fn filter_test(&self, filter: &dyn TupleDomainFilter, value: Option<&[u8]>) -> bool {
        match value {
            None => filter.test_null(),
            Some(value) => filter.test_bytes(value),
        }
    }

    /// Bytes owned by the reader, excluding blocks already returned.
    fn retained_size_in_bytes(&self) -> u64;

    /// Releases the reader's resources.
    fn close(&mut self) -> Result<()>;
}
