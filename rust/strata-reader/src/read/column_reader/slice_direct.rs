//! Reader for directly encoded string, char and binary columns.
//!
//! Direct encoding stores every value verbatim: an optional `PRESENT` stream marks
//! non-null rows, a `LENGTH` stream holds the byte length of each non-null value and
//! the `DATA` stream holds the concatenated value bytes.

use strata_common::{Result, error::Error, verify_column};
use strata_sequence::{
    bytes_sequence::{BytesSequence, BytesSequenceBuilder},
    offsets::Offsets,
    presence::Presence,
};

use crate::read::{
    column::OrcColumn,
    encoding::ColumnEncodings,
    options::ColumnReaderOptions,
    stream::{
        BooleanInputStream, ByteArrayInputStream, InputStreamSources, LongInputStream,
        StreamKind, StreamSource,
    },
};

use super::{ColumnReader, truncation::compute_truncated_length};

pub struct SliceDirectColumnReader {
    column: OrcColumn,
    max_code_point_count: Option<usize>,
    is_char_type: bool,
    max_block_bytes: u64,

    present_source: Option<StreamSource>,
    length_source: Option<StreamSource>,
    data_source: Option<StreamSource>,

    present_stream: Option<Box<dyn BooleanInputStream>>,
    length_stream: Option<Box<dyn LongInputStream>>,
    data_stream: Option<Box<dyn ByteArrayInputStream>>,
    row_group_open: bool,

    /// Rows of batches prepared but never read, to be skipped by the next read.
    read_offset: usize,
    next_batch_size: usize,

    present_vector: Vec<bool>,
    length_vector: Vec<i64>,
}

impl SliceDirectColumnReader {
    pub fn new(
        column: OrcColumn,
        max_code_point_count: Option<usize>,
        is_char_type: bool,
        options: &ColumnReaderOptions,
    ) -> SliceDirectColumnReader {
        SliceDirectColumnReader {
            column,
            max_code_point_count,
            is_char_type,
            max_block_bytes: options.max_block_bytes,
            present_source: None,
            length_source: None,
            data_source: None,
            present_stream: None,
            length_stream: None,
            data_stream: None,
            row_group_open: false,
            read_offset: 0,
            next_batch_size: 0,
            present_vector: Vec::new(),
            length_vector: Vec::new(),
        }
    }

    fn reset_row_group(&mut self) {
        self.present_stream = None;
        self.length_stream = None;
        self.data_stream = None;
        self.row_group_open = false;
        self.read_offset = 0;
        self.next_batch_size = 0;
    }

    fn open_row_group(&mut self) -> Result<()> {
        self.present_stream = self
            .present_source
            .as_ref()
            .map(StreamSource::open_boolean)
            .transpose()?;
        self.length_stream = self
            .length_source
            .as_ref()
            .map(StreamSource::open_long)
            .transpose()?;
        self.data_stream = self
            .data_source
            .as_ref()
            .map(StreamSource::open_bytes)
            .transpose()?;
        self.row_group_open = true;
        Ok(())
    }

    fn skip(&mut self, rows: usize) -> Result<()> {
        let non_null = match self.present_stream.as_mut() {
            Some(present) => present.count_bits_set(rows)?,
            None => rows,
        };
        if non_null == 0 {
            return Ok(());
        }

        let length_stream = self
            .length_stream
            .as_mut()
            .ok_or_else(|| missing_stream(&self.column, StreamKind::Length))?;
        let skip_bytes = length_stream.sum(non_null)?;
        verify_column!(
            self.column,
            skip_bytes >= 0,
            "negative total length {skip_bytes} of skipped values"
        );
        if skip_bytes > 0 {
            self.data_stream
                .as_mut()
                .ok_or_else(|| missing_stream(&self.column, StreamKind::Data))?
                .skip(skip_bytes as u64)?;
        }
        Ok(())
    }

    fn read_values(&mut self, batch_size: usize) -> Result<BytesSequence> {
        let has_present = self.present_stream.is_some();
        let mut null_count = 0;
        if let Some(present) = self.present_stream.as_mut() {
            present.next_vector(batch_size, &mut self.present_vector)?;
            verify_column!(
                self.column,
                self.present_vector.len() == batch_size,
                "present stream yielded {} of {batch_size} rows",
                self.present_vector.len()
            );
            null_count = self.present_vector.iter().filter(|&&present| !present).count();
            if null_count == batch_size {
                return Ok(BytesSequence::nulls(batch_size));
            }
        }
        let non_null = batch_size - null_count;

        self.length_stream
            .as_mut()
            .ok_or_else(|| missing_stream(&self.column, StreamKind::Length))?
            .next_vector(non_null, &mut self.length_vector)?;
        verify_column!(
            self.column,
            self.length_vector.len() == non_null,
            "length stream yielded {} of {non_null} lengths",
            self.length_vector.len()
        );

        let total_length = sum_lengths(&self.column, &self.length_vector, "value")?;
        if total_length > self.max_block_bytes {
            return Err(Error::block_too_large(
                self.column.to_string(),
                total_length,
                self.max_block_bytes,
            ));
        }

        let mut data = vec![0u8; total_length as usize];
        if total_length > 0 {
            self.data_stream
                .as_mut()
                .ok_or_else(|| missing_stream(&self.column, StreamKind::Data))?
                .next(&mut data)?;
        }

        let truncate = self.max_code_point_count.is_some() || self.is_char_type;
        let mut offsets = Offsets::with_capacity(batch_size);
        let mut lengths = self.length_vector.iter().map(|&length| length as usize);
        let mut read_pos = 0;
        let mut write_pos = 0;
        for row in 0..batch_size {
            if has_present && !self.present_vector[row] {
                offsets.push_length(0);
                continue;
            }
            let length = lengths.next().unwrap_or(0);
            let kept = if truncate {
                compute_truncated_length(
                    &data,
                    read_pos,
                    length,
                    self.max_code_point_count,
                    self.is_char_type,
                )
            } else {
                length
            };
            if read_pos != write_pos {
                data.copy_within(read_pos..read_pos + kept, write_pos);
            }
            read_pos += length;
            write_pos += kept;
            offsets.push_length(kept);
        }
        data.truncate(write_pos);

        let presence = if null_count == 0 {
            Presence::Trivial(batch_size)
        } else {
            Presence::Bytes(self.present_vector.iter().map(|&p| p as u8).collect())
        };
        Ok(BytesSequence::new(data, offsets, presence))
    }
}

impl ColumnReader for SliceDirectColumnReader {
    fn start_stripe(
        &mut self,
        _time_zone: &str,
        _dictionary_sources: &InputStreamSources,
        _encodings: &ColumnEncodings,
    ) -> Result<()> {
        self.present_source = None;
        self.length_source = None;
        self.data_source = None;
        self.reset_row_group();
        Ok(())
    }

    fn start_row_group(&mut self, data_sources: &InputStreamSources) -> Result<()> {
        let column_id = self.column.column_id();
        self.present_source = data_sources.get(column_id, StreamKind::Present);
        self.length_source = data_sources.get(column_id, StreamKind::Length);
        self.data_source = data_sources.get(column_id, StreamKind::Data);
        self.reset_row_group();
        log::trace!(
            "row group bound for {}: present={}, length={}, data={}",
            self.column,
            self.present_source.is_some(),
            self.length_source.is_some(),
            self.data_source.is_some()
        );
        Ok(())
    }

    fn prepare_next_read(&mut self, batch_size: usize) {
        self.read_offset += self.next_batch_size;
        self.next_batch_size = batch_size;
    }

    fn read_block(&mut self) -> Result<BytesSequence> {
        if !self.row_group_open {
            self.open_row_group()?;
        }
        if self.read_offset > 0 {
            self.skip(self.read_offset)?;
            self.read_offset = 0;
        }

        let batch_size = std::mem::take(&mut self.next_batch_size);
        if batch_size == 0 {
            return Ok(BytesSequenceBuilder::default().build());
        }
        self.read_values(batch_size)
    }

    fn retained_size_in_bytes(&self) -> u64 {
        (std::mem::size_of::<Self>()
            + self.present_vector.capacity() * std::mem::size_of::<bool>()
            + self.length_vector.capacity() * std::mem::size_of::<i64>()) as u64
    }

    fn close(&mut self) -> Result<()> {
        self.reset_row_group();
        self.present_source = None;
        self.length_source = None;
        self.data_source = None;
        self.present_vector = Vec::new();
        self.length_vector = Vec::new();
        Ok(())
    }
}

/// Total byte length of stored `what` lengths. Negative lengths and sums that do
/// not fit in `u64` are corruption.
pub(crate) fn sum_lengths(column: &OrcColumn, lengths: &[i64], what: &str) -> Result<u64> {
    lengths.iter().try_fold(0u64, |total, &length| {
        verify_column!(column, length >= 0, "negative {what} length {length}");
        total.checked_add(length as u64).ok_or_else(|| {
            Error::corruption(
                column.to_string(),
                format!("{what} lengths overflow after {total} bytes"),
            )
        })
    })
}

pub(crate) fn missing_stream(column: &OrcColumn, kind: StreamKind) -> Error {
    Error::corruption(
        column.to_string(),
        format!("value is not null but {} stream is missing", kind.name()),
    )
}
