//! Reader for dictionary encoded string, char and binary columns.
//!
//! Each stripe carries a dictionary of distinct values: `LENGTH` holds the byte
//! length of every entry and `DICTIONARY_DATA` their concatenated bytes. Rows are
//! stored as indices into the dictionary in the `DATA` stream, with an optional
//! `PRESENT` stream marking non-null rows.

use strata_common::{Result, error::Error, verify_column};
use strata_memory_context::LocalMemoryContext;
use strata_sequence::{
    bytes_sequence::{BytesSequence, BytesSequenceBuilder},
    offsets::Offsets,
};

use crate::read::{
    column::OrcColumn,
    encoding::ColumnEncodings,
    options::ColumnReaderOptions,
    stream::{BooleanInputStream, InputStreamSources, LongInputStream, StreamKind, StreamSource},
};

use super::{
    ColumnReader,
    slice_direct::{missing_stream, sum_lengths},
    truncation::compute_truncated_length,
};

pub struct SliceDictionaryColumnReader {
    column: OrcColumn,
    max_code_point_count: Option<usize>,
    is_char_type: bool,
    max_block_bytes: u64,
    memory_context: LocalMemoryContext,

    dictionary_data_source: Option<StreamSource>,
    dictionary_length_source: Option<StreamSource>,
    dictionary_size: usize,
    dictionary_open: bool,
    /// Truncated dictionary entries, `dictionary_offsets` delimiting each of them.
    dictionary_data: Vec<u8>,
    dictionary_offsets: Offsets,

    present_source: Option<StreamSource>,
    data_source: Option<StreamSource>,
    present_stream: Option<Box<dyn BooleanInputStream>>,
    data_stream: Option<Box<dyn LongInputStream>>,
    row_group_open: bool,

    read_offset: usize,
    next_batch_size: usize,

    present_vector: Vec<bool>,
    /// Dictionary indices of the current batch, or entry lengths while loading
    /// the dictionary.
    long_vector: Vec<i64>,
}

impl SliceDictionaryColumnReader {
    pub fn new(
        column: OrcColumn,
        memory_context: LocalMemoryContext,
        max_code_point_count: Option<usize>,
        is_char_type: bool,
        options: &ColumnReaderOptions,
    ) -> SliceDictionaryColumnReader {
        SliceDictionaryColumnReader {
            column,
            max_code_point_count,
            is_char_type,
            max_block_bytes: options.max_block_bytes,
            memory_context,
            dictionary_data_source: None,
            dictionary_length_source: None,
            dictionary_size: 0,
            dictionary_open: false,
            dictionary_data: Vec::new(),
            dictionary_offsets: Offsets::new(),
            present_source: None,
            data_source: None,
            present_stream: None,
            data_stream: None,
            row_group_open: false,
            read_offset: 0,
            next_batch_size: 0,
            present_vector: Vec::new(),
            long_vector: Vec::new(),
        }
    }

    /// Number of entries in the current stripe's dictionary.
    pub fn dictionary_size(&self) -> usize {
        self.dictionary_size
    }

    fn reset_row_group(&mut self) {
        self.present_stream = None;
        self.data_stream = None;
        self.row_group_open = false;
        self.read_offset = 0;
        self.next_batch_size = 0;
    }

    fn open_dictionary(&mut self) -> Result<()> {
        self.dictionary_data = Vec::new();
        self.dictionary_offsets = Offsets::new();
        self.report_dictionary_size(0)?;

        if self.dictionary_size > 0 {
            self.dictionary_length_source
                .as_ref()
                .ok_or_else(|| missing_dictionary_stream(&self.column, StreamKind::Length))?
                .open_long()?
                .next_vector(self.dictionary_size, &mut self.long_vector)?;
            verify_column!(
                self.column,
                self.long_vector.len() == self.dictionary_size,
                "dictionary length stream yielded {} of {} lengths",
                self.long_vector.len(),
                self.dictionary_size
            );

            let total_length = sum_lengths(&self.column, &self.long_vector, "dictionary entry")?;
            if total_length > self.max_block_bytes {
                return Err(Error::block_too_large(
                    self.column.to_string(),
                    total_length,
                    self.max_block_bytes,
                ));
            }
            // Reserved before allocating; the exact footprint is reported once built.
            let offsets_size =
                (self.dictionary_size as u64 + 1) * std::mem::size_of::<u64>() as u64;
            self.report_dictionary_size(total_length + offsets_size)?;

            self.dictionary_data = vec![0; total_length as usize];
            self.dictionary_offsets = Offsets::with_capacity(self.dictionary_size);
            if total_length > 0 {
                self.dictionary_data_source
                    .as_ref()
                    .ok_or_else(|| {
                        missing_dictionary_stream(&self.column, StreamKind::DictionaryData)
                    })?
                    .open_bytes()?
                    .next(&mut self.dictionary_data)?;
            }

            let truncate = self.max_code_point_count.is_some() || self.is_char_type;
            let mut read_pos = 0;
            let mut write_pos = 0;
            for &length in &self.long_vector {
                let length = length as usize;
                let kept = if truncate {
                    compute_truncated_length(
                        &self.dictionary_data,
                        read_pos,
                        length,
                        self.max_code_point_count,
                        self.is_char_type,
                    )
                } else {
                    length
                };
                if read_pos != write_pos {
                    self.dictionary_data
                        .copy_within(read_pos..read_pos + kept, write_pos);
                }
                read_pos += length;
                write_pos += kept;
                self.dictionary_offsets.push_length(kept);
            }
            self.dictionary_data.truncate(write_pos);
        }

        self.report_dictionary_size(self.dictionary_retained_size())?;
        self.dictionary_open = true;
        log::debug!(
            "loaded dictionary of {} entries ({} bytes) for {}",
            self.dictionary_size,
            self.dictionary_data.len(),
            self.column
        );
        Ok(())
    }

    fn report_dictionary_size(&mut self, bytes: u64) -> Result<()> {
        self.memory_context
            .set_bytes(bytes)
            .map_err(|e| Error::memory_limit_exceeded(e.context, e.requested, e.limit))
    }

    fn dictionary_retained_size(&self) -> u64 {
        (self.dictionary_data.capacity() + self.dictionary_offsets.retained_size_in_bytes()) as u64
    }

    fn open_row_group(&mut self) -> Result<()> {
        self.present_stream = self
            .present_source
            .as_ref()
            .map(StreamSource::open_boolean)
            .transpose()?;
        self.data_stream = self
            .data_source
            .as_ref()
            .map(StreamSource::open_long)
            .transpose()?;
        self.row_group_open = true;
        Ok(())
    }

    fn skip(&mut self, rows: usize) -> Result<()> {
        let non_null = match self.present_stream.as_mut() {
            Some(present) => present.count_bits_set(rows)?,
            None => rows,
        };
        if non_null > 0 {
            self.data_stream
                .as_mut()
                .ok_or_else(|| missing_stream(&self.column, StreamKind::Data))?
                .skip(non_null)?;
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

        self.data_stream
            .as_mut()
            .ok_or_else(|| missing_stream(&self.column, StreamKind::Data))?
            .next_vector(non_null, &mut self.long_vector)?;
        verify_column!(
            self.column,
            self.long_vector.len() == non_null,
            "data stream yielded {} of {non_null} dictionary indices",
            self.long_vector.len()
        );

        let mut total_length = 0u64;
        for &index in &self.long_vector {
            verify_column!(
                self.column,
                index >= 0 && (index as u64) < self.dictionary_size as u64,
                "dictionary index {index} is out of bounds for a dictionary of {} entries",
                self.dictionary_size
            );
            total_length = total_length
                .saturating_add(self.dictionary_offsets.range_at(index as usize).len() as u64);
        }
        if total_length > self.max_block_bytes {
            return Err(Error::block_too_large(
                self.column.to_string(),
                total_length,
                self.max_block_bytes,
            ));
        }

        let mut builder = BytesSequenceBuilder::with_capacity(batch_size, total_length as usize);
        let mut indices = self.long_vector.iter().map(|&index| index as usize);
        for row in 0..batch_size {
            if has_present && !self.present_vector[row] {
                builder.push_null();
            } else {
                let index = indices.next().unwrap_or(0);
                builder.push_value(&self.dictionary_data[self.dictionary_offsets.range_at(index)]);
            }
        }
        Ok(builder.build())
    }
}

impl ColumnReader for SliceDictionaryColumnReader {
    fn start_stripe(
        &mut self,
        _time_zone: &str,
        dictionary_sources: &InputStreamSources,
        encodings: &ColumnEncodings,
    ) -> Result<()> {
        let column_id = self.column.column_id();
        let encoding = encodings.get(column_id).ok_or_else(|| {
            Error::corruption(self.column.to_string(), "column encoding is missing")
        })?;
        self.dictionary_size = encoding.dictionary_size() as usize;
        self.dictionary_data_source = dictionary_sources.get(column_id, StreamKind::DictionaryData);
        self.dictionary_length_source = dictionary_sources.get(column_id, StreamKind::Length);
        self.dictionary_open = false;

        self.present_source = None;
        self.data_source = None;
        self.reset_row_group();
        Ok(())
    }

    fn start_row_group(&mut self, data_sources: &InputStreamSources) -> Result<()> {
        let column_id = self.column.column_id();
        self.present_source = data_sources.get(column_id, StreamKind::Present);
        self.data_source = data_sources.get(column_id, StreamKind::Data);
        self.reset_row_group();
        log::trace!(
            "row group bound for {}: present={}, data={}",
            self.column,
            self.present_source.is_some(),
            self.data_source.is_some()
        );
        Ok(())
    }

    fn prepare_next_read(&mut self, batch_size: usize) {
        self.read_offset += self.next_batch_size;
        self.next_batch_size = batch_size;
    }

    fn read_block(&mut self) -> Result<BytesSequence> {
        if !self.dictionary_open {
            self.open_dictionary()?;
        }
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
        std::mem::size_of::<Self>() as u64
            + self.dictionary_retained_size()
            + (self.present_vector.capacity() * std::mem::size_of::<bool>()
                + self.long_vector.capacity() * std::mem::size_of::<i64>()) as u64
    }

    fn close(&mut self) -> Result<()> {
        self.reset_row_group();
        self.dictionary_data_source = None;
        self.dictionary_length_source = None;
        self.present_source = None;
        self.data_source = None;
        self.dictionary_open = false;
        self.dictionary_data = Vec::new();
        self.dictionary_offsets = Offsets::new();
        self.present_vector = Vec::new();
        self.long_vector = Vec::new();
        self.memory_context.close();
        Ok(())
    }
}

fn missing_dictionary_stream(column: &OrcColumn, kind: StreamKind) -> Error {
    Error::corruption(
        column.to_string(),
        format!("dictionary is not empty but {} stream is missing", kind.name()),
    )
}

#[cfg(test)]
mod tests {
    use strata_common::error::ErrorKind;
    use strata_memory_context::AggregatedMemoryContext;

    use crate::read::{
        column::{ColumnId, OrcTypeKind},
        encoding::ColumnEncoding,
        stream::{StreamId, memory::MemoryStreamSource},
    };

    use super::*;

    const COLUMN: ColumnId = ColumnId(5);

    fn dictionary_reader(
        memory: &AggregatedMemoryContext,
        max: Option<usize>,
        is_char: bool,
    ) -> SliceDictionaryColumnReader {
        let column = OrcColumn::new("t.orc", COLUMN, "city", OrcTypeKind::String);
        SliceDictionaryColumnReader::new(
            column,
            memory.new_local_memory_context("SliceColumnReader"),
            max,
            is_char,
            &ColumnReaderOptions::default(),
        )
    }

    fn start_stripe(reader: &mut SliceDictionaryColumnReader, dictionary: &[&str]) {
        start_stripe_raw(
            reader,
            dictionary.len() as u32,
            dictionary.iter().map(|v| v.len() as i64).collect(),
            dictionary.concat().into_bytes(),
        );
    }

    fn start_stripe_raw(
        reader: &mut SliceDictionaryColumnReader,
        dictionary_size: u32,
        lengths: Vec<i64>,
        data: Vec<u8>,
    ) {
        let sources = InputStreamSources::new()
            .with(
                StreamId::new(COLUMN, StreamKind::Length),
                MemoryStreamSource::longs(lengths),
            )
            .with(
                StreamId::new(COLUMN, StreamKind::DictionaryData),
                MemoryStreamSource::bytes(data),
            );
        let encodings =
            ColumnEncodings::new().with(COLUMN, ColumnEncoding::dictionary(dictionary_size));
        reader.start_stripe("UTC", &sources, &encodings).unwrap();
    }

    fn row_group(present: Option<Vec<bool>>, indices: Vec<i64>) -> InputStreamSources {
        let mut sources = InputStreamSources::new().with(
            StreamId::new(COLUMN, StreamKind::Data),
            MemoryStreamSource::longs(indices),
        );
        if let Some(present) = present {
            sources = sources.with(
                StreamId::new(COLUMN, StreamKind::Present),
                MemoryStreamSource::booleans(present),
            );
        }
        sources
    }

    fn expected(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    fn read(reader: &mut SliceDictionaryColumnReader, batch_size: usize) -> Vec<Option<String>> {
        reader.prepare_next_read(batch_size);
        reader
            .read_block()
            .unwrap()
            .iter()
            .map(|v| v.map(|v| String::from_utf8(v.to_vec()).unwrap()))
            .collect()
    }

    #[test]
    fn test_read_through_dictionary() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, None, false);
        start_stripe(&mut reader, &["paris", "oslo", "rome"]);
        assert_eq!(reader.dictionary_size(), 3);
        reader
            .start_row_group(&row_group(
                Some(vec![true, false, true, true]),
                vec![2, 0, 2],
            ))
            .unwrap();
        assert_eq!(
            read(&mut reader, 4),
            expected(&[Some("rome"), None, Some("paris"), Some("rome")])
        );
    }

    #[test]
    fn test_skip_prepared_rows() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, None, false);
        start_stripe(&mut reader, &["a", "b", "c"]);
        reader
            .start_row_group(&row_group(Some(vec![false, true, true]), vec![1, 2]))
            .unwrap();
        reader.prepare_next_read(2);
        assert_eq!(read(&mut reader, 1), expected(&[Some("c")]));
    }

    #[test]
    fn test_dictionary_entries_truncated() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, Some(4), true);
        start_stripe(&mut reader, &["ab  ", "abcdef", "    "]);
        reader
            .start_row_group(&row_group(None, vec![0, 1, 2]))
            .unwrap();
        assert_eq!(
            read(&mut reader, 3),
            expected(&[Some("ab"), Some("abcd"), Some("")])
        );
    }

    #[test]
    fn test_dictionary_memory_accounting() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, None, false);
        start_stripe(&mut reader, &["alpha", "beta"]);
        assert_eq!(memory.bytes(), 0);

        reader.start_row_group(&row_group(None, vec![0])).unwrap();
        read(&mut reader, 1);
        assert!(memory.bytes() >= 9);
        assert!(reader.retained_size_in_bytes() >= memory.bytes());

        reader.close().unwrap();
        assert_eq!(memory.bytes(), 0);
    }

    #[test]
    fn test_dictionary_memory_limit() {
        let memory = AggregatedMemoryContext::new_root_with_limit(8);
        let mut reader = dictionary_reader(&memory, None, false);
        start_stripe(&mut reader, &["a much longer dictionary entry"]);
        reader.start_row_group(&row_group(None, vec![0])).unwrap();
        reader.prepare_next_read(1);
        let e = reader.read_block().unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::MemoryLimitExceeded { .. }));
        assert_eq!(memory.bytes(), 0);
    }

    #[test]
    fn test_overflowing_dictionary_lengths() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, None, false);
        start_stripe_raw(&mut reader, 3, vec![i64::MAX, i64::MAX, 3], b"abc".to_vec());
        reader.start_row_group(&row_group(None, vec![0])).unwrap();
        reader.prepare_next_read(1);
        let e = reader.read_block().unwrap_err();
        assert!(e.is_corruption());
        assert!(e.to_string().contains("dictionary entry lengths overflow"), "{e}");
        assert_eq!(memory.bytes(), 0);
    }

    #[test]
    fn test_dictionary_over_block_limit() {
        let memory = AggregatedMemoryContext::new_root();
        let column = OrcColumn::new("t.orc", COLUMN, "city", OrcTypeKind::String);
        let mut reader = SliceDictionaryColumnReader::new(
            column,
            memory.new_local_memory_context("SliceColumnReader"),
            None,
            false,
            &ColumnReaderOptions::new().max_block_bytes(4),
        );
        start_stripe_raw(&mut reader, 1, vec![100], vec![b'x'; 100]);
        reader.start_row_group(&row_group(None, vec![0])).unwrap();
        reader.prepare_next_read(1);
        let e = reader.read_block().unwrap_err();
        assert!(matches!(
            e.kind(),
            ErrorKind::BlockTooLarge {
                size: 100,
                limit: 4,
                ..
            }
        ));
        assert_eq!(memory.bytes(), 0);
    }

    #[test]
    fn test_dictionary_size_beyond_length_stream() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, None, false);
        start_stripe_raw(&mut reader, u32::MAX, vec![1, 1], b"ab".to_vec());
        reader.start_row_group(&row_group(None, vec![0])).unwrap();
        reader.prepare_next_read(1);
        let e = reader.read_block().unwrap_err();
        assert!(e.is_corruption());
        assert_eq!(memory.bytes(), 0);
    }

    #[test]
    fn test_memory_reserved_before_load() {
        let memory = AggregatedMemoryContext::new_root_with_limit(64);
        let mut reader = dictionary_reader(&memory, None, false);
        start_stripe_raw(&mut reader, 1, vec![1 << 20], Vec::new());
        reader.start_row_group(&row_group(None, vec![0])).unwrap();
        reader.prepare_next_read(1);
        let e = reader.read_block().unwrap_err();
        assert!(matches!(
            e.kind(),
            ErrorKind::MemoryLimitExceeded { requested, .. } if *requested == (1 << 20) + 16
        ));
        assert_eq!(memory.bytes(), 0);
    }

    #[test]
    fn test_index_out_of_bounds() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, None, false);
        start_stripe(&mut reader, &["a", "b"]);
        reader.start_row_group(&row_group(None, vec![1, 2])).unwrap();
        reader.prepare_next_read(2);
        let e = reader.read_block().unwrap_err();
        assert!(e.is_corruption());
        assert!(e.to_string().contains("dictionary index 2"));
    }

    #[test]
    fn test_missing_dictionary_streams() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, None, false);
        let encodings = ColumnEncodings::new().with(COLUMN, ColumnEncoding::dictionary(2));
        reader
            .start_stripe("UTC", &InputStreamSources::new(), &encodings)
            .unwrap();
        reader.start_row_group(&row_group(None, vec![0])).unwrap();
        reader.prepare_next_read(1);
        let e = reader.read_block().unwrap_err();
        assert!(e.is_corruption());
        assert!(e.to_string().contains("LENGTH stream is missing"));
    }

    #[test]
    fn test_empty_dictionary_all_nulls() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, None, false);
        let encodings = ColumnEncodings::new().with(COLUMN, ColumnEncoding::dictionary(0));
        reader
            .start_stripe("UTC", &InputStreamSources::new(), &encodings)
            .unwrap();
        reader
            .start_row_group(&row_group(Some(vec![false, false]), vec![]))
            .unwrap();
        assert_eq!(read(&mut reader, 2), expected(&[None, None]));
    }

    #[test]
    fn test_dictionary_reloaded_per_stripe() {
        let memory = AggregatedMemoryContext::new_root();
        let mut reader = dictionary_reader(&memory, None, false);
        start_stripe(&mut reader, &["x"]);
        reader.start_row_group(&row_group(None, vec![0])).unwrap();
        assert_eq!(read(&mut reader, 1), expected(&[Some("x")]));

        start_stripe(&mut reader, &["y", "z"]);
        reader.start_row_group(&row_group(None, vec![1, 0])).unwrap();
        assert_eq!(read(&mut reader, 2), expected(&[Some("z"), Some("y")]));
    }
}
