//! Column reader for varchar, char and varbinary columns.
//!
//! The encoding of a column may change from one stripe to the next. The reader
//! owns one delegate per supported encoding family and, at every stripe start,
//! routes all further calls to the delegate matching that stripe's encoding.

use std::fmt;

use strata_common::{Result, error::Error, verify_arg};
use strata_memory_context::AggregatedMemoryContext;
use strata_sequence::bytes_sequence::BytesSequence;

use crate::read::{
    closer::Closer,
    column::OrcColumn,
    encoding::{ColumnEncodingKind, ColumnEncodings},
    options::ColumnReaderOptions,
    stream::InputStreamSources,
    types::LogicalType,
};

use super::{
    ColumnReader, slice_dictionary::SliceDictionaryColumnReader,
    slice_direct::SliceDirectColumnReader, truncation,
};

/// Name of the memory context the dictionary delegate reports to.
pub const MEMORY_CONTEXT_NAME: &str = "SliceColumnReader";

/// The delegate calls are routed to for the current stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveEncoding {
    Direct,
    Dictionary,
}

pub struct SliceColumnReader<D = SliceDirectColumnReader, C = SliceDictionaryColumnReader> {
    column: OrcColumn,
    direct_reader: D,
    dictionary_reader: C,
    /// `None` until a stripe with a supported encoding has started.
    active: Option<ActiveEncoding>,
    closed: bool,
}

impl SliceColumnReader {
    /// Creates a reader of `column` producing values of `logical_type`.
    ///
    /// Fails with an incompatible-type error unless `logical_type` is a varchar,
    /// char or varbinary type.
    pub fn new(
        logical_type: LogicalType,
        column: OrcColumn,
        memory_context: &AggregatedMemoryContext,
    ) -> Result<SliceColumnReader> {
        Self::with_options(
            logical_type,
            column,
            memory_context,
            &ColumnReaderOptions::default(),
        )
    }

    pub fn with_options(
        logical_type: LogicalType,
        column: OrcColumn,
        memory_context: &AggregatedMemoryContext,
        options: &ColumnReaderOptions,
    ) -> Result<SliceColumnReader> {
        verify_arg!(max_block_bytes, options.max_block_bytes > 0);
        if !logical_type.is_slice_type() {
            return Err(Error::incompatible_type(
                column.path(),
                logical_type.to_string(),
                column.column_type().name(),
            ));
        }
        let max_code_point_count = truncation::max_code_point_count(&column, &logical_type)?;
        let is_char_type = logical_type.is_char();

        let direct_reader = SliceDirectColumnReader::new(
            column.clone(),
            max_code_point_count,
            is_char_type,
            options,
        );
        let dictionary_reader = SliceDictionaryColumnReader::new(
            column.clone(),
            memory_context.new_local_memory_context(MEMORY_CONTEXT_NAME),
            max_code_point_count,
            is_char_type,
            options,
        );
        Ok(SliceColumnReader::from_delegates(
            column,
            direct_reader,
            dictionary_reader,
        ))
    }
}

impl<D: ColumnReader, C: ColumnReader> SliceColumnReader<D, C> {
    /// Assembles a reader from already constructed delegates.
    pub fn from_delegates(column: OrcColumn, direct_reader: D, dictionary_reader: C) -> Self {
        SliceColumnReader {
            column,
            direct_reader,
            dictionary_reader,
            active: None,
            closed: false,
        }
    }

    pub fn column(&self) -> &OrcColumn {
        &self.column
    }

    pub fn active_encoding(&self) -> Option<ActiveEncoding> {
        self.active
    }

    fn no_active_reader(&self, operation: &str) -> Error {
        Error::invalid_operation(format!(
            "{operation} on {} before a stripe was started",
            self.column
        ))
    }
}

impl<D: ColumnReader, C: ColumnReader> ColumnReader for SliceColumnReader<D, C> {
    fn start_stripe(
        &mut self,
        time_zone: &str,
        dictionary_sources: &InputStreamSources,
        encodings: &ColumnEncodings,
    ) -> Result<()> {
        self.active = None;
        if self.closed {
            return Err(Error::invalid_operation(format!(
                "start_stripe on closed reader of {}",
                self.column
            )));
        }

        let kind = encodings
            .get(self.column.column_id())
            .map(|encoding| encoding.kind());
        let active = match kind {
            Some(ColumnEncodingKind::Direct | ColumnEncodingKind::DirectV2) => {
                ActiveEncoding::Direct
            }
            Some(ColumnEncodingKind::Dictionary | ColumnEncodingKind::DictionaryV2) => {
                ActiveEncoding::Dictionary
            }
            Some(kind) => {
                return Err(Error::unsupported_encoding(
                    self.column.to_string(),
                    kind.name(),
                ));
            }
            None => {
                return Err(Error::unsupported_encoding(
                    self.column.to_string(),
                    "<missing>",
                ));
            }
        };
        log::debug!("{} starts stripe with {active:?} encoding", self.column);

        let result = match active {
            ActiveEncoding::Direct => {
                self.direct_reader
                    .start_stripe(time_zone, dictionary_sources, encodings)
            }
            ActiveEncoding::Dictionary => {
                self.dictionary_reader
                    .start_stripe(time_zone, dictionary_sources, encodings)
            }
        };
        if result.is_ok() {
            self.active = Some(active);
        }
        result
    }

    fn start_row_group(&mut self, data_sources: &InputStreamSources) -> Result<()> {
        match self.active {
            Some(ActiveEncoding::Direct) => self.direct_reader.start_row_group(data_sources),
            Some(ActiveEncoding::Dictionary) => {
                self.dictionary_reader.start_row_group(data_sources)
            }
            None => Err(self.no_active_reader("start_row_group")),
        }
    }

    fn prepare_next_read(&mut self, batch_size: usize) {
        match self.active {
            Some(ActiveEncoding::Direct) => self.direct_reader.prepare_next_read(batch_size),
            Some(ActiveEncoding::Dictionary) => {
                self.dictionary_reader.prepare_next_read(batch_size)
            }
            None => log::warn!(
                "ignoring batch of {batch_size} rows: {}",
                self.no_active_reader("prepare_next_read")
            ),
        }
    }

    fn read_block(&mut self) -> Result<BytesSequence> {
        match self.active {
            Some(ActiveEncoding::Direct) => self.direct_reader.read_block(),
            Some(ActiveEncoding::Dictionary) => self.dictionary_reader.read_block(),
            None => Err(self.no_active_reader("read_block")),
        }
    }

    fn retained_size_in_bytes(&self) -> u64 {
        std::mem::size_of::<Self>() as u64
            + self.direct_reader.retained_size_in_bytes()
            + self.dictionary_reader.retained_size_in_bytes()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.active = None;

        // Released in reverse order of creation.
        let mut closer = Closer::new();
        closer
            .close("dictionary reader", || self.dictionary_reader.close())
            .close("direct reader", || self.direct_reader.close());
        closer.finish()
    }
}

impl<D, C> fmt::Display for SliceColumnReader<D, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SliceColumnReader({})", self.column)
    }
}
