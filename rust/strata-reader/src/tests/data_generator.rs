//! Builds in-memory stripes of a single slice column for reader tests.

use std::ops::Range;

use crate::read::{
    column::ColumnId,
    encoding::{ColumnEncoding, ColumnEncodingKind, ColumnEncodings},
    stream::{InputStreamSources, StreamId, StreamKind, memory::MemoryStreamSource},
};

/// Stripe-level inputs of a column: its encoding and dictionary streams, plus the
/// data streams of each row group.
pub struct StripeData {
    pub encodings: ColumnEncodings,
    pub dictionary_sources: InputStreamSources,
    pub row_groups: Vec<InputStreamSources>,
}

/// Encodes `values` as one stripe of `column`, splitting it into row groups of
/// `row_group_size` rows.
///
/// Dictionary kinds store each distinct value once, in first-seen order. A row
/// group without nulls has no `PRESENT` stream.
pub fn encode_stripe(
    column: ColumnId,
    kind: ColumnEncodingKind,
    values: &[Option<&[u8]>],
    row_group_size: usize,
) -> StripeData {
    let dictionary = match kind {
        ColumnEncodingKind::Dictionary | ColumnEncodingKind::DictionaryV2 => {
            Some(build_dictionary(values))
        }
        _ => None,
    };

    let mut dictionary_sources = InputStreamSources::new();
    let dictionary_size = match &dictionary {
        Some(entries) => {
            dictionary_sources = dictionary_sources
                .with(
                    StreamId::new(column, StreamKind::Length),
                    MemoryStreamSource::longs(
                        entries.iter().map(|e| e.len() as i64).collect::<Vec<_>>(),
                    ),
                )
                .with(
                    StreamId::new(column, StreamKind::DictionaryData),
                    MemoryStreamSource::bytes(entries.concat()),
                );
            entries.len() as u32
        }
        None => 0,
    };

    let row_groups = values
        .chunks(row_group_size.max(1))
        .map(|rows| match &dictionary {
            Some(entries) => encode_dictionary_row_group(column, entries, rows),
            None => encode_direct_row_group(column, rows),
        })
        .collect();

    StripeData {
        encodings: ColumnEncodings::new()
            .with(column, ColumnEncoding::new(kind, dictionary_size)),
        dictionary_sources,
        row_groups,
    }
}

fn build_dictionary(values: &[Option<&[u8]>]) -> Vec<Vec<u8>> {
    let mut entries: Vec<Vec<u8>> = Vec::new();
    for value in values.iter().flatten() {
        if !entries.iter().any(|e| e.as_slice() == *value) {
            entries.push(value.to_vec());
        }
    }
    entries
}

fn with_present(
    sources: InputStreamSources,
    column: ColumnId,
    rows: &[Option<&[u8]>],
) -> InputStreamSources {
    if rows.iter().all(Option::is_some) {
        return sources;
    }
    sources.with(
        StreamId::new(column, StreamKind::Present),
        MemoryStreamSource::booleans(rows.iter().map(Option::is_some).collect::<Vec<_>>()),
    )
}

fn encode_direct_row_group(column: ColumnId, rows: &[Option<&[u8]>]) -> InputStreamSources {
    let lengths = rows
        .iter()
        .flatten()
        .map(|v| v.len() as i64)
        .collect::<Vec<_>>();
    let data = rows.iter().flatten().copied().collect::<Vec<_>>().concat();
    let sources = InputStreamSources::new()
        .with(
            StreamId::new(column, StreamKind::Length),
            MemoryStreamSource::longs(lengths),
        )
        .with(
            StreamId::new(column, StreamKind::Data),
            MemoryStreamSource::bytes(data),
        );
    with_present(sources, column, rows)
}

fn encode_dictionary_row_group(
    column: ColumnId,
    entries: &[Vec<u8>],
    rows: &[Option<&[u8]>],
) -> InputStreamSources {
    let indices = rows
        .iter()
        .flatten()
        .map(|v| {
            entries
                .iter()
                .position(|e| e.as_slice() == *v)
                .expect("value is in the dictionary") as i64
        })
        .collect::<Vec<_>>();
    let sources = InputStreamSources::new().with(
        StreamId::new(column, StreamKind::Data),
        MemoryStreamSource::longs(indices),
    );
    with_present(sources, column, rows)
}

/// Generates `count` random values drawn from a small vocabulary of ASCII,
/// multi-byte and space-padded words, `nulls_fraction` of them null.
pub fn generate_values(
    rng: &mut fastrand::Rng,
    count: usize,
    nulls_fraction: f64,
    words_per_value: Range<usize>,
) -> Vec<Option<String>> {
    const WORDS: &[&str] = &[
        "oslo", "rome", "zürich", "東京", "naïve", "a", "", " ", "tail  ", "😀x", "bergen",
    ];
    (0..count)
        .map(|_| {
            if rng.f64() < nulls_fraction {
                return None;
            }
            let words = rng.usize(words_per_value.clone());
            let value = (0..words)
                .map(|_| WORDS[rng.usize(0..WORDS.len())])
                .collect::<Vec<_>>()
                .join(" ");
            Some(value)
        })
        .collect()
}

/// Borrows generated values as the byte slices `encode_stripe` takes.
pub fn as_bytes(values: &[Option<String>]) -> Vec<Option<&[u8]>> {
    values
        .iter()
        .map(|v| v.as_deref().map(str::as_bytes))
        .collect()
}
