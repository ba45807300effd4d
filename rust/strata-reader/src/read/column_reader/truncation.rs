//! Reconciliation of stored value bytes with SQL character semantics.

use strata_common::{Result, error::Error};
use strata_unicode::code_points::CodePointUtils;

use crate::read::{column::OrcColumn, types::LogicalType};

/// Returns how many bytes of `bytes[offset..offset + length]` are significant.
///
/// * Fixed-width char (`is_char_type`): the first `max_code_point_count` code points,
///   without trailing spaces.
/// * Bounded varchar: the first `max_code_point_count` code points. Producers are
///   allowed to write values longer than the declared bound.
/// * Unbounded varchar and varbinary (`max_code_point_count == None`): `length`.
///
/// The result never splits a multi-byte code point.
///
/// # Panics
///
/// Panics if `offset + length` exceeds `bytes.len()`.
pub fn compute_truncated_length(
    bytes: &[u8],
    offset: usize,
    length: usize,
    max_code_point_count: Option<usize>,
    is_char_type: bool,
) -> usize {
    let value = &bytes[offset..offset + length];
    if is_char_type {
        let truncated = match max_code_point_count {
            Some(max) => value.code_point_prefix_len(max),
            None => length,
        };
        return value[..truncated].len_without_trailing_spaces();
    }
    match max_code_point_count {
        // A value cannot have more code points than bytes.
        Some(max) if length > max => value.code_point_prefix_len(max),
        _ => length,
    }
}

/// Resolves the truncation bound of a slice type: `None` when values are not
/// truncated.
pub fn max_code_point_count(
    column: &OrcColumn,
    logical_type: &LogicalType,
) -> Result<Option<usize>> {
    match *logical_type {
        LogicalType::Varchar { bound } => Ok(bound.map(|bound| bound as usize)),
        LogicalType::Char { length } => Ok(Some(length as usize)),
        LogicalType::Varbinary => Ok(None),
        _ => Err(Error::incompatible_type(
            column.path(),
            logical_type.to_string(),
            column.column_type().name(),
        )),
    }
}
