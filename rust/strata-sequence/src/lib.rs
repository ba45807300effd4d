//! In-memory representation of decoded column values.

pub mod bytes_sequence;
pub mod offsets;
pub mod presence;
