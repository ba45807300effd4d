//! Column reading: column identity, stripe encodings, stream sources, filters and
//! the column readers themselves.

pub mod closer;
pub mod column;
pub mod column_reader;
pub mod encoding;
pub mod filter;
pub mod options;
pub mod stream;
pub mod types;
