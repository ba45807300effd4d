//! Stream sources over already decoded, in-memory values.

use std::sync::Arc;

use strata_common::{Result, error::Error};

use super::{
    BooleanInputStream, ByteArrayInputStream, InputStream, InputStreamSource, LongInputStream,
    StreamId,
};

/// A stream source holding its decoded values in memory.
#[derive(Debug, Clone)]
pub enum MemoryStreamSource {
    Boolean(Arc<[bool]>),
    Long(Arc<[i64]>),
    Bytes(Arc<[u8]>),
}

impl MemoryStreamSource {
    pub fn booleans(values: impl Into<Arc<[bool]>>) -> MemoryStreamSource {
        MemoryStreamSource::Boolean(values.into())
    }

    pub fn longs(values: impl Into<Arc<[i64]>>) -> MemoryStreamSource {
        MemoryStreamSource::Long(values.into())
    }

    pub fn bytes(values: impl Into<Arc<[u8]>>) -> MemoryStreamSource {
        MemoryStreamSource::Bytes(values.into())
    }
}

impl InputStreamSource for MemoryStreamSource {
    fn open(&self, id: StreamId) -> Result<InputStream> {
        Ok(match self {
            MemoryStreamSource::Boolean(values) => {
                InputStream::Boolean(Box::new(MemoryStream::new(id, values.clone())))
            }
            MemoryStreamSource::Long(values) => {
                InputStream::Long(Box::new(MemoryStream::new(id, values.clone())))
            }
            MemoryStreamSource::Bytes(values) => {
                InputStream::Bytes(Box::new(MemoryStream::new(id, values.clone())))
            }
        })
    }
}

/// Cursor over a shared slice of values.
struct MemoryStream<T> {
    id: StreamId,
    values: Arc<[T]>,
    pos: usize,
}

impl<T: Copy> MemoryStream<T> {
    fn new(id: StreamId, values: Arc<[T]>) -> MemoryStream<T> {
        MemoryStream { id, values, pos: 0 }
    }

    /// Consumes the next `count` values.
    fn take(&mut self, count: usize) -> Result<&[T]> {
        let remaining = self.values.len() - self.pos;
        if count > remaining {
            return Err(Error::corruption(
                self.id.column.to_string(),
                format!(
                    "stream {} ended: requested {count} values, {remaining} left",
                    self.id
                ),
            ));
        }
        let start = self.pos;
        self.pos += count;
        Ok(&self.values[start..self.pos])
    }
}

impl BooleanInputStream for MemoryStream<bool> {
    fn next_vector(&mut self, count: usize, out: &mut Vec<bool>) -> Result<()> {
        let values = self.take(count)?;
        out.clear();
        out.extend_from_slice(values);
        Ok(())
    }

    fn count_bits_set(&mut self, count: usize) -> Result<usize> {
        Ok(self.take(count)?.iter().filter(|&&bit| bit).count())
    }
}

impl LongInputStream for MemoryStream<i64> {
    fn next_vector(&mut self, count: usize, out: &mut Vec<i64>) -> Result<()> {
        let values = self.take(count)?;
        out.clear();
        out.extend_from_slice(values);
        Ok(())
    }

    fn sum(&mut self, count: usize) -> Result<i64> {
        let id = self.id;
        self.take(count)?
            .iter()
            .try_fold(0i64, |acc, &v| acc.checked_add(v))
            .ok_or_else(|| {
                Error::corruption(id.column.to_string(), format!("stream {id} sum overflows"))
            })
    }
}

impl ByteArrayInputStream for MemoryStream<u8> {
    fn next(&mut self, out: &mut [u8]) -> Result<()> {
        let values = self.take(out.len())?;
        out.copy_from_slice(values);
        Ok(())
    }

    fn skip(&mut self, count: u64) -> Result<()> {
        let remaining = (self.values.len() - self.pos) as u64;
        if count > remaining {
            return Err(Error::corruption(
                self.id.column.to_string(),
                format!(
                    "stream {} cannot skip {count} bytes, {remaining} left",
                    self.id
                ),
            ));
        }
        self.pos += count as usize;
        Ok(())
    }
}
