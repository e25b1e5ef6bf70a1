//! Bounds-checked little-endian reads over an in-memory buffer.
//!
//! Every read checks the remaining length before a value is materialized and
//! reports a [`OutputError::Truncated`] carrying the offset of the short read.

use byteorder::{ByteOrder, LittleEndian};

use crate::outfile::types::error::{OutputError, Result};

/// A forward-only cursor over an immutable byte buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Cursor positioned at `offset`. Fails if the offset is past the end.
    pub fn at(bytes: &'a [u8], offset: usize, context: &'static str) -> Result<Self> {
        if offset > bytes.len() {
            return Err(OutputError::Truncated {
                context,
                offset: bytes.len(),
                needed: offset - bytes.len(),
                available: 0,
            });
        }
        Ok(Self { bytes, pos: offset })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(OutputError::Truncated {
                context,
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_i32(&mut self, context: &'static str) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4, context)?))
    }

    pub fn read_f32(&mut self, context: &'static str) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4, context)?))
    }

    pub fn read_f64(&mut self, context: &'static str) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.take(8, context)?))
    }

    /// Read `count` consecutive 4-byte integers.
    pub fn read_i32_vec(&mut self, count: usize, context: &'static str) -> Result<Vec<i32>> {
        let bytes = self.take(byte_len(count, 4, self.pos, context)?, context)?;
        let mut out = vec![0i32; count];
        LittleEndian::read_i32_into(bytes, &mut out);
        Ok(out)
    }

    /// Fill `dst` with consecutive 4-byte floats.
    pub fn read_f32_into(&mut self, dst: &mut [f32], context: &'static str) -> Result<()> {
        let bytes = self.take(byte_len(dst.len(), 4, self.pos, context)?, context)?;
        LittleEndian::read_f32_into(bytes, dst);
        Ok(())
    }
}

fn byte_len(count: usize, width: usize, offset: usize, context: &'static str) -> Result<usize> {
    count.checked_mul(width).ok_or(OutputError::Truncated {
        context,
        offset,
        needed: usize::MAX,
        available: 0,
    })
}
