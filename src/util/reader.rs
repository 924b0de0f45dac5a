/*!
 Bounded cursor over an immutable byte buffer.

 Every decoder in this crate reads its input through [`BufferReader`]. All
 reads validate bounds before use and fail with
 [`ReaderError::OutOfBounds`] instead of panicking; the cursor never wraps.
*/

use crate::error::reader::ReaderError;

/// Cursor over an immutable byte buffer with bounds-checked reads
#[derive(Debug)]
pub struct BufferReader<'a> {
    /// The buffer we want to read from
    buf: &'a [u8],
    /// The current index we are at in the buffer
    idx: usize,
}

impl<'a> BufferReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, idx: 0 }
    }

    /// The current read offset
    pub fn position(&self) -> usize {
        self.idx
    }

    /// Number of bytes between the cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.idx)
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Move the cursor to an absolute offset; the end of the buffer is a valid position
    pub fn seek(&mut self, idx: usize) -> Result<(), ReaderError> {
        if idx > self.buf.len() {
            return Err(ReaderError::OutOfBounds(idx, self.buf.len()));
        }
        self.idx = idx;
        Ok(())
    }

    /// Advance the cursor without interpreting the skipped bytes
    pub fn skip(&mut self, n: usize) -> Result<(), ReaderError> {
        let end = self
            .idx
            .checked_add(n)
            .ok_or(ReaderError::OutOfBounds(usize::MAX, self.buf.len()))?;
        self.seek(end)
    }

    /// Advance to the next `align`-byte boundary, if not already on one
    pub fn align(&mut self, align: usize) -> Result<(), ReaderError> {
        let rem = self.idx % align;
        if rem != 0 {
            return self.skip(align - rem);
        }
        Ok(())
    }

    /// Read exactly `n` bytes from the buffer
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], ReaderError> {
        let end = self
            .idx
            .checked_add(n)
            .ok_or(ReaderError::OutOfBounds(usize::MAX, self.buf.len()))?;
        let range = self
            .buf
            .get(self.idx..end)
            .ok_or(ReaderError::OutOfBounds(end, self.buf.len()))?;
        self.idx = end;
        Ok(range)
    }

    /// Read a fixed-width field as an array
    fn fixed<const N: usize>(&mut self) -> Result<[u8; N], ReaderError> {
        self.read_exact(N)?
            .try_into()
            .map_err(ReaderError::SliceError)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        Ok(self.fixed::<1>()?[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16, ReaderError> {
        Ok(u16::from_be_bytes(self.fixed()?))
    }

    pub fn read_u16_le(&mut self) -> Result<u16, ReaderError> {
        Ok(u16::from_le_bytes(self.fixed()?))
    }

    pub fn read_i16_le(&mut self) -> Result<i16, ReaderError> {
        Ok(i16::from_le_bytes(self.fixed()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32, ReaderError> {
        Ok(u32::from_be_bytes(self.fixed()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, ReaderError> {
        Ok(u32::from_le_bytes(self.fixed()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, ReaderError> {
        Ok(i32::from_le_bytes(self.fixed()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, ReaderError> {
        Ok(u64::from_le_bytes(self.fixed()?))
    }

    pub fn read_i64_le(&mut self) -> Result<i64, ReaderError> {
        Ok(i64::from_le_bytes(self.fixed()?))
    }

    pub fn read_f32_le(&mut self) -> Result<f32, ReaderError> {
        Ok(f32::from_le_bytes(self.fixed()?))
    }

    pub fn read_f64_le(&mut self) -> Result<f64, ReaderError> {
        Ok(f64::from_le_bytes(self.fixed()?))
    }

    pub fn read_f64_be(&mut self) -> Result<f64, ReaderError> {
        Ok(f64::from_be_bytes(self.fixed()?))
    }

    /// Read a Pascal-style string: a 1-byte length followed by a fixed-width
    /// character field. The cursor always advances past the whole field,
    /// regardless of how much of it the string occupies.
    pub fn read_pascal_string(&mut self, field_width: usize) -> Result<String, ReaderError> {
        let length = usize::from(self.read_u8()?);
        let field = self.read_exact(field_width)?;
        let taken = &field[..length.min(field_width)];
        Ok(String::from_utf8_lossy(taken).into_owned())
    }

    /// Read bytes up to the next NUL; the cursor advances past the NUL
    pub fn read_cstr(&mut self) -> Result<&'a [u8], ReaderError> {
        let rest = &self.buf[self.idx.min(self.buf.len())..];
        let nul = rest
            .iter()
            .position(|byte| *byte == 0)
            .ok_or(ReaderError::OutOfBounds(self.buf.len() + 1, self.buf.len()))?;
        let out = &rest[..nul];
        self.idx += nul + 1;
        Ok(out)
    }
}
