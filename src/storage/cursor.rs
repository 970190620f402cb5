//! # Byte Cursor
//!
//! `ByteCursor` is a positional little-endian reader over a borrowed byte
//! region. It never copies the region; fixed-width reads decode in place and
//! [`ByteCursor::read_bytes`] hands out sub-slices of the underlying buffer.
//!
//! ## Positions
//!
//! Positions are absolute offsets into the region the cursor was created
//! over, so a cursor produced by [`ByteCursor::bounded`] still reports file
//! offsets. A bounded cursor only shortens the readable end.
//!
//! ## Failure
//!
//! Every read past the end, and every malformed varint, fails with
//! [`GdbError::Format`] carrying the position at which the read started.
//! Seeking never fails; the next read past the end does.

use eyre::Result;

use crate::encoding::varint::{
    decode_varint32, decode_varint64, decode_varuint32, decode_varuint64, VarintError,
};
use crate::error::GdbError;

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn at(data: &'a [u8], pos: u64) -> Self {
        let mut cursor = Self::new(data);
        cursor.seek(pos);
        cursor
    }

    /// A cursor at the current position whose readable end is `len` bytes
    /// further on. Reads beyond that end fail even if the region continues.
    pub fn bounded(&self, len: u64) -> Result<ByteCursor<'a>> {
        let end = self.end_of(len)?;
        Ok(ByteCursor {
            data: &self.data[..end],
            pos: self.pos,
        })
    }

    pub fn seek(&mut self, pos: u64) {
        self.pos = usize::try_from(pos).unwrap_or(usize::MAX);
    }

    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> u64 {
        self.data.len().saturating_sub(self.pos) as u64
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.pos = self.end_of(n)?;
        Ok(())
    }

    fn end_of(&self, n: u64) -> Result<usize> {
        usize::try_from(n)
            .ok()
            .and_then(|n| self.pos.checked_add(n))
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                GdbError::format(
                    self.pos,
                    format!(
                        "read of {} bytes past end of data (len={})",
                        n,
                        self.data.len()
                    ),
                )
                .into()
            })
    }

    pub fn read_bytes(&mut self, n: u64) -> Result<&'a [u8]> {
        let start = self.pos;
        let end = self.end_of(n)?;
        self.pos = end;
        Ok(&self.data[start..end])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N as u64)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        let bytes = self.read_bytes(buf.len() as u64)?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// One UTF-16 code unit, stored little-endian.
    pub fn read_char16(&mut self) -> Result<u16> {
        self.read_u16()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_i64()? as u64))
    }

    fn read_varint_with<T>(
        &mut self,
        decode: fn(&[u8]) -> std::result::Result<(T, usize), VarintError>,
    ) -> Result<T> {
        let start = self.pos;
        let tail = self.data.get(start..).unwrap_or(&[]);
        let (value, len) = decode(tail).map_err(|e| GdbError::format(start, e))?;
        self.pos = start + len;
        Ok(value)
    }

    pub fn read_varuint32(&mut self) -> Result<u32> {
        self.read_varint_with(decode_varuint32)
    }

    pub fn read_varuint64(&mut self) -> Result<u64> {
        self.read_varint_with(decode_varuint64)
    }

    pub fn read_varint32(&mut self) -> Result<i32> {
        self.read_varint_with(decode_varint32)
    }

    pub fn read_varint64(&mut self) -> Result<i64> {
        self.read_varint_with(decode_varint64)
    }
}
