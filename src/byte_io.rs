// SPDX-License-Identifier: MIT
//! Big-endian byte primitives
//!
//! Reads go through [`ByteReader`], a bounds-checked cursor that never
//! panics on short input. Writes use [`bytes::BufMut`] directly on a
//! `Vec<u8>`; its `put_*` methods are big-endian, matching the file format.

use bytes::Buf;

use crate::error::{MapFileError, Result};

/// Bounds-checked big-endian cursor over a byte slice
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    /// Number of bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    fn ensure(&self, len: usize, what: &str) -> Result<()> {
        if self.buf.remaining() < len {
            return Err(MapFileError::malformed(format!(
                "unexpected end of data reading {} at offset {}: need {} bytes, have {}",
                what,
                self.position,
                len,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1, "u8")?;
        self.position += 1;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2, "u16")?;
        self.position += 2;
        Ok(self.buf.get_u16())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4, "u32")?;
        self.position += 4;
        Ok(self.buf.get_u32())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8, "u64")?;
        self.position += 8;
        Ok(self.buf.get_u64())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2, "i16")?;
        self.position += 2;
        Ok(self.buf.get_i16())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4, "i32")?;
        self.position += 4;
        Ok(self.buf.get_i32())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4, "f32")?;
        self.position += 4;
        Ok(self.buf.get_f32())
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len, "byte run")?;
        let buf: &'a [u8] = self.buf;
        let (head, tail) = buf.split_at(len);
        self.buf = tail;
        self.position += len;
        Ok(head)
    }

    /// Read a `u16` length prefix followed by that many bytes
    pub fn read_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u16()? as usize;
        self.read_bytes(len)
    }
}

/// Borrow `len` bytes of `buf` starting at `start`
pub fn substring(buf: &[u8], start: usize, len: usize) -> Result<&[u8]> {
    start
        .checked_add(len)
        .and_then(|end| buf.get(start..end))
        .ok_or_else(|| {
            MapFileError::malformed(format!(
                "range {}+{} exceeds buffer of {} bytes",
                start,
                len,
                buf.len()
            ))
        })
}

/// Upper-case hex rendering used in debug logs
pub fn bytes_to_hex(buf: &[u8]) -> String {
    hex::encode_upper(buf)
}
