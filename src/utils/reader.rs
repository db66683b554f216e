//! `StringReader`: a forward-only cursor over bytes that arrive as hex.
//!
//! The hex is decoded once on construction; every read is bounds-checked and
//! returns [`CodecError::UnexpectedEof`] instead of panicking.

use crate::error::{CodecError, Result};
use crate::utils::bytes::hex_decode;

/// Cursor over a byte buffer. The position only ever moves forward.
#[derive(Debug, Clone)]
pub struct StringReader {
    data: Vec<u8>,
    pos: usize,
}

impl StringReader {
    /// Decode `hex` (optionally `0x`-prefixed) and position at the start.
    pub fn new(hex: &str) -> Result<Self> {
        Ok(Self::from_bytes(hex_decode(hex)?))
    }

    /// Wrap raw bytes.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into(), pos: 0 }
    }

    /// Current offset from the start of the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether the whole buffer has been consumed.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Next byte without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Read exactly `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&[u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..self.pos])
    }

    /// Read exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a single byte as a boolean (any non-zero value is `true`).
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a varint. Non-canonical (overlong) encodings are accepted.
    pub fn read_var_uint(&mut self) -> Result<u64, CodecError> {
        let offset = self.pos;
        let (value, canonical_min) = match self.read_u8()? {
            0xfd => (u64::from(self.read_u16_le()?), 0xfd),
            0xfe => (u64::from(self.read_u32_le()?), 0x1_0000),
            0xff => (self.read_u64_le()?, 0x1_0000_0000),
            b => (u64::from(b), 0),
        };
        if value < canonical_min {
            tracing::trace!(offset, value, "accepted non-canonical varint");
        }
        Ok(value)
    }

    /// Read a varint that must fit in `usize` and in the remaining input.
    pub fn read_len(&mut self) -> Result<usize, CodecError> {
        let offset = self.pos;
        let len = self.read_var_uint()?;
        usize::try_from(len).map_err(|_| CodecError::UnexpectedEof {
            offset,
            needed: usize::MAX,
            remaining: self.remaining(),
        })
    }

    /// Read `varint(len) || bytes`.
    pub fn read_var_bytes(&mut self) -> Result<&[u8], CodecError> {
        let len = self.read_len()?;
        self.read(len)
    }

    /// Read `varint(len) || utf8`.
    pub fn read_var_str(&mut self) -> Result<String, CodecError> {
        let bytes = self.read_var_bytes()?.to_vec();
        String::from_utf8(bytes).map_err(|_| CodecError::Malformed("string is not utf-8".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance_monotonically() {
        let mut sr = StringReader::new("0x0102030405").unwrap();
        assert_eq!(sr.peek(), Some(1));
        assert_eq!(sr.read(2).unwrap(), &[1, 2]);
        assert_eq!(sr.position(), 2);
        assert_eq!(sr.read_u16_le().unwrap(), 0x0403);
        assert_eq!(sr.remaining(), 1);
        assert_eq!(sr.read_u8().unwrap(), 5);
        assert!(sr.is_eof());
        assert_eq!(sr.peek(), None);
    }

    #[test]
    fn reading_past_end_is_an_error() {
        let mut sr = StringReader::new("0102").unwrap();
        let err = sr.read(3).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnexpectedEof { offset: 0, needed: 3, remaining: 2 }
        );
        // Position is untouched by a failed read.
        assert_eq!(sr.position(), 0);
        assert!(sr.read_u32_le().is_err());
    }

    #[test]
    fn var_bytes_length_beyond_input() {
        // Declares 255 bytes with only 2 present.
        let mut sr = StringReader::new("fdff000102").unwrap();
        assert!(matches!(sr.read_var_bytes(), Err(CodecError::UnexpectedEof { .. })));
        // u64::MAX length must not allocate or panic.
        let mut sr = StringReader::new("ffffffffffffffffff").unwrap();
        assert!(sr.read_var_bytes().is_err());
    }

    #[test]
    fn varint_accepts_non_canonical() {
        let mut sr = StringReader::new("fd0500").unwrap();
        assert_eq!(sr.read_var_uint().unwrap(), 5);
        let mut sr = StringReader::new("fe00000100").unwrap();
        assert_eq!(sr.read_var_uint().unwrap(), 0x1_0000);
    }

    #[test]
    fn strings() {
        let mut sr = StringReader::new("036b657901").unwrap();
        assert_eq!(sr.read_var_str().unwrap(), "key");
        assert!(sr.read_bool().unwrap());
        let mut bad = StringReader::from_bytes(vec![1u8, 0xff]);
        assert!(matches!(bad.read_var_str(), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(StringReader::new("zz").is_err());
    }
}
