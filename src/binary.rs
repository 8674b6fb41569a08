//! Byte-level primitives shared by the decode and encode pipelines.
//!
//! [`Reader`] is a forward-only cursor over an immutable byte buffer: every
//! read consumes exactly the width of its type and advances the position.
//! [`Writer`] is its append-only mirror. All multi-byte values are
//! little-endian.

use byteorder::{ByteOrder, LittleEndian as LE};
use half::f16;
use std::str;

use crate::errors::OsrError;

/// A forward-only read cursor over a byte slice.
///
/// Reading past the end of the buffer returns
/// [`OsrError::TruncatedInput`]; the cursor must not be reused afterwards.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Consume the next `len` raw bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], OsrError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(OsrError::TruncatedInput {
                offset: self.pos,
                needed: len,
            })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, OsrError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, OsrError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, OsrError> {
        Ok(LE::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, OsrError> {
        Ok(LE::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, OsrError> {
        Ok(LE::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, OsrError> {
        Ok(LE::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, OsrError> {
        Ok(LE::read_u64(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, OsrError> {
        Ok(LE::read_i64(self.take(8)?))
    }

    /// Read an IEEE half-precision float, widened to `f32`.
    pub fn read_f16(&mut self) -> Result<f32, OsrError> {
        Ok(f16::from_bits(LE::read_u16(self.take(2)?)).to_f32())
    }

    pub fn read_f32(&mut self) -> Result<f32, OsrError> {
        Ok(LE::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64, OsrError> {
        Ok(LE::read_f64(self.take(8)?))
    }

    /// Read a ULEB128 variable-length unsigned integer: 7 bits of payload
    /// per byte, least-significant group first, high bit as continuation.
    pub fn read_uleb128(&mut self) -> Result<u64, OsrError> {
        let mut val = 0u64;
        let mut shift = 0u32;

        loop {
            let byte = self.read_u8()?;
            if shift >= 64 {
                return Err(OsrError::InvalidVarint);
            }
            val |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }

        Ok(val)
    }

    /// Read a length-prefixed string: marker `0x00` for an empty string, or
    /// `0x0b` followed by a ULEB128 byte length and that many UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String, OsrError> {
        match self.read_u8()? {
            0x00 => Ok(String::new()),
            0x0b => {
                let len = self.read_uleb128()? as usize;
                let raw = self.take(len)?;
                Ok(str::from_utf8(raw)?.to_owned())
            }
            marker => Err(OsrError::InvalidStringMarker(marker)),
        }
    }
}

/// An append-only byte accumulator mirroring every [`Reader`] operation.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    pub fn write_i8(&mut self, val: i8) {
        self.buf.push(val as u8);
    }

    pub fn write_u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_i16(&mut self, val: i16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_i32(&mut self, val: i32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_i64(&mut self, val: i64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Write an `f32` narrowed to an IEEE half-precision float.
    pub fn write_f16(&mut self, val: f32) {
        self.buf.extend_from_slice(&f16::from_f32(val).to_le_bytes());
    }

    pub fn write_f32(&mut self, val: f32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_f64(&mut self, val: f64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_uleb128(&mut self, mut val: u64) {
        loop {
            let group = (val & 0x7f) as u8;
            val >>= 7;
            if val == 0 {
                self.buf.push(group);
                break;
            }
            self.buf.push(group | 0x80);
        }
    }

    /// Write a length-prefixed string. The empty string is a single zero
    /// byte, never a length-prefixed empty payload.
    pub fn write_string(&mut self, val: &str) {
        if val.is_empty() {
            self.buf.push(0x00);
        } else {
            self.buf.push(0x0b);
            self.write_uleb128(val.len() as u64);
            self.buf.extend_from_slice(val.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uleb(val: u64) -> Vec<u8> {
        let mut wtr = Writer::new();
        wtr.write_uleb128(val);
        wtr.into_inner()
    }

    #[test]
    fn uleb128_known_values() {
        assert_eq!(uleb(0), [0x00]);
        assert_eq!(uleb(300), [0xac, 0x02]);
        assert_eq!(uleb(127), [0x7f]);
        assert_eq!(uleb(128), [0x80, 0x01]);
    }

    #[test]
    fn string_known_values() {
        let mut wtr = Writer::new();
        wtr.write_string("");
        assert_eq!(wtr.into_inner(), [0x00]);

        let mut wtr = Writer::new();
        wtr.write_string("hi");
        assert_eq!(wtr.into_inner(), [0x0b, 0x02, b'h', b'i']);
    }

    #[test]
    fn string_bad_marker() {
        let mut rdr = Reader::new(&[0x0c, 0x02, b'h', b'i']);
        assert!(matches!(
            rdr.read_string(),
            Err(OsrError::InvalidStringMarker(0x0c))
        ));
    }

    #[test]
    fn truncated_read() {
        let mut rdr = Reader::new(&[0x01, 0x02]);
        assert!(matches!(
            rdr.read_u32(),
            Err(OsrError::TruncatedInput { offset: 0, needed: 4 })
        ));
    }

    #[test]
    fn fixed_width_order() {
        let mut wtr = Writer::new();
        wtr.write_u16(0x0201);
        wtr.write_i32(-1);
        wtr.write_f16(1.5);
        let bytes = wtr.into_inner();
        assert_eq!(bytes[..2], [0x01, 0x02]);
        assert_eq!(bytes[2..6], [0xff; 4]);

        let mut rdr = Reader::new(&bytes);
        assert_eq!(rdr.read_u16().unwrap(), 0x0201);
        assert_eq!(rdr.read_i32().unwrap(), -1);
        assert_eq!(rdr.read_f16().unwrap(), 1.5);
    }

    #[test]
    fn overlong_uleb128() {
        // a group landing at shift 70 is past 64 bits of payload
        let mut all = vec![0x80u8; 10];
        all.push(0x01);
        let mut rdr = Reader::new(&all);
        assert!(matches!(rdr.read_uleb128(), Err(OsrError::InvalidVarint)));
    }

    proptest! {
        #[test]
        fn uleb128_round_trip(val in 0u64..(1 << 35)) {
            let bytes = uleb(val);
            let mut rdr = Reader::new(&bytes);
            prop_assert_eq!(rdr.read_uleb128().unwrap(), val);
        }

        #[test]
        fn string_round_trip(val in "\\PC*") {
            let mut wtr = Writer::new();
            wtr.write_string(&val);
            let bytes = wtr.into_inner();
            let mut rdr = Reader::new(&bytes);
            prop_assert_eq!(rdr.read_string().unwrap(), val);
        }
    }
}
