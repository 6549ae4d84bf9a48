//! Bounds-checked reader over a borrowed byte slice.

use crate::{StreamError, WireEnum};

type Result<T> = std::result::Result<T, StreamError>;

// ---------------------------------------------------------------------------
// StreamReader
// ---------------------------------------------------------------------------

/// Cursor that pops big-endian values from a byte slice.
///
/// Every pop either consumes exactly the bytes of the value or fails without
/// moving the cursor.
#[derive(Debug, Clone)]
pub struct StreamReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StreamReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` once every byte has been consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Take the next `len` bytes.
    pub fn pop_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(StreamError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.data[start..self.pos])
    }

    /// Take the next `N` bytes as an array.
    pub fn pop_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.pop_raw(N)?);
        Ok(out)
    }

    pub fn pop_u8(&mut self) -> Result<u8> {
        Ok(self.pop_array::<1>()?[0])
    }

    pub fn pop_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.pop_array()?))
    }

    pub fn pop_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.pop_array()?))
    }

    pub fn pop_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.pop_array()?))
    }

    /// Any byte other than `0` or `1` is rejected.
    pub fn pop_bool(&mut self) -> Result<bool> {
        let start = self.pos;
        match self.pop_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => {
                self.pos = start;
                Err(StreamError::OutOfRange {
                    value: u64::from(other),
                    max: 1,
                })
            }
        }
    }

    /// Read a LEB128 size written by
    /// [`StreamWriter::push_var_size`](crate::StreamWriter::push_var_size).
    pub fn pop_var_size(&mut self) -> Result<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        for shift in (0..35).step_by(7) {
            let byte = match self.pop_u8() {
                Ok(byte) => byte,
                Err(e) => {
                    self.pos = start;
                    return Err(e);
                }
            };
            let bits = u32::from(byte & 0x7F);
            // The fifth byte may only carry the top four bits.
            if shift == 28 && bits > 0x0F {
                self.pos = start;
                return Err(StreamError::VarSizeOverflow { offset: start });
            }
            value |= bits << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        self.pos = start;
        Err(StreamError::VarSizeOverflow { offset: start })
    }

    /// Read a string with a variable-width length prefix.
    pub fn pop_string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.pop_var_size()? as usize;
        self.pop_utf8(start, len)
    }

    /// Read a string with a fixed `u32` length prefix.
    pub fn pop_long_string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.pop_u32()? as usize;
        self.pop_utf8(start, len)
    }

    fn pop_utf8(&mut self, start: usize, len: usize) -> Result<String> {
        let payload_offset = self.pos;
        let bytes = match self.pop_raw(len) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.pos = start;
                return Err(e);
            }
        };
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => {
                self.pos = start;
                Err(StreamError::InvalidUtf8 {
                    offset: payload_offset,
                })
            }
        }
    }

    /// Read a one-byte enum discriminant.
    pub fn pop_enum8<E: WireEnum>(&mut self) -> Result<E> {
        let start = self.pos;
        let raw = u16::from(self.pop_u8()?);
        self.decode_enum(start, raw)
    }

    /// Read a `u16` enum discriminant.
    pub fn pop_enum16<E: WireEnum>(&mut self) -> Result<E> {
        let start = self.pos;
        let raw = self.pop_u16()?;
        self.decode_enum(start, raw)
    }

    fn decode_enum<E: WireEnum>(&mut self, start: usize, raw: u16) -> Result<E> {
        E::from_raw(raw).ok_or_else(|| {
            self.pos = start;
            StreamError::OutOfRange {
                value: u64::from(raw),
                max: u64::from(E::MAX_RAW),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StreamWriter;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Season {
        Spring,
        Summer,
        Autumn,
    }

    impl WireEnum for Season {
        const MAX_RAW: u16 = 2;

        fn to_raw(self) -> u16 {
            self as u16
        }

        fn from_raw(raw: u16) -> Option<Self> {
            match raw {
                0 => Some(Self::Spring),
                1 => Some(Self::Summer),
                2 => Some(Self::Autumn),
                _ => None,
            }
        }
    }

    #[test]
    fn eof_reports_offsets_and_keeps_cursor() {
        let mut input = StreamReader::new(&[0x00, 0x01]);
        let err = input.pop_u32().unwrap_err();
        assert_eq!(
            err,
            StreamError::UnexpectedEof {
                offset: 0,
                needed: 4,
                remaining: 2
            }
        );
        assert_eq!(input.position(), 0);
        assert_eq!(input.pop_u16().unwrap(), 1);
        assert!(input.is_exhausted());
    }

    #[test]
    fn bool_rejects_garbage() {
        let mut input = StreamReader::new(&[2]);
        assert_eq!(
            input.pop_bool().unwrap_err(),
            StreamError::OutOfRange { value: 2, max: 1 }
        );
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn enums_round_trip_and_reject_unknown() {
        let mut out = StreamWriter::new();
        out.push_enum8(Season::Autumn);
        out.push_enum16(Season::Summer);
        out.push_u8(9);
        let bytes = out.into_bytes();

        let mut input = StreamReader::new(&bytes);
        assert_eq!(input.pop_enum8::<Season>().unwrap(), Season::Autumn);
        assert_eq!(input.pop_enum16::<Season>().unwrap(), Season::Summer);
        assert_eq!(
            input.pop_enum8::<Season>().unwrap_err(),
            StreamError::OutOfRange { value: 9, max: 2 }
        );
        assert_eq!(input.remaining(), 1);
        assert_eq!(Season::Spring.to_raw(), 0);
    }

    #[test]
    fn var_size_overflow_is_detected() {
        let mut input = StreamReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        assert_eq!(
            input.pop_var_size().unwrap_err(),
            StreamError::VarSizeOverflow { offset: 0 }
        );

        let mut max = StreamReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(max.pop_var_size().unwrap(), u32::MAX);
    }

    #[test]
    fn truncated_var_size_rewinds() {
        let mut input = StreamReader::new(&[0x80, 0x80]);
        assert!(matches!(
            input.pop_var_size(),
            Err(StreamError::UnexpectedEof { .. })
        ));
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut input = StreamReader::new(&[0x02, 0xC3, 0x28]);
        assert_eq!(
            input.pop_string().unwrap_err(),
            StreamError::InvalidUtf8 { offset: 1 }
        );
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn long_string_round_trip() {
        let mut out = StreamWriter::new();
        out.push_long_string("Hafen");
        let bytes = out.into_bytes();
        let mut input = StreamReader::new(&bytes);
        assert_eq!(input.pop_long_string().unwrap(), "Hafen");
    }

    #[test]
    fn pop_array_reads_raw_blocks() {
        let mut input = StreamReader::new(b"VER\0rest");
        assert_eq!(&input.pop_array::<4>().unwrap(), b"VER\0");
        assert_eq!(input.pop_raw(4).unwrap(), b"rest");
    }
}
