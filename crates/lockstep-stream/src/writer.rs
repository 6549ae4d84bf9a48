//! Append-only byte stream.

use crate::WireEnum;

// ---------------------------------------------------------------------------
// StreamWriter
// ---------------------------------------------------------------------------

/// Growable big-endian output buffer.
///
/// Pushing never fails; the writer owns its buffer until
/// [`into_bytes`](Self::into_bytes) hands it to the caller.
#[derive(Debug, Clone, Default)]
pub struct StreamWriter {
    buf: Vec<u8>,
}

impl StreamWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create an empty writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discard everything written so far, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn push_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn push_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn push_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn push_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Booleans take one byte: `0` or `1`.
    pub fn push_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Append a raw block without any length prefix.
    pub fn push_raw(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Append an unsigned size as LEB128: 7 bits per byte, high bit set on
    /// every byte but the last. Values below 128 take a single byte.
    pub fn push_var_size(&mut self, mut value: u32) {
        loop {
            let low = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(low);
                return;
            }
            self.buf.push(low | 0x80);
        }
    }

    /// Append a string as a variable-width length followed by its UTF-8 bytes.
    pub fn push_string(&mut self, value: &str) {
        self.push_var_size(len_u32(value.len()));
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Append a string with a fixed `u32` length prefix (legacy layout).
    pub fn push_long_string(&mut self, value: &str) {
        self.push_u32(len_u32(value.len()));
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Append an enum discriminant as a single byte.
    pub fn push_enum8<E: WireEnum>(&mut self, value: E) {
        let raw = value.to_raw();
        debug_assert!(raw <= u16::from(u8::MAX), "enum value {raw} does not fit a byte");
        self.buf.push(raw as u8);
    }

    /// Append an enum discriminant as a `u16`.
    pub fn push_enum16<E: WireEnum>(&mut self, value: E) {
        self.push_u16(value.to_raw());
    }
}

/// Snapshot containers never approach 4 GiB; a longer one is a caller bug.
fn len_u32(len: usize) -> u32 {
    debug_assert!(u32::try_from(len).is_ok(), "length {len} exceeds u32");
    len as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut out = StreamWriter::new();
        out.push_u16(0x0102);
        out.push_u32(0x0304_0506);
        out.push_i32(-2);
        assert_eq!(
            out.as_bytes(),
            &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xFF, 0xFF, 0xFF, 0xFE]
        );
    }

    #[test]
    fn var_size_widths() {
        let cases: [(u32, usize); 5] = [(0, 1), (127, 1), (128, 2), (16_383, 2), (u32::MAX, 5)];
        for (value, width) in cases {
            let mut out = StreamWriter::new();
            out.push_var_size(value);
            assert_eq!(out.len(), width, "width of {value}");
        }
    }

    #[test]
    fn var_size_encoding_of_300() {
        let mut out = StreamWriter::new();
        out.push_var_size(300);
        assert_eq!(out.as_bytes(), &[0xAC, 0x02]);
    }

    #[test]
    fn string_prefixes() {
        let mut short = StreamWriter::new();
        short.push_string("abc");
        assert_eq!(short.as_bytes(), b"\x03abc");

        let mut long = StreamWriter::new();
        long.push_long_string("abc");
        assert_eq!(long.as_bytes(), b"\x00\x00\x00\x03abc");
    }

    #[test]
    fn clear_keeps_writer_usable() {
        let mut out = StreamWriter::with_capacity(16);
        out.push_u32(1);
        out.clear();
        assert!(out.is_empty());
        out.push_bool(false);
        assert_eq!(out.into_bytes(), vec![0]);
    }
}
