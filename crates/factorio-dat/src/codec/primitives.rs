//! Primitive encoding/decoding shared by the script.dat and PropertyTree formats.
//!
//! All integers are little-endian. Two "packed" unsigned encodings escalate
//! to a trailing u32 when the short form holds its all-ones sentinel.

use crate::error::DecodeError;

const PACKED_U8_ESCAPE: u8 = 0xFF;
const PACKED_U16_ESCAPE: u16 = 0xFFFF;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides bounds-checked reads. The position only
/// ever moves forward. `base` is the absolute offset of `data[0]` within the
/// top-level buffer, so readers carved with [`Reader::sub_reader`] still
/// report positions relative to the whole input.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    /// Returns the current position relative to this reader's slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the current position within the top-level buffer.
    pub fn absolute_position(&self) -> usize {
        self.base + self.pos
    }

    /// Returns the remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Fails with [`DecodeError::UnconsumedTrailingData`] unless every byte was read.
    pub fn expect_end(&self, context: &'static str) -> Result<(), DecodeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::UnconsumedTrailingData {
                context,
                remaining: self.remaining_len(),
                position: self.absolute_position(),
            })
        }
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining_len() {
            return Err(DecodeError::OutOfRange {
                context,
                position: self.absolute_position(),
                needed: n,
                available: self.remaining_len(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    #[inline]
    fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, context)?);
        Ok(out)
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>(context)?[0])
    }

    /// Reads a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self, context: &'static str) -> Result<u16, DecodeError> {
        self.read_array(context).map(u16::from_le_bytes)
    }

    /// Reads a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        self.read_array(context).map(u32::from_le_bytes)
    }

    /// Reads a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        self.read_array(context).map(u64::from_le_bytes)
    }

    /// Reads a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self, context: &'static str) -> Result<i32, DecodeError> {
        self.read_array(context).map(i32::from_le_bytes)
    }

    /// Reads a little-endian i64.
    #[inline]
    pub fn read_i64(&mut self, context: &'static str) -> Result<i64, DecodeError> {
        self.read_array(context).map(i64::from_le_bytes)
    }

    /// Reads a little-endian IEEE-754 double. NaN is passed through.
    #[inline]
    pub fn read_f64(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        self.read_array(context).map(f64::from_le_bytes)
    }

    /// Reads one byte; `0xFF` escapes to a following u32.
    pub fn read_packed_u8_32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let short = self.read_u8(context)?;
        if short == PACKED_U8_ESCAPE {
            self.read_u32(context)
        } else {
            Ok(short as u32)
        }
    }

    /// Reads one u16; `0xFFFF` escapes to a following u32.
    pub fn read_packed_u16_32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let short = self.read_u16(context)?;
        if short == PACKED_U16_ESCAPE {
            self.read_u32(context)
        } else {
            Ok(short as u32)
        }
    }

    /// Reads `len` bytes as UTF-8. `len` is a byte count.
    pub fn read_fixed_str(&mut self, len: usize, field: &'static str) -> Result<&'a str, DecodeError> {
        let position = self.absolute_position();
        let bytes = self.read_bytes(len, field)?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { field, position })
    }

    /// Reads a packed (8→32) length prefix followed by that many UTF-8 bytes.
    #[inline]
    pub fn read_packed_string(
        &mut self,
        max_len: usize,
        field: &'static str,
    ) -> Result<String, DecodeError> {
        let len = self.read_packed_u8_32(field)? as usize;
        if len > max_len {
            return Err(DecodeError::LengthExceedsLimit {
                field,
                len,
                max: max_len,
            });
        }
        self.read_fixed_str(len, field).map(str::to_owned)
    }

    /// Consumes the next `n` bytes and returns an independent reader over them.
    ///
    /// On failure the parent does not move. On success the parent sits
    /// immediately after the carved range.
    pub fn sub_reader(&mut self, n: usize, context: &'static str) -> Result<Reader<'a>, DecodeError> {
        let base = self.absolute_position();
        let data = self.read_bytes(n, context)?;
        Ok(Reader { data, pos: 0, base })
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes the shortest packed (8→32) form of `value`.
    pub fn write_packed_u8_32(&mut self, value: u32) {
        if value < PACKED_U8_ESCAPE as u32 {
            self.write_u8(value as u8);
        } else {
            self.write_u8(PACKED_U8_ESCAPE);
            self.write_u32(value);
        }
    }

    /// Writes the shortest packed (16→32) form of `value`.
    pub fn write_packed_u16_32(&mut self, value: u32) {
        if value < PACKED_U16_ESCAPE as u32 {
            self.write_u16(value as u16);
        } else {
            self.write_u16(PACKED_U16_ESCAPE);
            self.write_u32(value);
        }
    }

    /// Writes a packed (8→32) length prefix followed by the UTF-8 bytes.
    ///
    /// Callers are responsible for keeping `s` under `u32::MAX` bytes.
    pub fn write_packed_string(&mut self, s: &str) {
        self.write_packed_u8_32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_u8("a").unwrap(), 0x01);
        assert_eq!(reader.read_u16("b").unwrap(), 0x0302);
        assert_eq!(reader.read_u32("c").unwrap(), 0x0706_0504);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_packed_u8_32_short() {
        let data = [0x05];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_packed_u8_32("test").unwrap(), 5);
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_packed_u8_32_escaped() {
        let data = [0xFF, 0x00, 0x01, 0x00, 0x00];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_packed_u8_32("test").unwrap(), 256);
        assert_eq!(reader.position(), 5);
    }

    #[test]
    fn test_packed_u16_32() {
        let data = [0x34, 0x12, 0xFF, 0xFF, 0x00, 0x00, 0x01, 0x00];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_packed_u16_32("a").unwrap(), 0x1234);
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read_packed_u16_32("b").unwrap(), 0x0001_0000);
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_packed_writer_boundaries() {
        let mut writer = Writer::new();
        writer.write_packed_u8_32(254);
        writer.write_packed_u8_32(255);
        assert_eq!(writer.as_bytes(), &[0xFE, 0xFF, 0xFF, 0x00, 0x00, 0x00]);

        let mut writer = Writer::new();
        writer.write_packed_u16_32(0xFFFE);
        writer.write_packed_u16_32(0xFFFF);
        assert_eq!(
            writer.as_bytes(),
            &[0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00]
        );
    }

    #[test]
    fn test_f64_le() {
        let mut writer = Writer::new();
        writer.write_f64(3.5);
        assert_eq!(writer.as_bytes(), &3.5f64.to_le_bytes());
        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(reader.read_f64("test").unwrap(), 3.5);
    }

    #[test]
    fn test_fixed_str_counts_bytes() {
        let text = "h\u{e9}llo";
        let mut reader = Reader::new(text.as_bytes());
        assert_eq!(reader.read_fixed_str(6, "test").unwrap(), text);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_fixed_str_invalid_utf8() {
        let data = [0xC3, 0x28];
        let mut reader = Reader::new(&data);
        let err = reader.read_fixed_str(2, "name").unwrap_err();
        assert_eq!(err, DecodeError::InvalidUtf8 { field: "name", position: 0 });
    }

    #[test]
    fn test_out_of_range_does_not_advance() {
        let data = [0u8; 3];
        let mut reader = Reader::new(&data);
        reader.read_u8("first").unwrap();
        let err = reader.read_u32("second").unwrap_err();
        assert_eq!(
            err,
            DecodeError::OutOfRange {
                context: "second",
                position: 1,
                needed: 4,
                available: 2,
            }
        );
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_sub_reader_scoping() {
        let data = [0xAA, 0x01, 0x02, 0x03, 0xBB];
        let mut reader = Reader::new(&data);
        reader.read_u8("lead").unwrap();

        let mut sub = reader.sub_reader(3, "sub").unwrap();
        assert_eq!(reader.position(), 4);
        assert_eq!(sub.absolute_position(), 1);
        assert_eq!(sub.read_u16("x").unwrap(), 0x0201);

        let err = sub.read_u16("y").unwrap_err();
        assert!(matches!(err, DecodeError::OutOfRange { position: 3, .. }));
        assert!(sub.expect_end("sub").is_err());
        sub.read_u8("z").unwrap();
        assert!(sub.expect_end("sub").is_ok());

        assert_eq!(reader.read_u8("tail").unwrap(), 0xBB);
    }

    #[test]
    fn test_sub_reader_too_long() {
        let data = [0u8; 2];
        let mut reader = Reader::new(&data);
        assert!(reader.sub_reader(3, "sub").is_err());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_packed_string_roundtrip() {
        let long = "x".repeat(300);
        for s in ["", "base", long.as_str()] {
            let mut writer = Writer::new();
            writer.write_packed_string(s);
            let mut reader = Reader::new(writer.as_bytes());
            assert_eq!(reader.read_packed_string(1000, "test").unwrap(), s);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_packed_string_too_long() {
        let mut writer = Writer::new();
        writer.write_packed_string(&"y".repeat(20));
        let mut reader = Reader::new(writer.as_bytes());
        let result = reader.read_packed_string(10, "test");
        assert!(matches!(
            result,
            Err(DecodeError::LengthExceedsLimit { len: 20, max: 10, .. })
        ));
    }
}
