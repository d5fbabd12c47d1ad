//! Low-level byte stream parser for metadata blob decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser for reading signature blobs and custom attribute payloads. It offers bounds-checked
//! access to little-endian primitives and the variable-length compressed integer encoding used
//! throughout the blob heap.
//!
//! # Compressed integers
//!
//! The first byte selects one of three size classes:
//!
//! | First byte     | Length | Value                                          |
//! |----------------|--------|------------------------------------------------|
//! | `0x00..=0x7F`  | 1      | `b0`                                           |
//! | `0x80..=0xBF`  | 2      | `((b0 & 0x3F) << 8) \| b1`                     |
//! | `0xC0..=0xDF`  | 3      | `((b0 & 0x1F) << 16) \| (b1 << 8) \| b2`       |
//! | `0xE0..=0xFF`  | -      | malformed                                      |
//!
//! # Usage Examples
//!
//! ```rust
//! use sigscope::Parser;
//!
//! let data = [0x03, 0x80, 0x80, 0xC0, 0x40, 0x00];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_compressed_uint()?, 3);
//! assert_eq!(parser.read_compressed_uint()?, 0x80);
//! assert_eq!(parser.read_compressed_uint()?, 0x4000);
//! assert!(!parser.has_more_data());
//! # Ok::<(), sigscope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    Error::OutOfBounds,
    Result,
};

/// A binary data parser for reading metadata blobs.
///
/// `Parser` maintains an internal position and validates every read against the remaining
/// data, so truncated or hostile input surfaces as [`crate::Error::OutOfBounds`] rather than a
/// panic. Cloning a parser yields an independent cursor over the same bytes.
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes left after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Move the position forward by one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing would exceed the data length.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.remaining() {
            return Err(OutOfBounds);
        }

        self.position += step;
        Ok(())
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.position).copied().ok_or(OutOfBounds)
    }

    /// Read a value of type `T` in little-endian format and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `T` would exceed the data length.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read `length` raw bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        if length > self.remaining() {
            return Err(OutOfBounds);
        }

        let bytes = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(bytes)
    }

    /// Read a compressed unsigned integer and return it together with its encoded length.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a first byte of `0xE0` or above, and
    /// [`crate::Error::OutOfBounds`] if the encoding is truncated.
    pub fn read_compressed_uint_with_len(&mut self) -> Result<(u32, usize)> {
        let first_byte = self.peek_byte()?;

        // 1-byte encoding: 0xxxxxxx
        if first_byte < 0x80 {
            self.position += 1;
            return Ok((u32::from(first_byte), 1));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if first_byte < 0xC0 {
            let bytes = self.read_bytes(2)?;
            let value = ((u32::from(bytes[0]) & 0x3F) << 8) | u32::from(bytes[1]);
            return Ok((value, 2));
        }

        // 3-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx
        if first_byte < 0xE0 {
            let bytes = self.read_bytes(3)?;
            let value = ((u32::from(bytes[0]) & 0x1F) << 16)
                | (u32::from(bytes[1]) << 8)
                | u32::from(bytes[2]);
            return Ok((value, 3));
        }

        Err(malformed_error!("Invalid compressed uint - 0x{:02X}", first_byte))
    }

    /// Read a compressed unsigned integer.
    ///
    /// # Errors
    /// See [`Parser::read_compressed_uint_with_len`].
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        Ok(self.read_compressed_uint_with_len()?.0)
    }

    /// Read a compressed signed integer.
    ///
    /// The value is stored rotated: bit 0 carries the sign, the remaining bits of the size
    /// class carry the two's complement payload (6, 13 or 20 bits).
    ///
    /// # Errors
    /// See [`Parser::read_compressed_uint_with_len`].
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let (raw, length) = self.read_compressed_uint_with_len()?;
        let payload_bits = match length {
            1 => 6,
            2 => 13,
            _ => 20,
        };

        #[allow(clippy::cast_possible_wrap)]
        let magnitude = (raw >> 1) as i32;
        if raw & 1 == 0 {
            Ok(magnitude)
        } else {
            Ok(magnitude - (1 << payload_bits))
        }
    }

    /// Read a compressed-length prefixed UTF-8 string.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the string is truncated, or
    /// [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
    pub fn read_compressed_string_utf8(&mut self) -> Result<String> {
        let length = self.read_compressed_uint()? as usize;
        let start = self.position;
        let string_data = self.read_bytes(length)?;

        String::from_utf8(string_data.to_vec()).map_err(|e| {
            malformed_error!(
                "Invalid UTF-8 compressed string at offset {}-{}: {}",
                start,
                start + length,
                e.utf8_error()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::signatures::encode_compressed_uint, Error};

    #[test]
    fn test_read_compressed_uint() {
        let test_cases = vec![
            (vec![0x03], 3, 1),                  // 1-byte format
            (vec![0x7F], 0x7F, 1),               // 1-byte format, max value
            (vec![0x80, 0x80], 0x80, 2),         // 2-byte format, min value
            (vec![0xBF, 0xFF], 0x3FFF, 2),       // 2-byte format, max value
            (vec![0xC0, 0x40, 0x00], 0x4000, 3), // 3-byte format
            (vec![0xDF, 0xFF, 0xFF], 0x1F_FFFF, 3), // 3-byte format, max value
        ];

        for (input, expected, length) in test_cases {
            let mut parser = Parser::new(&input);
            let result = parser.read_compressed_uint_with_len().unwrap();
            assert_eq!(result, (expected, length));
            assert_eq!(parser.pos(), length);
        }

        // Error on empty data
        let mut parser = Parser::new(&[]);
        assert!(matches!(
            parser.read_compressed_uint(),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn test_compressed_uint_size_class_boundaries() {
        for value in [0, 1, 0x7F, 0x80, 0x1234, 0x3FFF, 0x4000, 0x12_3456, 0x1F_FFFF] {
            let encoded = encode_compressed_uint(value).unwrap();
            let mut parser = Parser::new(&encoded);
            let (decoded, length) = parser.read_compressed_uint_with_len().unwrap();
            assert_eq!(decoded, value);
            assert_eq!(length, encoded.len());
        }
    }

    #[test]
    fn test_compressed_uint_invalid_prefix() {
        for first in [0xE0_u8, 0xF0, 0xFF] {
            let data = [first, 0x00, 0x00, 0x00];
            let mut parser = Parser::new(&data);
            assert!(matches!(
                parser.read_compressed_uint(),
                Err(Error::Malformed { .. })
            ));
        }
    }

    #[test]
    fn test_compressed_uint_truncated() {
        let mut parser = Parser::new(&[0x80]);
        assert!(matches!(
            parser.read_compressed_uint(),
            Err(Error::OutOfBounds)
        ));
        assert_eq!(parser.pos(), 0);

        let mut parser = Parser::new(&[0xC0, 0x01]);
        assert!(matches!(
            parser.read_compressed_uint(),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn test_read_compressed_int() {
        let test_cases = vec![
            (vec![0x06], 3),
            (vec![0x7B], -3),
            (vec![0x80, 0x80], 64),
            (vec![0x01], -64),
            (vec![0xC0, 0x40, 0x00], 8192),
            (vec![0x80, 0x01], -8192),
            (vec![0x00], 0),
            (vec![0x7F], -1),
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            assert_eq!(parser.read_compressed_int().unwrap(), expected, "{input:?}");
        }
    }

    #[test]
    fn test_read_bytes_and_peek() {
        let data = [0x01, 0x02, 0x03];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.peek_byte().unwrap(), 0x01);
        assert_eq!(parser.read_bytes(2).unwrap(), &[0x01, 0x02]);
        assert_eq!(parser.remaining(), 1);
        assert!(matches!(parser.read_bytes(2), Err(Error::OutOfBounds)));
        parser.advance().unwrap();
        assert!(matches!(parser.peek_byte(), Err(Error::OutOfBounds)));
        assert!(matches!(parser.advance(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_read_compressed_string() {
        let data = [0x05, b'h', b'e', b'l', b'l', b'o', 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_compressed_string_utf8().unwrap(), "hello");
        assert_eq!(parser.pos(), 6);

        let mut parser = Parser::new(&[0x02, 0xC3, 0x28]);
        assert!(matches!(
            parser.read_compressed_string_utf8(),
            Err(Error::Malformed { .. })
        ));
    }
}
