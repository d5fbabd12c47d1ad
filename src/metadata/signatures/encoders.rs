//! Encoders for the compressed integer scheme used by blob lengths and signatures.
//!
//! These mirror [`crate::file::parser::Parser::read_compressed_uint`] and
//! [`crate::file::parser::Parser::read_compressed_int`] exactly, including the 3-byte upper
//! class, so anything encoded here decodes to the same value and length. The image builder
//! uses them to length-prefix blobs; benchmarks and tests use them to craft signatures.

use crate::{
    metadata::tables::{CodedIndexType, TableId},
    Result,
};

/// Largest value the 3-byte class can carry.
pub const MAX_COMPRESSED_UINT: u32 = 0x1F_FFFF;

/// Append the compressed encoding of `value` to `buffer`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for values above [`MAX_COMPRESSED_UINT`].
#[allow(clippy::cast_possible_truncation)]
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    match value {
        0..=0x7F => buffer.push(value as u8),
        0x80..=0x3FFF => {
            buffer.push(0x80 | (value >> 8) as u8);
            buffer.push(value as u8);
        }
        0x4000..=MAX_COMPRESSED_UINT => {
            buffer.push(0xC0 | (value >> 16) as u8);
            buffer.push((value >> 8) as u8);
            buffer.push(value as u8);
        }
        _ => {
            return Err(malformed_error!(
                "Value 0x{:X} does not fit a compressed unsigned integer",
                value
            ))
        }
    }

    Ok(())
}

/// Encode `value` as a compressed unsigned integer.
///
/// ```rust
/// use sigscope::metadata::signatures::encode_compressed_uint;
///
/// assert_eq!(encode_compressed_uint(0x03)?, vec![0x03]);
/// assert_eq!(encode_compressed_uint(0x3FFF)?, vec![0xBF, 0xFF]);
/// assert_eq!(encode_compressed_uint(0x4000)?, vec![0xC0, 0x40, 0x00]);
/// # Ok::<(), sigscope::Error>(())
/// ```
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for values above [`MAX_COMPRESSED_UINT`].
pub fn encode_compressed_uint(value: u32) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(3);
    write_compressed_uint(value, &mut buffer)?;
    Ok(buffer)
}

/// Append the compressed, sign-rotated encoding of `value` to `buffer`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for values outside `[-2^20, 2^20)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    let payload_bits = match value {
        -0x40..=0x3F => 6,
        -0x2000..=0x1FFF => 13,
        -0x10_0000..=0x0F_FFFF => 20,
        _ => {
            return Err(malformed_error!(
                "Value {} does not fit a compressed signed integer",
                value
            ))
        }
    };

    let mask = (1_u32 << (payload_bits + 1)) - 1;
    let rotated = ((value << 1) as u32 & mask) | u32::from(value < 0);

    match payload_bits {
        6 => buffer.push(rotated as u8),
        13 => buffer.extend_from_slice(&[0x80 | (rotated >> 8) as u8, rotated as u8]),
        _ => buffer.extend_from_slice(&[
            0xC0 | (rotated >> 16) as u8,
            (rotated >> 8) as u8,
            rotated as u8,
        ]),
    }

    Ok(())
}

/// Encode `value` as a compressed signed integer.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for values outside `[-2^20, 2^20)`.
pub fn encode_compressed_int(value: i32) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(3);
    write_compressed_int(value, &mut buffer)?;
    Ok(buffer)
}

/// Append a compressed `TypeDefOrRef` coded index, as it follows `CLASS`, `VALUETYPE` and
/// custom modifier tags.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `table` is not `TypeDef`, `TypeRef` or `TypeSpec`,
/// or if the packed value is too large.
pub fn write_type_def_or_ref(table: TableId, row: u32, buffer: &mut Vec<u8>) -> Result<()> {
    let coded = CodedIndexType::TypeDefOrRef.encode(table, row)?;
    write_compressed_uint(coded, buffer)
}
