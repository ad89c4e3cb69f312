//! Little-endian primitives over dictionary regions.
//!
//! All readers take the whole buffer and an absolute offset and return the
//! advanced offset, mirroring the on-disk format where several regions
//! reference file positions directly. Any out-of-bounds access is a corrupt
//! dictionary, not a panic.

use nom::bytes::complete::take;
use nom::number::complete::{le_i16, le_i32, le_i64, le_u16, le_u32, le_u64, le_u8};

use crate::errors::{Result, StaccatoError};

/// String encoding of a dictionary, part of the on-disk contract.
///
/// The two modes differ in their length prefixes: UTF-8 mode uses a 1–2
/// byte high-bit-continued byte count, UTF-16 mode a single byte counting
/// code units.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TextEncoding {
    Utf8,
    Utf16,
}

impl TextEncoding {
    #[inline]
    pub fn string_at(self, buf: &[u8], offset: usize) -> Result<(usize, String)> {
        match self {
            Self::Utf8 => utf8_string_at(buf, offset),
            Self::Utf16 => utf16_string_at(buf, offset),
        }
    }
}

#[inline]
fn region(buf: &[u8], offset: usize) -> Result<&[u8]> {
    buf.get(offset..).ok_or_else(|| {
        StaccatoError::corrupt_dictionary(format!("offset {offset} is out of range"))
    })
}

#[inline]
fn corrupt(_: nom::Err<nom::error::Error<&[u8]>>) -> StaccatoError {
    StaccatoError::corrupt_dictionary("unexpected end of a dictionary region")
}

macro_rules! scalar_reader {
    ($name:ident, $ty:ty, $parser:ident, $width:expr) => {
        #[inline]
        pub fn $name(buf: &[u8], offset: usize) -> Result<(usize, $ty)> {
            let rest = region(buf, offset)?;
            let (_, v) = $parser::<_, nom::error::Error<&[u8]>>(rest).map_err(corrupt)?;
            Ok((offset + $width, v))
        }
    };
}

scalar_reader!(u8_at, u8, le_u8, 1);
scalar_reader!(u16_at, u16, le_u16, 2);
scalar_reader!(i16_at, i16, le_i16, 2);
scalar_reader!(u32_at, u32, le_u32, 4);
scalar_reader!(i32_at, i32, le_i32, 4);
scalar_reader!(u64_at, u64, le_u64, 8);
scalar_reader!(i64_at, i64, le_i64, 8);

#[inline]
pub fn bytes_at(buf: &[u8], offset: usize, len: usize) -> Result<(usize, &[u8])> {
    let rest = region(buf, offset)?;
    let (_, v) = take::<_, _, nom::error::Error<&[u8]>>(len)(rest).map_err(corrupt)?;
    Ok((offset + len, v))
}

/// Decodes the shared 1–2 byte string-length prefix: a first byte below
/// 0x80 is the length itself; otherwise the low 7 bits continue into the
/// second byte.
#[inline]
pub fn string_length_at(buf: &[u8], offset: usize) -> Result<(usize, usize)> {
    let (offset, first) = u8_at(buf, offset)?;
    if first & 0x80 == 0x80 {
        let (offset, second) = u8_at(buf, offset)?;
        let high = usize::from(first & 0x7F);
        Ok((offset, (high << 8) | usize::from(second)))
    } else {
        Ok((offset, usize::from(first)))
    }
}

/// String in UTF-8 mode: variable-width length prefix, then that many
/// UTF-8 bytes.
pub fn utf8_string_at(buf: &[u8], offset: usize) -> Result<(usize, String)> {
    let (offset, len) = string_length_at(buf, offset)?;
    let (offset, raw) = bytes_at(buf, offset, len)?;
    let s = std::str::from_utf8(raw)
        .map_err(|_| StaccatoError::corrupt_dictionary("dictionary string is not valid UTF-8"))?;
    Ok((offset, s.to_string()))
}

/// String in UTF-16 compatibility mode: a single byte counts code units,
/// the payload is little-endian UTF-16.
pub fn utf16_string_at(buf: &[u8], offset: usize) -> Result<(usize, String)> {
    let (offset, len) = u8_at(buf, offset)?;
    let len = usize::from(len);
    let (offset, raw) = bytes_at(buf, offset, len * 2)?;
    let mut units = Vec::with_capacity(len);
    for i in 0..len {
        units.push(u16::from_le_bytes([raw[i * 2], raw[i * 2 + 1]]));
    }
    let s = String::from_utf16(&units)
        .map_err(|_| StaccatoError::corrupt_dictionary("dictionary string is not valid UTF-16"))?;
    Ok((offset, s.to_string()))
}

/// Length-prefixed array of 32-bit word references: a count byte then that
/// many little-endian `u32` values.
pub fn u32_array_at(buf: &[u8], offset: usize) -> Result<(usize, Vec<u32>)> {
    let (mut offset, len) = u8_at(buf, offset)?;
    let mut array = Vec::with_capacity(usize::from(len));
    for _ in 0..len {
        let (next, v) = u32_at(buf, offset)?;
        array.push(v);
        offset = next;
    }
    Ok((offset, array))
}
