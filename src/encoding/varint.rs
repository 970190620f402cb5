//! # Variable-Length Integer Codecs
//!
//! The table format stores lengths, counts, and coordinates as variable-length
//! integers. Two unrelated layouts are in use.
//!
//! ## Unsigned (`varuint32`, `varuint64`)
//!
//! Standard little-endian base-128 groups. Each byte contributes its low seven
//! bits; bit `0x80` means another byte follows.
//!
//! ```text
//! [0x7F]        -> 127
//! [0x80, 0x01]  -> 128
//! [0xAC, 0x02]  -> 300
//! ```
//!
//! ## Signed (`varint32`, `varint64`)
//!
//! Sign-magnitude, not zigzag. The first byte carries a sign flag and the low
//! six magnitude bits; every following byte is a plain seven-bit group.
//!
//! ```text
//! first byte:   C S m m m m m m     C = continue, S = negative, m = bits 0..6
//! next bytes:   C m m m m m m m     shifted by 6, 13, 20, ...
//!
//! [0x01]        -> 1
//! [0x41]        -> -1
//! [0x80, 0x01]  -> 64
//! [0xC0, 0x01]  -> -64
//! ```
//!
//! ## Limits
//!
//! `varuint32` accepts at most five groups and `varuint64` at most ten. A
//! sequence that is still continuing past that budget, or whose payload does
//! not fit the target width, is rejected rather than silently truncated.
//!
//! ## Encoders
//!
//! Encoders mirror each decoder and are used to build fixtures. They write
//! into a caller-provided slice and return the number of bytes written.

use thiserror::Error;

use crate::config::{MAX_VARUINT32_GROUPS, MAX_VARUINT64_GROUPS};

/// Longest encoding produced by [`encode_varuint64`].
pub const MAX_VARUINT64_LEN: usize = MAX_VARUINT64_GROUPS;

/// Longest encoding produced by [`encode_varint64`].
pub const MAX_VARINT64_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarintError {
    #[error("truncated varint after {0} bytes")]
    Truncated(usize),

    #[error("varint exceeds {0} groups")]
    TooLong(usize),

    #[error("varint value does not fit in {0} bits")]
    Overflow(u32),
}

fn decode_unsigned(buf: &[u8], max_groups: usize, bits: u32) -> Result<(u64, usize), VarintError> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i == max_groups {
            return Err(VarintError::TooLong(max_groups));
        }

        let group = (byte & 0x7F) as u64;
        if group != 0 {
            if shift >= bits || (bits - shift < 7 && group >> (bits - shift) != 0) {
                return Err(VarintError::Overflow(bits));
            }
            value |= group << shift;
        }

        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }

    if buf.len() >= max_groups {
        Err(VarintError::TooLong(max_groups))
    } else {
        Err(VarintError::Truncated(buf.len()))
    }
}

/// Decodes an unsigned 32-bit varint, returning the value and bytes consumed.
pub fn decode_varuint32(buf: &[u8]) -> Result<(u32, usize), VarintError> {
    let (value, len) = decode_unsigned(buf, MAX_VARUINT32_GROUPS, 32)?;
    Ok((value as u32, len))
}

/// Decodes an unsigned 64-bit varint, returning the value and bytes consumed.
pub fn decode_varuint64(buf: &[u8]) -> Result<(u64, usize), VarintError> {
    decode_unsigned(buf, MAX_VARUINT64_GROUPS, 64)
}

fn decode_signed(buf: &[u8], bits: u32) -> Result<(i64, usize), VarintError> {
    let first = *buf.first().ok_or(VarintError::Truncated(0))?;

    let negative = first & 0x40 != 0;
    let mut magnitude = (first & 0x3F) as u64;
    let mut len = 1;

    if first & 0x80 != 0 {
        let mut shift: u32 = 6;
        loop {
            let byte = *buf.get(len).ok_or(VarintError::Truncated(len))?;
            len += 1;

            let group = (byte & 0x7F) as u64;
            if group != 0 {
                if shift >= 64 || (shift > 57 && group >> (64 - shift) != 0) {
                    return Err(VarintError::Overflow(bits));
                }
                magnitude |= group << shift;
            }

            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift >= 64 + 7 {
                return Err(VarintError::TooLong(len));
            }
        }
    }

    let limit = if bits == 64 {
        i64::MAX as u64
    } else {
        (1u64 << (bits - 1)) - 1
    };
    if magnitude > limit {
        return Err(VarintError::Overflow(bits));
    }

    let value = magnitude as i64;
    Ok((if negative { -value } else { value }, len))
}

/// Decodes a signed sign-magnitude 32-bit varint.
pub fn decode_varint32(buf: &[u8]) -> Result<(i32, usize), VarintError> {
    let (value, len) = decode_signed(buf, 32)?;
    Ok((value as i32, len))
}

/// Decodes a signed sign-magnitude 64-bit varint.
pub fn decode_varint64(buf: &[u8]) -> Result<(i64, usize), VarintError> {
    decode_signed(buf, 64)
}

/// Encoded length of an unsigned varint without writing it.
pub fn varuint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

pub fn encode_varuint64(mut value: u64, buf: &mut [u8]) -> usize {
    let mut i = 0;
    loop {
        let group = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf[i] = group;
            return i + 1;
        }
        buf[i] = group | 0x80;
        i += 1;
    }
}

pub fn encode_varuint32(value: u32, buf: &mut [u8]) -> usize {
    encode_varuint64(value as u64, buf)
}

pub fn encode_varint64(value: i64, buf: &mut [u8]) -> usize {
    let mut magnitude = value.unsigned_abs();
    let sign = if value < 0 { 0x40 } else { 0x00 };

    let low = (magnitude & 0x3F) as u8 | sign;
    magnitude >>= 6;
    if magnitude == 0 {
        buf[0] = low;
        return 1;
    }
    buf[0] = low | 0x80;

    1 + encode_varuint64(magnitude, &mut buf[1..])
}

pub fn encode_varint32(value: i32, buf: &mut [u8]) -> usize {
    encode_varint64(value as i64, buf)
}
