//! # Encoding Module
//!
//! Variable-length integer codecs used throughout the table format:
//!
//! - **Unsigned varints**: lengths, counts, shape type codes, bounding boxes
//! - **Sign-magnitude varints**: coordinate deltas and small signed values

pub mod varint;

pub use varint::{
    decode_varint32, decode_varint64, decode_varuint32, decode_varuint64, encode_varint32,
    encode_varint64, encode_varuint32, encode_varuint64, varuint_len, VarintError,
};
