//! # Format Constants
//!
//! This module centralizes every fixed value of the on-disk format. The layout
//! was reverse-engineered, so most of these numbers have no symbolic meaning
//! beyond "this is what the files contain". Interdependent values are
//! co-located and checked at compile time.
//!
//! ## Dependency Graph
//!
//! ```text
//! INDEX_HEADER_SIZE (16 bytes)
//!       │
//!       └─> offset entry i lives at INDEX_HEADER_SIZE + i * size_offset
//!             size_offset ∈ MIN_OFFSET_WIDTH..=MAX_OFFSET_WIDTH
//!
//! ROWS_PER_BLOCK (1024)
//!       │
//!       ├─> block-map section begins at
//!       │     INDEX_HEADER_SIZE + size_offset * blocks_present * ROWS_PER_BLOCK
//!       │
//!       └─> MAX_BLOCK_MAP_BITS = i32::MAX / ROWS_PER_BLOCK
//!             (a larger bit count would overflow the 1024-scaled row count)
//!
//! TABLE_HEADER_SIZE (36 bytes)
//!       │
//!       └─> the last field of the header is the field-section offset; the
//!           field section itself starts with FIELD_SECTION_HEADER_SIZE bytes
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use gdbread::config::{FILE_MAGIC, ROWS_PER_BLOCK};
//! ```

// ============================================================================
// FILE IDENTIFICATION
// Both the table file and the row-index file begin with the same magic
// ============================================================================

/// Leading four bytes of every `.gdbtable` and `.gdbtablx` file.
pub const FILE_MAGIC: [u8; 4] = [0x03, 0x00, 0x00, 0x00];

/// Extension of the table-data file.
pub const TABLE_FILE_EXTENSION: &str = "gdbtable";

/// Extension of the row-index file.
pub const INDEX_FILE_EXTENSION: &str = "gdbtablx";

/// Prefix of the file stem; the rest is the zero-padded hex table id.
pub const TABLE_FILE_PREFIX: &str = "a";

/// Number of hex digits in the file stem.
pub const TABLE_ID_HEX_WIDTH: usize = 8;

// ============================================================================
// TABLE FILE LAYOUT
// ============================================================================

/// Fixed prefix of the table file: magic, row count, reserved, file size,
/// reserved, field-section offset.
pub const TABLE_HEADER_SIZE: usize = 36;

/// Field-section prologue: section length, version, geometry class, reserved.
pub const FIELD_SECTION_HEADER_SIZE: usize = 12;

/// Bytes of the field-section length word, which the declared length excludes.
pub const FIELD_SECTION_LENGTH_SIZE: usize = 4;

/// Smallest accepted field-section length.
pub const MIN_FIELD_SECTION_LEN: i32 = 10;

/// Largest accepted field-section length.
pub const MAX_FIELD_SECTION_LEN: i32 = 65535;

/// Format version written by FileGDB 9.x.
pub const VERSION_9: i32 = 3;

/// Format version written by FileGDB 10.x.
pub const VERSION_10: i32 = 4;

const _: () = assert!(
    MIN_FIELD_SECTION_LEN >= FIELD_SECTION_HEADER_SIZE as i32 - FIELD_SECTION_LENGTH_SIZE as i32,
    "a field section must at least hold its own prologue"
);

// ============================================================================
// INDEX FILE LAYOUT
// ============================================================================

/// Fixed header of the row-index file.
pub const INDEX_HEADER_SIZE: usize = 16;

/// Size of the block-map section prologue.
pub const BLOCK_MAP_HEADER_SIZE: usize = 16;

/// Rows addressed by one bit of the block-presence bitmap.
pub const ROWS_PER_BLOCK: u64 = 1024;

/// Narrowest offset entry (table files up to 4GB).
pub const MIN_OFFSET_WIDTH: usize = 4;

/// Widest offset entry (table files up to 256TB).
pub const MAX_OFFSET_WIDTH: usize = 6;

/// Largest block-map bit count that still fits a 1024-scaled `i32` row count.
pub const MAX_BLOCK_MAP_BITS: u32 = (i32::MAX as u32) / ROWS_PER_BLOCK as u32;

/// Offsets at or above this value are treated as absent rows.
pub const MAX_ROW_OFFSET: u64 = i32::MAX as u64;

const _: () = assert!(
    MAX_BLOCK_MAP_BITS as u64 * ROWS_PER_BLOCK <= i32::MAX as u64,
    "MAX_BLOCK_MAP_BITS must keep the scaled row count inside i32"
);

const _: () = assert!(
    MIN_OFFSET_WIDTH <= MAX_OFFSET_WIDTH && MAX_OFFSET_WIDTH <= 8,
    "offset widths must fit a u64"
);

// ============================================================================
// GEOMETRY LIMITS
// ============================================================================

/// Upper bound on the point count of a single multipart shape.
pub const MAX_GEOMETRY_POINTS: u64 = 50_000_000;

/// Largest trailer marker value; markers 1..=3 terminate the descriptor trailer.
pub const MAX_TRAILER_MARKER: u8 = 3;

/// Trailer value count that marks a descriptor as carrying 3D grid data.
pub const TRAILER_VALUES_3D: usize = 3;

// ============================================================================
// VALUE CONVERSION
// ============================================================================

/// Seconds in one day, used by the date decoder.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Unix timestamp of the date epoch, 1899-12-30T00:00:00Z.
pub const DATE_EPOCH_UNIX_SECONDS: i64 = -2_209_161_600;

const _: () = assert!(
    DATE_EPOCH_UNIX_SECONDS == -25_569 * 86_400,
    "date epoch must sit 25569 days before 1970-01-01"
);

/// Display truncation for row values, in characters.
pub const ROW_DISPLAY_VALUE_WIDTH: usize = 30;

// ============================================================================
// VARINT LIMITS
// ============================================================================

/// Groups accepted by the 32-bit unsigned codec (5 * 7 = 35 bits ≥ 32).
pub const MAX_VARUINT32_GROUPS: usize = 5;

/// Groups accepted by the 64-bit unsigned codec (10 * 7 = 70 bits ≥ 64).
pub const MAX_VARUINT64_GROUPS: usize = 10;
