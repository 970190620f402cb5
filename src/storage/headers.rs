//! # File Header Definitions
//!
//! Zerocopy views over the fixed-layout prologues of the table file and the
//! row-index file. Each struct is read in place from the mapped region; none
//! of them is ever written back.
//!
//! ## Table File (`.gdbtable`)
//!
//! ```text
//! Offset  Size  Field          Description
//! ------  ----  -------------  ----------------------------------------
//! 0       4     magic          03 00 00 00
//! 4       4     row_count      rows including deleted ones
//! 8       16    reserved
//! 24      4     file_size      size of the file in bytes
//! 28      4     reserved
//! 32      4     field_offset   byte offset of the field section
//! ```
//!
//! The field section begins with its own 12-byte prologue:
//!
//! ```text
//! 0       4     section_len    bytes that follow this word
//! 4       4     version        3 (9.x) or 4 (10.x)
//! 8       1     geometry_class
//! 9       3     reserved
//! ```
//!
//! ## Index File (`.gdbtablx`)
//!
//! ```text
//! 0       4     magic          03 00 00 00
//! 4       4     blocks_present 1024-row blocks that carry offsets
//! 8       4     row_count      rows including absent ones
//! 12      4     size_offset    bytes per offset entry (4, 5 or 6)
//! ```
//!
//! When `blocks_present` is nonzero a block-map prologue follows the offset
//! array:
//!
//! ```text
//! 0       4     magic          0 => dense map, no bitmap bytes
//! 4       4     bit_count      bits in the block bitmap
//! 8       4     blocks_present must repeat the file header value
//! 12      4     reserved
//! ```
//!
//! ## Zerocopy Safety
//!
//! Every struct derives `FromBytes`, `Immutable`, `KnownLayout` and
//! `Unaligned`, so any byte slice of the right length is a valid value and
//! reads need no alignment. Range checks on the decoded fields happen in the
//! `parse` constructors and fail with [`GdbError::Format`].

use eyre::Result;
use zerocopy::little_endian::{I32, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{
    BLOCK_MAP_HEADER_SIZE, FIELD_SECTION_HEADER_SIZE, FILE_MAGIC, INDEX_HEADER_SIZE,
    MAX_FIELD_SECTION_LEN, MAX_OFFSET_WIDTH, MIN_FIELD_SECTION_LEN, MIN_OFFSET_WIDTH,
    TABLE_HEADER_SIZE, VERSION_10, VERSION_9,
};
use crate::error::GdbError;

fn header_slice<'a>(bytes: &'a [u8], at: u64, size: usize, what: &str) -> Result<&'a [u8]> {
    usize::try_from(at)
        .ok()
        .and_then(|start| bytes.get(start..start.checked_add(size)?))
        .ok_or_else(|| {
            GdbError::format(
                at,
                format!(
                    "{} needs {} bytes but the file holds {}",
                    what,
                    size,
                    bytes.len()
                ),
            )
            .into()
        })
}

fn check_magic(magic: &[u8; 4], at: u64) -> Result<()> {
    if *magic != FILE_MAGIC {
        return Err(GdbError::format(at, format!("bad magic {:02x?}", magic)).into());
    }
    Ok(())
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct TableFileHeader {
    magic: [u8; 4],
    row_count: I32,
    reserved: [u8; 16],
    file_size: I32,
    reserved2: [u8; 4],
    field_offset: I32,
}

const _: () = assert!(std::mem::size_of::<TableFileHeader>() == TABLE_HEADER_SIZE);

impl TableFileHeader {
    pub fn new(row_count: i32, file_size: i32, field_offset: i32) -> Self {
        Self {
            magic: FILE_MAGIC,
            row_count: I32::new(row_count),
            reserved: [0u8; 16],
            file_size: I32::new(file_size),
            reserved2: [0u8; 4],
            field_offset: I32::new(field_offset),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<&Self> {
        let slice = header_slice(bytes, 0, TABLE_HEADER_SIZE, "table header")?;
        let header = Self::ref_from_bytes(slice)
            .map_err(|e| eyre::eyre!("failed to parse TableFileHeader: {:?}", e))?;

        check_magic(&header.magic, 0)?;

        if header.field_offset.get() < TABLE_HEADER_SIZE as i32 {
            return Err(GdbError::format(
                32u64,
                format!("field section offset {} overlaps the header", header.field_offset.get()),
            )
            .into());
        }

        Ok(header)
    }

    crate::zerocopy_getters! {
        row_count: i32,
        file_size: i32,
        field_offset: i32,
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct FieldSectionHeader {
    section_len: I32,
    version: I32,
    geometry_class: u8,
    reserved: [u8; 3],
}

const _: () = assert!(std::mem::size_of::<FieldSectionHeader>() == FIELD_SECTION_HEADER_SIZE);

impl FieldSectionHeader {
    pub fn new(section_len: i32, version: i32, geometry_class: u8) -> Self {
        Self {
            section_len: I32::new(section_len),
            version: I32::new(version),
            geometry_class,
            reserved: [0u8; 3],
        }
    }

    /// Reads the prologue at `at`, checking the length and version ranges.
    /// The geometry class is validated by the caller against its own enum.
    pub fn parse(bytes: &[u8], at: u64) -> Result<&Self> {
        let slice = header_slice(bytes, at, FIELD_SECTION_HEADER_SIZE, "field section")?;
        let header = Self::ref_from_bytes(slice)
            .map_err(|e| eyre::eyre!("failed to parse FieldSectionHeader: {:?}", e))?;

        let len = header.section_len.get();
        if !(MIN_FIELD_SECTION_LEN..=MAX_FIELD_SECTION_LEN).contains(&len) {
            return Err(GdbError::format(
                at,
                format!(
                    "field section length {} outside {}..={}",
                    len, MIN_FIELD_SECTION_LEN, MAX_FIELD_SECTION_LEN
                ),
            )
            .into());
        }

        let version = header.version.get();
        if version != VERSION_9 && version != VERSION_10 {
            return Err(GdbError::format(at + 4, format!("unsupported version {}", version)).into());
        }

        Ok(header)
    }

    crate::zerocopy_getters! {
        section_len: i32,
        version: i32,
    }

    pub fn geometry_class(&self) -> u8 {
        self.geometry_class
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct IndexFileHeader {
    magic: [u8; 4],
    blocks_present: I32,
    row_count: I32,
    size_offset: I32,
}

const _: () = assert!(std::mem::size_of::<IndexFileHeader>() == INDEX_HEADER_SIZE);

impl IndexFileHeader {
    pub fn new(blocks_present: i32, row_count: i32, size_offset: i32) -> Self {
        Self {
            magic: FILE_MAGIC,
            blocks_present: I32::new(blocks_present),
            row_count: I32::new(row_count),
            size_offset: I32::new(size_offset),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<&Self> {
        let slice = header_slice(bytes, 0, INDEX_HEADER_SIZE, "index header")?;
        let header = Self::ref_from_bytes(slice)
            .map_err(|e| eyre::eyre!("failed to parse IndexFileHeader: {:?}", e))?;

        check_magic(&header.magic, 0)?;

        let width = header.size_offset.get();
        if !(MIN_OFFSET_WIDTH as i32..=MAX_OFFSET_WIDTH as i32).contains(&width) {
            return Err(GdbError::format(12u64, format!("unsupported offset width {}", width)).into());
        }

        if header.blocks_present.get() < 0 {
            return Err(GdbError::format(
                4u64,
                format!("negative block count {}", header.blocks_present.get()),
            )
            .into());
        }

        if header.row_count.get() < 0 {
            return Err(
                GdbError::format(8u64, format!("negative row count {}", header.row_count.get())).into(),
            );
        }

        Ok(header)
    }

    crate::zerocopy_getters! {
        blocks_present: i32,
        row_count: i32,
        size_offset: i32,
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct BlockMapHeader {
    magic: U32,
    bit_count: U32,
    blocks_present: U32,
    reserved: I32,
}

const _: () = assert!(std::mem::size_of::<BlockMapHeader>() == BLOCK_MAP_HEADER_SIZE);

impl BlockMapHeader {
    pub fn new(magic: u32, bit_count: u32, blocks_present: u32) -> Self {
        Self {
            magic: U32::new(magic),
            bit_count: U32::new(bit_count),
            blocks_present: U32::new(blocks_present),
            reserved: I32::new(0),
        }
    }

    /// Consistency between this prologue and the file header is checked by
    /// the index reader, which knows the row count.
    pub fn parse(bytes: &[u8], at: u64) -> Result<&Self> {
        let slice = header_slice(bytes, at, BLOCK_MAP_HEADER_SIZE, "block map")?;
        Self::ref_from_bytes(slice)
            .map_err(|e| eyre::eyre!("failed to parse BlockMapHeader: {:?}", e))
    }

    crate::zerocopy_getters! {
        magic: u32,
        bit_count: u32,
        blocks_present: u32,
    }

    pub fn is_dense(&self) -> bool {
        self.magic.get() == 0
    }
}
