//! # Row Index Reader
//!
//! A `.gdbtablx` file maps 0-based logical row ids to byte offsets in the
//! sibling table file. Row ids are grouped into blocks of 1024; only blocks
//! that hold at least one row are stored.
//!
//! ## File Layout
//!
//! ```text
//! +------------------+ 0
//! | IndexFileHeader  | magic, blocks present, row count, offset width
//! +------------------+ 16
//! | offset entries   | blocks_present * 1024 entries of `size_offset` bytes
//! +------------------+ 16 + size_offset * blocks_present * 1024
//! | BlockMapHeader   | magic, bit count, blocks present (repeat), reserved
//! +------------------+
//! | block bitmap     | ceil(bit_count / 8) bytes, low bit first
//! +------------------+
//! ```
//!
//! The block map section only exists when `blocks_present > 0`. A block map
//! with magic 0 declares every block present and stores no bitmap bytes.
//!
//! ## Resolving a Row
//!
//! With a sparse block map, entries of absent blocks are not stored, so a
//! row id is first compacted:
//!
//! ```text
//! block   = id / 1024
//! compact = (set bits before block) * 1024 + id % 1024
//! entry   = 16 + compact * size_offset
//! ```
//!
//! The bitmap is held as a [`RoaringBitmap`], whose `rank` answers "set bits
//! up to and including" without a linear count.
//!
//! An entry of 0, or one at or above `i32::MAX`, marks a deleted row.

use std::path::Path;

use eyre::{Result, WrapErr};
use roaring::RoaringBitmap;

use crate::config::{
    BLOCK_MAP_HEADER_SIZE, INDEX_HEADER_SIZE, MAX_BLOCK_MAP_BITS, MAX_ROW_OFFSET, ROWS_PER_BLOCK,
};
use crate::error::GdbError;
use crate::storage::{BlockMapHeader, ByteCursor, FileSource, IndexFileHeader, StorageKind};

#[derive(Debug)]
pub struct IndexFile {
    source: FileSource,
    row_count: u64,
    size_offset: usize,
    blocks_present: u64,
    block_map: Option<RoaringBitmap>,
}

impl IndexFile {
    pub fn open<P: AsRef<Path>>(path: P, storage: StorageKind) -> Result<Self> {
        let path = path.as_ref();
        let source = FileSource::open(path, storage)?;
        Self::from_source(source).wrap_err_with(|| format!("failed to read '{}'", path.display()))
    }

    pub fn from_source(source: FileSource) -> Result<Self> {
        let header = IndexFileHeader::parse(source.bytes())?;

        let row_count = header.row_count() as u64;
        let size_offset = header.size_offset() as usize;
        let blocks_present = header.blocks_present() as u64;

        let block_map = if blocks_present == 0 {
            None
        } else {
            read_block_map(source.bytes(), row_count, size_offset, blocks_present)?
        };

        tracing::debug!(
            path = %source.path().display(),
            rows = row_count,
            blocks_present,
            size_offset,
            sparse = block_map.is_some(),
            "opened index file"
        );

        Ok(Self {
            source,
            row_count,
            size_offset,
            blocks_present,
            block_map,
        })
    }

    /// Rows addressed by the index, deleted rows included.
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn size_offset(&self) -> usize {
        self.size_offset
    }

    pub fn blocks_present(&self) -> u64 {
        self.blocks_present
    }

    pub fn block_map(&self) -> Option<&RoaringBitmap> {
        self.block_map.as_ref()
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Table-file offset of logical row `id`, or `None` when the row is
    /// absent. Absent blocks are answered without touching the entries.
    pub fn resolve(&self, id: u64) -> Result<Option<u64>> {
        if id >= self.row_count {
            return Ok(None);
        }

        let compact = match &self.block_map {
            None => id,
            Some(map) => {
                let block = (id / ROWS_PER_BLOCK) as u32;
                if !map.contains(block) {
                    return Ok(None);
                }
                (map.rank(block) - 1) * ROWS_PER_BLOCK + id % ROWS_PER_BLOCK
            }
        };

        let offset = self.offset_at(compact)?;
        tracing::trace!(id, compact, ?offset, "resolved row offset");
        Ok(offset)
    }

    /// Reads entry `compact` of the stored offset table.
    fn offset_at(&self, compact: u64) -> Result<Option<u64>> {
        let at = INDEX_HEADER_SIZE as u64 + compact * self.size_offset as u64;
        let raw = ByteCursor::at(self.source.bytes(), at).read_bytes(self.size_offset as u64)?;

        let mut buf = [0u8; 8];
        buf[..raw.len()].copy_from_slice(raw);
        let offset = u64::from_le_bytes(buf);

        Ok((offset != 0 && offset < MAX_ROW_OFFSET).then_some(offset))
    }

    /// Present rows in ascending order as `(feature_id, offset)`.
    pub fn entries(&self) -> IndexEntries<'_, fn(u64) -> bool> {
        self.entries_filtered(accept_all as fn(u64) -> bool)
    }

    /// Like [`IndexFile::entries`], but `accept` sees each logical row id
    /// first and rejected rows are never resolved.
    pub fn entries_filtered<F>(&self, accept: F) -> IndexEntries<'_, F>
    where
        F: FnMut(u64) -> bool,
    {
        IndexEntries {
            index: self,
            accept,
            id: 0,
            missing: 0,
            failed: false,
        }
    }
}

fn accept_all(_: u64) -> bool {
    true
}

fn read_block_map(
    bytes: &[u8],
    row_count: u64,
    size_offset: usize,
    blocks_present: u64,
) -> Result<Option<RoaringBitmap>> {
    let at = INDEX_HEADER_SIZE as u64 + size_offset as u64 * blocks_present * ROWS_PER_BLOCK;
    let map = BlockMapHeader::parse(bytes, at)?;

    let bit_count = map.bit_count();
    if bit_count > MAX_BLOCK_MAP_BITS {
        return Err(GdbError::corruption(
            at + 4,
            format!("block map bit count {} exceeds {}", bit_count, MAX_BLOCK_MAP_BITS),
        )
        .into());
    }

    if map.blocks_present() as u64 != blocks_present {
        return Err(GdbError::corruption(
            at + 8,
            format!(
                "block map counts {} blocks, header counts {}",
                map.blocks_present(),
                blocks_present
            ),
        )
        .into());
    }

    if map.is_dense() {
        if bit_count as u64 != blocks_present {
            return Err(GdbError::corruption(
                at + 4,
                format!(
                    "dense block map has {} bits for {} blocks",
                    bit_count, blocks_present
                ),
            )
            .into());
        }
        return Ok(None);
    }

    if row_count > bit_count as u64 * ROWS_PER_BLOCK {
        return Err(GdbError::corruption(
            at + 4,
            format!("{} rows do not fit {} blocks", row_count, bit_count),
        )
        .into());
    }

    let bits_at = at + BLOCK_MAP_HEADER_SIZE as u64;
    let raw = ByteCursor::at(bytes, bits_at).read_bytes(bit_count.div_ceil(8) as u64)?;

    let mut blocks = RoaringBitmap::new();
    for (i, byte) in raw.iter().enumerate() {
        for bit in 0..8u32 {
            let block = i as u32 * 8 + bit;
            if block < bit_count && byte & (1 << bit) != 0 {
                blocks.insert(block);
            }
        }
    }

    if blocks.len() != blocks_present {
        return Err(GdbError::corruption(
            bits_at,
            format!(
                "block bitmap has {} set bits, header counts {} blocks",
                blocks.len(),
                blocks_present
            ),
        )
        .into());
    }

    Ok(Some(blocks))
}

/// Ascending iterator over the present rows of an index.
///
/// Whole absent blocks are skipped in one step. Yields `(feature_id, offset)`
/// with `feature_id = id + 1`. After the first error the iterator is fused.
pub struct IndexEntries<'a, F> {
    index: &'a IndexFile,
    accept: F,
    id: u64,
    /// Rows of absent blocks passed so far; `id - missing` is the compact id.
    missing: u64,
    failed: bool,
}

impl<F> Iterator for IndexEntries<'_, F>
where
    F: FnMut(u64) -> bool,
{
    type Item = Result<(u64, u64)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while self.id < self.index.row_count {
            let id = self.id;

            if let Some(map) = &self.index.block_map {
                if !map.contains((id / ROWS_PER_BLOCK) as u32) {
                    self.id += ROWS_PER_BLOCK;
                    self.missing += ROWS_PER_BLOCK;
                    continue;
                }
            }

            self.id += 1;

            if !(self.accept)(id) {
                continue;
            }

            match self.index.offset_at(id - self.missing) {
                Ok(Some(offset)) => return Some(Ok((id + 1, offset))),
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.wrap_err(format!("while resolving row {}", id))));
                }
            }
        }

        None
    }
}
