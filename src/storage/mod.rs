//! # Storage Module
//!
//! The storage layer exposes a table's two files as immutable byte regions and
//! provides the positional reader every decoder runs on.
//!
//! ## Architecture Overview
//!
//! Files are memory-mapped read-only by default. Instead of copying data
//! between kernel and user space, decoders borrow `&[u8]` slices straight out
//! of the mapping:
//!
//! - **Zero-copy reads**: headers are zerocopy views, string and binary cells
//!   are sliced before conversion
//! - **Minimal syscall overhead**: page faults are the only suspension point
//! - **No shared cursor state**: every read creates its own [`ByteCursor`],
//!   so an open table's readers take `&self`
//!
//! ## File Layout
//!
//! ```text
//! gdb_dir/
//! ├── a00000001.gdbtable   # system catalog data
//! ├── a00000001.gdbtablx   # system catalog row index
//! ├── a00000009.gdbtable   # user table data
//! └── a00000009.gdbtablx   # user table row index
//! ```
//!
//! ## Module Organization
//!
//! - `mmap`: [`FileSource`] and [`StorageKind`]
//! - `cursor`: [`ByteCursor`] little-endian and varint reads
//! - `headers`: zerocopy prologue structs for both files

mod cursor;
mod headers;
mod mmap;

pub use cursor::ByteCursor;
pub use headers::{BlockMapHeader, FieldSectionHeader, IndexFileHeader, TableFileHeader};
pub use mmap::{FileSource, StorageKind};
