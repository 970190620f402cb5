//! # gdbread - FileGDB Table Decoder
//!
//! Read-only decoding of Esri File Geodatabase tables. A table is stored as
//! a pair of files: the data file (`.gdbtable`) holding the schema and row
//! blobs, and the row index (`.gdbtablx`) mapping row ids to byte offsets.
//!
//! - **Zero-copy reads**: files are memory-mapped and decoded in place
//! - **Typed failures**: every error carries a [`GdbError`] root cause
//! - **Never writes**: files are opened read-only
//!
//! ## Quick Start
//!
//! ```ignore
//! use gdbread::{Table, Value};
//!
//! let table = Table::builder()
//!     .directory("./roads.gdb")
//!     .table_id(9)
//!     .open()?;
//!
//! for field in table.fields()? {
//!     println!("{} {}", field.name(), field.kind());
//! }
//!
//! table.scan(|row| {
//!     if let Value::String(name) = row.value_by_name("name")? {
//!         println!("{} {}", row.feature_id(), name);
//!     }
//!     Ok(())
//! })?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Table / TableRegistry (layer)     │
//! ├──────────────────┬──────────────────┤
//! │ TableFile        │ IndexFile        │
//! │ schema, rows     │ offsets, blocks  │
//! ├──────────────────┴──────────────────┤
//! │   Field types, values, geometry     │
//! ├─────────────────────────────────────┤
//! │   ByteCursor, headers, varints      │
//! ├─────────────────────────────────────┤
//! │   FileSource (mmap or buffered)     │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`]: Format constants and [`ReaderConfig`]
//! - [`error`]: [`GdbError`] failure taxonomy
//! - [`encoding`]: Variable-length integer codecs
//! - [`storage`]: File sources, the byte cursor and fixed headers
//! - [`types`]: Field types and decoded values
//! - [`geometry`]: Geometry descriptors and shape decoding
//! - [`table`]: Data file and row index readers
//! - [`layer`]: The [`Table`] façade and [`TableRegistry`]

#[macro_use]
mod macros;

pub mod config;
pub mod encoding;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod storage;
pub mod table;
pub mod types;

pub use config::ReaderConfig;
pub use error::{root_cause, GdbError};
pub use geometry::{GeometryValue, PointValue};
pub use layer::{table_file_stem, Table, TableBuilder, TableRegistry};
pub use storage::StorageKind;
pub use table::{FieldDescriptor, Row, Schema};
pub use types::{FieldKind, FieldType, Value, XmlParser};
