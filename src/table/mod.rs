//! # Table and Index Readers
//!
//! The two files of one table, each parsed once at open and then read
//! through `&self`:
//!
//! - `file`: [`TableFile`] header, schema and row decoding
//! - `index`: [`IndexFile`] row id to offset resolution and ascending scan
//! - `schema`: [`Schema`] and [`FieldDescriptor`]
//! - `row`: decoded [`Row`]s
//!
//! The façade in [`crate::layer`] pairs the two readers.

mod file;
mod index;
mod row;
mod schema;

pub use file::{GeometryClass, TableFile, TableHeader, TableVersion};
pub use index::{IndexEntries, IndexFile};
pub use row::Row;
pub use schema::{FieldDescriptor, Schema};
