//! # Table Façade
//!
//! [`Table`] pairs the data file and the row index of one table, both named
//! from the numeric table id:
//!
//! ```text
//! <directory>/a0000000b.gdbtable   schema and row blobs
//! <directory>/a0000000b.gdbtablx   row id -> byte offset
//! ```
//!
//! Features are addressed by 1-based feature id (`logical row id + 1`).
//! Looking up an absent or deleted feature is not an error; it yields `None`.
//!
//! ## Lifecycle
//!
//! A `Table` owns both readers until [`Table::close`], which drops them.
//! Closing twice is a no-op and every other operation on a closed table
//! fails with [`GdbError::Closed`]. Dropping an open table closes it.
//!
//! ## Usage
//!
//! ```ignore
//! let table = Table::builder()
//!     .directory("./roads.gdb")
//!     .table_id(9)
//!     .open()?;
//!
//! if let Some(row) = table.get_row(1)? {
//!     println!("{row}");
//! }
//!
//! table.scan(|row| {
//!     println!("{}", row.feature_id());
//!     Ok(())
//! })?;
//! ```

mod builder;
mod registry;

pub use builder::TableBuilder;
pub use registry::TableRegistry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use eyre::Result;

use crate::config::{
    ReaderConfig, INDEX_FILE_EXTENSION, TABLE_FILE_EXTENSION, TABLE_FILE_PREFIX,
    TABLE_ID_HEX_WIDTH,
};
use crate::error::GdbError;
use crate::table::{
    FieldDescriptor, GeometryClass, IndexEntries, IndexFile, Row, Schema, TableFile, TableVersion,
};
use crate::types::XmlParser;

/// File stem shared by the two files of table `id`, e.g. `a0000000b`.
pub fn table_file_stem(id: u32) -> String {
    format!("{}{:0width$x}", TABLE_FILE_PREFIX, id, width = TABLE_ID_HEX_WIDTH)
}

/// Path of the data file of table `id` in `directory`.
pub fn table_file_path(directory: &Path, id: u32) -> PathBuf {
    directory.join(format!("{}.{}", table_file_stem(id), TABLE_FILE_EXTENSION))
}

/// Path of the row-index file of table `id` in `directory`.
pub fn index_file_path(directory: &Path, id: u32) -> PathBuf {
    directory.join(format!("{}.{}", table_file_stem(id), INDEX_FILE_EXTENSION))
}

#[derive(Debug)]
struct OpenFiles {
    table: TableFile,
    index: IndexFile,
}

#[derive(Debug)]
pub struct Table {
    table_id: u32,
    directory: PathBuf,
    config: ReaderConfig,
    files: Option<OpenFiles>,
}

impl Table {
    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    /// Opens both files of table `table_id`. A missing data file is an error;
    /// see [`Table::try_open`].
    pub fn open<P: AsRef<Path>>(directory: P, table_id: u32, config: ReaderConfig) -> Result<Self> {
        let directory = directory.as_ref();

        let table = TableFile::open(table_file_path(directory, table_id), config.storage)?;
        let index = IndexFile::open(index_file_path(directory, table_id), config.storage)?;

        if index.row_count() != table.header().row_count {
            tracing::debug!(
                table_id,
                table_rows = table.header().row_count,
                index_rows = index.row_count(),
                "row counts of table and index differ"
            );
        }

        Ok(Self {
            table_id,
            directory: directory.to_path_buf(),
            config,
            files: Some(OpenFiles { table, index }),
        })
    }

    /// Like [`Table::open`], but yields `None` when the table has no data file.
    pub fn try_open<P: AsRef<Path>>(
        directory: P,
        table_id: u32,
        config: ReaderConfig,
    ) -> Result<Option<Self>> {
        let directory = directory.as_ref();
        if !table_file_path(directory, table_id).exists() {
            tracing::debug!(table_id, directory = %directory.display(), "table not present");
            return Ok(None);
        }
        Self::open(directory, table_id, config).map(Some)
    }

    pub fn table_id(&self) -> u32 {
        self.table_id
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.files.is_none()
    }

    /// Releases both readers. Further calls are no-ops.
    pub fn close(&mut self) {
        if self.files.take().is_some() {
            tracing::debug!(table_id = self.table_id, "closed table");
        }
    }

    fn files(&self) -> Result<&OpenFiles> {
        self.files.as_ref().ok_or_else(|| GdbError::Closed.into())
    }

    /// The row with 1-based `feature_id`, or `None` if it is absent.
    pub fn get_row(&self, feature_id: u64) -> Result<Option<Row>> {
        let files = self.files()?;
        let Some(id) = feature_id.checked_sub(1) else {
            return Ok(None);
        };

        match files.index.resolve(id)? {
            Some(offset) => files
                .table
                .read_row(feature_id, offset, &self.config.xml)
                .map(Some),
            None => Ok(None),
        }
    }

    /// Present rows in ascending feature id order.
    ///
    /// A row that fails to decode is yielded as an error and iteration may
    /// continue past it; a failure in the index itself ends the iteration.
    pub fn rows(&self) -> Result<Rows<'_, fn(u64) -> bool>> {
        let files = self.files()?;
        Ok(Rows {
            table: &files.table,
            xml: &self.config.xml,
            entries: files.index.entries(),
        })
    }

    /// Rows whose 0-based logical row id passes `accept`. The predicate runs
    /// before the row's offset is read.
    pub fn rows_filtered<F>(&self, accept: F) -> Result<Rows<'_, F>>
    where
        F: FnMut(u64) -> bool,
    {
        let files = self.files()?;
        Ok(Rows {
            table: &files.table,
            xml: &self.config.xml,
            entries: files.index.entries_filtered(accept),
        })
    }

    /// Hands every present row to `consumer` in ascending feature id order
    /// and returns how many were delivered. The first error, from decoding
    /// or from the consumer, stops the scan.
    pub fn scan<C>(&self, consumer: C) -> Result<u64>
    where
        C: FnMut(Row) -> Result<()>,
    {
        self.scan_filtered(|_| true, consumer)
    }

    pub fn scan_filtered<F, C>(&self, accept: F, mut consumer: C) -> Result<u64>
    where
        F: FnMut(u64) -> bool,
        C: FnMut(Row) -> Result<()>,
    {
        let files = self.files()?;
        files.table.source().advise_sequential();
        files.index.source().advise_sequential();

        let mut delivered = 0u64;
        for row in self.rows_filtered(accept)? {
            let row = row?;
            let feature_id = row.feature_id();

            if let Err(e) = consumer(row) {
                tracing::warn!(
                    table_id = self.table_id,
                    feature_id,
                    delivered,
                    error = %e,
                    "scan aborted by consumer"
                );
                return Err(e);
            }
            delivered += 1;
        }

        Ok(delivered)
    }

    pub fn schema(&self) -> Result<&Arc<Schema>> {
        Ok(self.files()?.table.schema())
    }

    /// Exposed fields in row order; the object-id column is not listed.
    pub fn fields(&self) -> Result<&[FieldDescriptor]> {
        Ok(self.files()?.table.schema().fields())
    }

    /// Field by case-insensitive, trimmed name.
    pub fn field(&self, name: &str) -> Result<&FieldDescriptor> {
        self.files()?.table.schema().field(name)
    }

    pub fn field_index(&self, name: &str) -> Result<Option<usize>> {
        Ok(self.files()?.table.schema().index_of(name))
    }

    pub fn geometry_field(&self) -> Result<Option<&FieldDescriptor>> {
        Ok(self.files()?.table.schema().geometry_field())
    }

    /// Alias of [`Table::geometry_field`].
    pub fn shape_field(&self) -> Result<Option<&FieldDescriptor>> {
        self.geometry_field()
    }

    pub fn has_geometry(&self) -> Result<bool> {
        Ok(self.geometry_field()?.is_some())
    }

    /// Row count from the data file header, deleted rows included.
    pub fn feature_count(&self) -> Result<u64> {
        Ok(self.files()?.table.header().row_count)
    }

    pub fn version(&self) -> Result<TableVersion> {
        Ok(self.files()?.table.header().version)
    }

    pub fn geometry_class(&self) -> Result<GeometryClass> {
        Ok(self.files()?.table.header().geometry_class)
    }

    pub fn xml_parser(&self) -> &XmlParser {
        &self.config.xml
    }
}

/// Iterator returned by [`Table::rows`].
pub struct Rows<'a, F> {
    table: &'a TableFile,
    xml: &'a XmlParser,
    entries: IndexEntries<'a, F>,
}

impl<F> Iterator for Rows<'_, F>
where
    F: FnMut(u64) -> bool,
{
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(entry.and_then(|(feature_id, offset)| self.table.read_row(feature_id, offset, self.xml)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_is_zero_padded_lowercase_hex() {
        assert_eq!(table_file_stem(1), "a00000001");
        assert_eq!(table_file_stem(0xab), "a000000ab");
        assert_eq!(table_file_stem(u32::MAX), "affffffff");
    }

    #[test]
    fn paths_use_both_extensions() {
        let dir = Path::new("/data/roads.gdb");

        assert_eq!(
            table_file_path(dir, 9),
            PathBuf::from("/data/roads.gdb/a00000009.gdbtable")
        );
        assert_eq!(
            index_file_path(dir, 9),
            PathBuf::from("/data/roads.gdb/a00000009.gdbtablx")
        );
    }

    #[test]
    fn missing_table_is_none() {
        let dir = tempfile::tempdir().unwrap();

        let table = Table::try_open(dir.path(), 3, ReaderConfig::default()).unwrap();

        assert!(table.is_none());
        assert!(Table::open(dir.path(), 3, ReaderConfig::default()).is_err());
    }
}
