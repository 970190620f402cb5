//! # Table Builder
//!
//! Fluent configuration for opening a [`Table`].
//!
//! | Option       | Default               | Description                          |
//! |--------------|-----------------------|--------------------------------------|
//! | directory    | required              | Geodatabase directory                |
//! | table_id     | required              | Numeric id; names `a%08x.gdbtable`   |
//! | storage      | `StorageKind::Mmap`   | Map the files or read them into RAM  |
//! | xml_parser   | `XmlParser::default()`| Settings used to validate XML cells  |
//!
//! ```ignore
//! let table = Table::builder()
//!     .directory("./roads.gdb")
//!     .table_id(9)
//!     .storage(StorageKind::Buffered)
//!     .open()?;
//! ```

use std::path::{Path, PathBuf};

use eyre::{eyre, Result};

use crate::config::ReaderConfig;
use crate::storage::StorageKind;
use crate::types::XmlParser;

use super::Table;

#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    directory: Option<PathBuf>,
    table_id: Option<u32>,
    config: ReaderConfig,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory<P: AsRef<Path>>(mut self, directory: P) -> Self {
        self.directory = Some(directory.as_ref().to_path_buf());
        self
    }

    pub fn table_id(mut self, id: u32) -> Self {
        self.table_id = Some(id);
        self
    }

    pub fn storage(mut self, kind: StorageKind) -> Self {
        self.config.storage = kind;
        self
    }

    pub fn xml_parser(mut self, xml: XmlParser) -> Self {
        self.config.xml = xml;
        self
    }

    /// Replaces every reader setting at once.
    pub fn config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn get_directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn get_table_id(&self) -> Option<u32> {
        self.table_id
    }

    pub fn get_config(&self) -> &ReaderConfig {
        &self.config
    }

    fn target(&self) -> Result<(&Path, u32)> {
        let directory = self
            .directory
            .as_deref()
            .ok_or_else(|| eyre!("directory not specified: call .directory() first"))?;
        let table_id = self
            .table_id
            .ok_or_else(|| eyre!("table id not specified: call .table_id() first"))?;
        Ok((directory, table_id))
    }

    /// Opens the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or table id is unset, if either file
    /// cannot be read, or if either header or the schema is malformed.
    pub fn open(self) -> Result<Table> {
        let (directory, table_id) = self.target()?;
        Table::open(directory, table_id, self.config)
    }

    /// Opens the table, or yields `None` if its data file does not exist.
    pub fn try_open(self) -> Result<Option<Table>> {
        let (directory, table_id) = self.target()?;
        Table::try_open(directory, table_id, self.config)
    }
}
