//! # Open-Table Registry
//!
//! An arena of open [`Table`]s keyed by table id, owned by whatever composes
//! tables into a geodatabase. It guarantees at most one open reader pair per
//! id and closes each pair exactly once: on [`TableRegistry::close`], on
//! [`TableRegistry::close_all`], or when the registry is dropped.
//!
//! Callers only ever borrow tables from the registry, so a closed table
//! cannot be reached through it.

use std::path::{Path, PathBuf};

use eyre::Result;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::config::ReaderConfig;

use super::{table_file_path, Table};

#[derive(Debug)]
pub struct TableRegistry {
    directory: PathBuf,
    config: ReaderConfig,
    tables: HashMap<u32, Table>,
}

impl TableRegistry {
    pub fn new<P: AsRef<Path>>(directory: P, config: ReaderConfig) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            config,
            tables: HashMap::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn contains(&self, table_id: u32) -> bool {
        self.tables.contains_key(&table_id)
    }

    /// Whether the table's data file exists, open or not.
    pub fn exists(&self, table_id: u32) -> bool {
        self.contains(table_id) || table_file_path(&self.directory, table_id).exists()
    }

    /// Borrows table `table_id`, opening it on first use. Yields `None` when
    /// the table has no data file.
    pub fn open(&mut self, table_id: u32) -> Result<Option<&Table>> {
        match self.tables.entry(table_id) {
            Entry::Occupied(entry) => Ok(Some(entry.into_mut())),
            Entry::Vacant(entry) => {
                match Table::try_open(&self.directory, table_id, self.config)? {
                    Some(table) => Ok(Some(entry.insert(table))),
                    None => Ok(None),
                }
            }
        }
    }

    pub fn get(&self, table_id: u32) -> Option<&Table> {
        self.tables.get(&table_id)
    }

    /// Closes table `table_id`. Returns whether it was open.
    pub fn close(&mut self, table_id: u32) -> bool {
        match self.tables.remove(&table_id) {
            Some(mut table) => {
                table.close();
                true
            }
            None => false,
        }
    }

    pub fn close_all(&mut self) {
        for (_, mut table) in self.tables.drain() {
            table.close();
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Ids of the open tables, in no particular order.
    pub fn open_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.tables.keys().copied()
    }
}

impl Drop for TableRegistry {
    fn drop(&mut self) {
        self.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_table_is_not_registered() {
        let dir = tempdir().unwrap();
        let mut registry = TableRegistry::new(dir.path(), ReaderConfig::default());

        assert!(registry.open(4).unwrap().is_none());
        assert!(!registry.contains(4));
        assert!(!registry.exists(4));
        assert!(registry.is_empty());
    }

    #[test]
    fn closing_unknown_table_reports_false() {
        let dir = tempdir().unwrap();
        let mut registry = TableRegistry::new(dir.path(), ReaderConfig::default());

        assert!(!registry.close(1));
        registry.close_all();
        assert_eq!(registry.len(), 0);
    }
}
