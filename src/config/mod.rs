//! # Reader Configuration
//!
//! This module holds the format constants and the small amount of runtime
//! configuration a reader accepts.
//!
//! ## Module Organization
//!
//! - [`constants`]: Every fixed value of the on-disk format
//! - [`ReaderConfig`]: Storage backend and XML parsing context for an open table

pub mod constants;
pub use constants::*;

use crate::storage::StorageKind;
use crate::types::XmlParser;

/// Settings applied when a table and its index are opened.
///
/// Built through [`crate::TableBuilder`] in normal use; constructed directly
/// by collaborators that manage many tables with the same settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderConfig {
    pub storage: StorageKind,
    pub xml: XmlParser,
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_xml_parser(mut self, xml: XmlParser) -> Self {
        self.xml = xml;
        self
    }
}
