//! # XML Parsing Context
//!
//! XML cells are validated as well-formed documents before being handed to
//! the caller. The parser settings travel with each open table through
//! [`crate::ReaderConfig`]; nothing is shared process-wide.
//!
//! Documents are kept as text. The parsed tree borrows the text, so it is
//! dropped once validation succeeds.

use eyre::Result;
use roxmltree::{Document, ParsingOptions};

use crate::error::GdbError;

/// Node budget applied when none is configured; matches roxmltree's own default.
const DEFAULT_NODES_LIMIT: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlParser {
    allow_dtd: bool,
    nodes_limit: u32,
}

impl Default for XmlParser {
    fn default() -> Self {
        Self {
            allow_dtd: true,
            nodes_limit: DEFAULT_NODES_LIMIT,
        }
    }
}

impl XmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata documents written by the vendor toolkit occasionally carry a
    /// DTD; rejecting them turns those cells into decode failures.
    pub fn allow_dtd(mut self, allow: bool) -> Self {
        self.allow_dtd = allow;
        self
    }

    pub fn nodes_limit(mut self, limit: u32) -> Self {
        self.nodes_limit = limit;
        self
    }

    fn options(&self) -> ParsingOptions {
        let mut opts = ParsingOptions::default();
        opts.allow_dtd = self.allow_dtd;
        opts.nodes_limit = self.nodes_limit;
        opts
    }

    /// Checks that `bytes` is a well-formed UTF-8 XML document and returns
    /// its text. `offset` is the file position of the cell, used in errors.
    pub fn parse(&self, bytes: &[u8], offset: u64) -> Result<String> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| GdbError::format(offset, format!("XML cell is not UTF-8: {}", e)))?;

        Document::parse_with_options(text, self.options())
            .map_err(|e| GdbError::format(offset, format!("malformed XML: {}", e)))?;

        Ok(text.to_owned())
    }
}
