//! Fuzz testing for the table, index and row decoders.
//!
//! This fuzz target feeds arbitrary images to the table and index readers and
//! decodes rows at arbitrary offsets, to ensure malformed files fail with an
//! error instead of panicking or reading out of bounds.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use gdbread::storage::{ByteCursor, FileSource};
use gdbread::table::{IndexFile, TableFile};
use gdbread::types::{FieldType, XmlParser};

#[derive(Debug, Arbitrary)]
struct DecoderInput {
    table: Vec<u8>,
    index: Vec<u8>,
    row_offsets: Vec<u16>,
    descriptor: Vec<u8>,
    cell: Vec<u8>,
}

fuzz_target!(|input: DecoderInput| {
    let xml = XmlParser::default();

    if let Ok(table) = TableFile::from_source(FileSource::from_bytes("fuzz.gdbtable", input.table)) {
        for (i, &offset) in input.row_offsets.iter().take(32).enumerate() {
            let _ = table.read_row(i as u64 + 1, offset as u64, &xml);
        }
    }

    if let Ok(index) = IndexFile::from_source(FileSource::from_bytes("fuzz.gdbtablx", input.index)) {
        for id in 0..index.row_count().min(4096) {
            let _ = index.resolve(id);
        }
        for entry in index.entries().take(4096) {
            if entry.is_err() {
                break;
            }
        }
    }

    let mut cursor = ByteCursor::new(&input.descriptor);
    if let Ok(desc) = FieldType::parse(&mut cursor) {
        let _ = desc.field_type.decode(&mut ByteCursor::new(&input.cell), &xml);
    }
});
