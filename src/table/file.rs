//! # Table File Reader
//!
//! Parses the header and field section of a `.gdbtable` file at open, then
//! decodes rows at byte offsets handed to it by the index reader.
//!
//! ## Row Layout
//!
//! ```text
//! i32       blob length (bytes that follow; negative => corrupt)
//! [u8]      null bitmap, ceil(nullable fields / 8) bytes, low bit first
//! cells     one per exposed column in wire order
//! ```
//!
//! A nullable column consumes the next bitmap bit; a set bit means the cell
//! is absent and the column's default (or `Null`) is used instead. Columns
//! that are not nullable never consume a bit.
//!
//! The blob length is only a bounds check. Cells are decoded from the full
//! file region, so a blob whose cells run past its declared length still
//! decodes as long as the file holds the bytes.
//!
//! ## Reads Are Stateless
//!
//! Every call creates its own cursor, so a `TableFile` is read through `&self`
//! and the header and schema never change after open.

use std::path::Path;
use std::sync::Arc;

use eyre::{Result, WrapErr};

use crate::config::{FIELD_SECTION_HEADER_SIZE, FIELD_SECTION_LENGTH_SIZE, VERSION_10, VERSION_9};
use crate::error::GdbError;
use crate::storage::{ByteCursor, FieldSectionHeader, FileSource, StorageKind, TableFileHeader};
use crate::types::{Value, XmlParser};

use super::row::Row;
use super::schema::Schema;

/// Geometry type declared for the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GeometryClass {
    None = 0,
    Point = 1,
    Multipoint = 2,
    Polyline = 3,
    Polygon = 4,
    MultiPatch = 9,
}

impl TryFrom<u8> for GeometryClass {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        Ok(match code {
            0 => Self::None,
            1 => Self::Point,
            2 => Self::Multipoint,
            3 => Self::Polyline,
            4 => Self::Polygon,
            9 => Self::MultiPatch,
            other => return Err(other),
        })
    }
}

/// Format generation of a table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableVersion {
    /// Written by FileGDB 9.x (stored as 3).
    V9,
    /// Written by FileGDB 10.x (stored as 4).
    V10,
}

impl TableVersion {
    fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            VERSION_9 => Some(Self::V9),
            VERSION_10 => Some(Self::V10),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::V9 => VERSION_9,
            Self::V10 => VERSION_10,
        }
    }
}

/// Header values, copied out of the file at open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    /// Includes deleted rows.
    pub row_count: u64,
    pub file_size: u64,
    pub field_offset: u64,
    /// Bytes of the field section after its length word.
    pub field_section_len: u64,
    pub version: TableVersion,
    pub geometry_class: GeometryClass,
}

#[derive(Debug)]
pub struct TableFile {
    source: FileSource,
    header: TableHeader,
    schema: Arc<Schema>,
}

impl TableFile {
    pub fn open<P: AsRef<Path>>(path: P, storage: StorageKind) -> Result<Self> {
        let path = path.as_ref();
        let source = FileSource::open(path, storage)?;
        Self::from_source(source).wrap_err_with(|| format!("failed to read '{}'", path.display()))
    }

    pub fn from_source(source: FileSource) -> Result<Self> {
        let bytes = source.bytes();
        let raw = TableFileHeader::parse(bytes)?;

        let field_offset = raw.field_offset() as u64;
        let section = FieldSectionHeader::parse(bytes, field_offset)?;

        let version = TableVersion::from_raw(section.version()).ok_or_else(|| {
            GdbError::format(field_offset + 4, format!("unsupported version {}", section.version()))
        })?;
        let geometry_class = GeometryClass::try_from(section.geometry_class()).map_err(|code| {
            GdbError::format(field_offset + 8, format!("unknown geometry class {}", code))
        })?;

        let row_count = u64::try_from(raw.row_count()).map_err(|_| {
            GdbError::format(4u64, format!("negative row count {}", raw.row_count()))
        })?;

        let header = TableHeader {
            row_count,
            file_size: raw.file_size().max(0) as u64,
            field_offset,
            field_section_len: section.section_len() as u64,
            version,
            geometry_class,
        };

        let fields_at = field_offset + FIELD_SECTION_HEADER_SIZE as u64;
        let section_end =
            field_offset + FIELD_SECTION_LENGTH_SIZE as u64 + header.field_section_len;
        let mut cursor = ByteCursor::at(bytes, fields_at).bounded(section_end - fields_at)?;

        let schema = Schema::parse(&mut cursor)?;
        if cursor.remaining() > 0 {
            tracing::debug!(
                unread = cursor.remaining(),
                "field section longer than its descriptors"
            );
        }

        tracing::debug!(
            path = %source.path().display(),
            rows = header.row_count,
            version = ?header.version,
            fields = schema.len(),
            geometry_class = ?header.geometry_class,
            "opened table file"
        );

        Ok(Self {
            source,
            header,
            schema: Arc::new(schema),
        })
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Decodes the row stored at `offset` as feature `feature_id`.
    pub fn read_row(&self, feature_id: u64, offset: u64, xml: &XmlParser) -> Result<Row> {
        let values = self
            .decode_values(offset, xml)
            .wrap_err_with(|| format!("while decoding feature {}", feature_id))?;
        Ok(Row::new(feature_id, Arc::clone(&self.schema), values))
    }

    fn decode_values(&self, offset: u64, xml: &XmlParser) -> Result<Vec<Value>> {
        let mut cursor = ByteCursor::at(self.source.bytes(), offset);

        let blob_len = cursor.read_i32()?;
        if blob_len < 0 {
            return Err(
                GdbError::corruption(offset, format!("negative row length {}", blob_len)).into(),
            );
        }

        let start = cursor.position();
        cursor.skip(blob_len as u64)?;
        cursor.seek(start);

        let bitmap = cursor.read_bytes(self.schema.null_bitmap_len() as u64)?;
        let fields = self.schema.fields();

        let mut values = Vec::with_capacity(fields.len());
        let mut bit = 0usize;

        for slot in self.schema.slots() {
            let Some(index) = *slot else {
                continue;
            };
            let field = &fields[index];

            let is_null = field.nullable && {
                let set = bitmap[bit / 8] & (1 << (bit % 8)) != 0;
                bit += 1;
                set
            };

            let value = if is_null {
                field.default.clone().unwrap_or(Value::Null)
            } else {
                let at = cursor.position();
                field
                    .field_type
                    .decode(&mut cursor, xml)
                    .wrap_err_with(|| format!("in field '{}' at byte {}", field.name(), at))?
            };
            values.push(value);
        }

        debug_assert_eq!(bit, self.schema.nullable_count());
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::root_cause;
    use zerocopy::IntoBytes;

    fn utf16(name: &str) -> Vec<u8> {
        let units: Vec<u16> = name.encode_utf16().collect();
        let mut out = vec![units.len() as u8];
        for u in units {
            out.extend_from_slice(&u.to_le_bytes());
        }
        out
    }

    /// Builds a table image with fields A (nullable int32, default 99),
    /// B (int32) and C (nullable int16), preceded by an object-id column.
    fn image(rows: &[Vec<u8>]) -> (Vec<u8>, Vec<u64>) {
        let mut fields = 4u16.to_le_bytes().to_vec();
        fields.extend(utf16("OBJECTID"));
        fields.extend([0, 6, 4, 2]);
        fields.extend(utf16("A"));
        fields.extend([0, 1, 4, 0x5]);
        fields.extend(99i32.to_le_bytes());
        fields.extend(utf16("B"));
        fields.extend([0, 1, 4, 0]);
        fields.extend(utf16("C"));
        fields.extend([0, 0, 2, 0x1]);

        let section_len = (8 + fields.len()) as i32;
        let mut bytes = TableFileHeader::new(rows.len() as i32, 0, 40).as_bytes().to_vec();
        bytes.extend([0u8; 4]);
        bytes.extend(FieldSectionHeader::new(section_len, VERSION_10, 0).as_bytes());
        bytes.extend(fields);

        let mut offsets = Vec::new();
        for row in rows {
            offsets.push(bytes.len() as u64);
            bytes.extend((row.len() as i32).to_le_bytes());
            bytes.extend(row);
        }
        (bytes, offsets)
    }

    fn open(bytes: Vec<u8>) -> TableFile {
        TableFile::from_source(FileSource::from_bytes("a00000009.gdbtable", bytes)).unwrap()
    }

    #[test]
    fn header_and_schema() {
        let (bytes, _) = image(&[]);
        let table = open(bytes);

        assert_eq!(table.header().row_count, 0);
        assert_eq!(table.header().version, TableVersion::V10);
        assert_eq!(table.header().geometry_class, GeometryClass::None);
        assert_eq!(table.schema().len(), 3);
        assert_eq!(table.schema().nullable_count(), 2);
    }

    #[test]
    fn null_bitmap_skips_non_nullable_fields() {
        // bit 0 -> A present, bit 1 -> C null
        let mut row = vec![0b0000_0010];
        row.extend(5i32.to_le_bytes());
        row.extend(6i32.to_le_bytes());

        let (bytes, offsets) = image(&[row]);
        let table = open(bytes);
        let row = table.read_row(1, offsets[0], &XmlParser::default()).unwrap();

        assert_eq!(
            row.values(),
            &[Value::Int32(5), Value::Int32(6), Value::Null]
        );
    }

    #[test]
    fn null_bit_yields_default() {
        let mut row = vec![0b0000_0001];
        row.extend(6i32.to_le_bytes());
        row.extend(3i16.to_le_bytes());

        let (bytes, offsets) = image(&[row]);
        let table = open(bytes);
        let row = table.read_row(1, offsets[0], &XmlParser::default()).unwrap();

        assert_eq!(
            row.values(),
            &[Value::Int32(99), Value::Int32(6), Value::Int16(3)]
        );
    }

    #[test]
    fn negative_blob_length_is_corruption() {
        let (mut bytes, offsets) = image(&[vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]]);
        let at = offsets[0] as usize;
        bytes[at..at + 4].copy_from_slice(&(-5i32).to_le_bytes());

        let table = open(bytes);
        let err = table.read_row(7, offsets[0], &XmlParser::default()).unwrap_err();

        assert!(root_cause(&err).unwrap().is_corruption());
        assert!(format!("{:#}", err).contains("while decoding feature 7"));
    }

    #[test]
    fn blob_past_end_of_file_is_format_error() {
        let (mut bytes, offsets) = image(&[vec![0, 0, 0, 0, 0, 0, 0, 0, 0]]);
        let at = offsets[0] as usize;
        bytes[at..at + 4].copy_from_slice(&1000i32.to_le_bytes());

        let table = open(bytes);
        let err = table.read_row(1, offsets[0], &XmlParser::default()).unwrap_err();

        assert!(root_cause(&err).unwrap().is_format());
    }

    #[test]
    fn bad_version_is_rejected() {
        let (mut bytes, _) = image(&[]);
        bytes[44..48].copy_from_slice(&5i32.to_le_bytes());

        let err = TableFile::from_source(FileSource::from_bytes("t", bytes)).unwrap_err();

        assert!(root_cause(&err).unwrap().is_format());
    }

    #[test]
    fn bad_geometry_class_is_rejected() {
        let (mut bytes, _) = image(&[]);
        bytes[48] = 5;

        let err = TableFile::from_source(FileSource::from_bytes("t", bytes)).unwrap_err();

        assert!(root_cause(&err).unwrap().is_format());
    }

    #[test]
    fn trailing_section_bytes_are_tolerated() {
        let (mut bytes, _) = image(&[]);
        let len = i32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]);
        bytes[40..44].copy_from_slice(&(len + 3).to_le_bytes());
        bytes.extend([0xAA, 0xBB, 0xCC]);

        let table = open(bytes);

        assert_eq!(table.header().field_section_len, len as u64 + 3);
        assert_eq!(table.schema().len(), 3);
        assert_eq!(table.schema().nullable_count(), 2);
    }

    #[test]
    fn descriptors_overrunning_section_fail() {
        let (mut bytes, _) = image(&[]);
        bytes[40..44].copy_from_slice(&12i32.to_le_bytes());

        assert!(TableFile::from_source(FileSource::from_bytes("t", bytes)).is_err());
    }
}
