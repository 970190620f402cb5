//! # Column Types
//!
//! A closed set of column types, one per on-disk type code. Each type knows
//! how to read its schema descriptor and how to decode one cell.
//!
//! ## Type Codes
//!
//! | Code | Kind | Cell encoding |
//! |------|------|---------------|
//! | 0 | Int16 | 2 bytes |
//! | 1 | Int32 | 4 bytes |
//! | 2 | Float32 | 4 bytes |
//! | 3 | Float64 | 8 bytes |
//! | 4 | String | varuint32 length + UTF-8, length 0 decodes to null |
//! | 5 | Date | f64 days since 1899-12-30 |
//! | 6 | ObjectId | no cell |
//! | 7 | Geometry | varuint32 length + shape |
//! | 8 | Binary | varuint32 length + bytes |
//! | 9 | Raster | rejected when the schema is read |
//! | 10 | Uuid | 16 bytes, mixed-endian |
//! | 11 | GlobalId | as Uuid |
//! | 12 | Xml | varuint32 length + document |
//!
//! ## Schema Descriptors
//!
//! ```text
//! fixed width (0-3, 5):   u8 width, u8 flags, [width bytes default]
//! string:                 i32 max length, u8 flags, varuint32 default len, [default]
//! object id:              2 reserved bytes
//! uuid, xml, binary:      1 reserved byte, u8 flags
//! geometry:               1 reserved byte, u8 flags, geometry descriptor
//! ```
//!
//! Flag bit 0 marks the column nullable; bit 2 marks a stored default.

use std::fmt;

use eyre::Result;
use uuid::Uuid;

use crate::error::GdbError;
use crate::geometry::GeometryDescriptor;
use crate::storage::ByteCursor;

use super::value::{date_from_days, Value};
use super::xml::XmlParser;

const FLAG_NULLABLE: u8 = 0x1;
const FLAG_HAS_DEFAULT: u8 = 0x4;

/// On-disk type code of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldKind {
    Int16 = 0,
    Int32 = 1,
    Float32 = 2,
    Float64 = 3,
    String = 4,
    Date = 5,
    ObjectId = 6,
    Geometry = 7,
    Binary = 8,
    Raster = 9,
    Uuid = 10,
    GlobalId = 11,
    Xml = 12,
}

impl TryFrom<u8> for FieldKind {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        Ok(match code {
            0 => Self::Int16,
            1 => Self::Int32,
            2 => Self::Float32,
            3 => Self::Float64,
            4 => Self::String,
            5 => Self::Date,
            6 => Self::ObjectId,
            7 => Self::Geometry,
            8 => Self::Binary,
            9 => Self::Raster,
            10 => Self::Uuid,
            11 => Self::GlobalId,
            12 => Self::Xml,
            other => return Err(other),
        })
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FieldKind {
    /// Cell size of the fixed-width kinds.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Int16 => Some(2),
            Self::Int32 | Self::Float32 => Some(4),
            Self::Float64 | Self::Date => Some(8),
            Self::Uuid | Self::GlobalId => Some(16),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Int16,
    Int32,
    Float32,
    Float64,
    String { max_length: i32 },
    Date,
    ObjectId,
    Geometry(Box<GeometryDescriptor>),
    Binary,
    Uuid { global: bool },
    Xml,
}

/// Everything a schema descriptor says about a column besides its name.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub field_type: FieldType,
    pub nullable: bool,
    /// Declared width of fixed-width kinds.
    pub width: Option<u8>,
    pub default: Option<Value>,
}

impl FieldType {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Int16 => FieldKind::Int16,
            Self::Int32 => FieldKind::Int32,
            Self::Float32 => FieldKind::Float32,
            Self::Float64 => FieldKind::Float64,
            Self::String { .. } => FieldKind::String,
            Self::Date => FieldKind::Date,
            Self::ObjectId => FieldKind::ObjectId,
            Self::Geometry(_) => FieldKind::Geometry,
            Self::Binary => FieldKind::Binary,
            Self::Uuid { global: false } => FieldKind::Uuid,
            Self::Uuid { global: true } => FieldKind::GlobalId,
            Self::Xml => FieldKind::Xml,
        }
    }

    pub fn is_object_id(&self) -> bool {
        matches!(self, Self::ObjectId)
    }

    pub fn geometry(&self) -> Option<&GeometryDescriptor> {
        match self {
            Self::Geometry(desc) => Some(desc),
            _ => None,
        }
    }

    /// Reads the type code and type-specific descriptor bytes of a column.
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<TypeDescriptor> {
        let at = cursor.position();
        let code = cursor.read_u8()?;
        let kind = FieldKind::try_from(code)
            .map_err(|code| GdbError::format(at, format!("unknown field type {}", code)))?;

        let simple = |field_type, flags: u8| TypeDescriptor {
            field_type,
            nullable: flags & FLAG_NULLABLE != 0,
            width: None,
            default: None,
        };

        Ok(match kind {
            FieldKind::Int16
            | FieldKind::Int32
            | FieldKind::Float32
            | FieldKind::Float64
            | FieldKind::Date => {
                let width = cursor.read_u8()?;
                let flags = cursor.read_u8()?;
                let default = if flags & FLAG_HAS_DEFAULT != 0 {
                    let default_at = cursor.position();
                    let bytes = cursor.read_bytes(width as u64)?;
                    fixed_default(kind, bytes, default_at)?
                } else {
                    None
                };

                let field_type = match kind {
                    FieldKind::Int16 => Self::Int16,
                    FieldKind::Int32 => Self::Int32,
                    FieldKind::Float32 => Self::Float32,
                    FieldKind::Float64 => Self::Float64,
                    _ => Self::Date,
                };

                TypeDescriptor {
                    field_type,
                    nullable: flags & FLAG_NULLABLE != 0,
                    width: Some(width),
                    default,
                }
            }
            FieldKind::String => {
                let max_length = cursor.read_i32()?;
                let flags = cursor.read_u8()?;
                let default_len = cursor.read_varuint32()?;
                let default = if flags & FLAG_HAS_DEFAULT != 0 {
                    let bytes = cursor.read_bytes(default_len as u64)?;
                    Some(Value::String(String::from_utf8_lossy(bytes).into_owned()))
                } else {
                    None
                };

                TypeDescriptor {
                    default,
                    ..simple(Self::String { max_length }, flags)
                }
            }
            FieldKind::ObjectId => {
                cursor.skip(2)?;
                simple(Self::ObjectId, 0)
            }
            FieldKind::Geometry => {
                cursor.skip(1)?;
                let flags = cursor.read_u8()?;
                let desc = GeometryDescriptor::parse(cursor)?;
                simple(Self::Geometry(Box::new(desc)), flags)
            }
            FieldKind::Binary | FieldKind::Xml | FieldKind::Uuid | FieldKind::GlobalId => {
                cursor.skip(1)?;
                let flags = cursor.read_u8()?;
                let field_type = match kind {
                    FieldKind::Binary => Self::Binary,
                    FieldKind::Xml => Self::Xml,
                    FieldKind::Uuid => Self::Uuid { global: false },
                    _ => Self::Uuid { global: true },
                };
                simple(field_type, flags)
            }
            FieldKind::Raster => {
                return Err(GdbError::unsupported(at, "raster field").into());
            }
        })
    }

    /// Decodes one cell at the cursor. Object-id columns have no cell and
    /// decode to `Null` without consuming bytes.
    pub fn decode(&self, cursor: &mut ByteCursor<'_>, xml: &XmlParser) -> Result<Value> {
        Ok(match self {
            Self::Int16 => Value::Int16(cursor.read_i16()?),
            Self::Int32 => Value::Int32(cursor.read_i32()?),
            Self::Float32 => Value::Float32(cursor.read_f32()?),
            Self::Float64 => Value::Float64(cursor.read_f64()?),
            Self::String { .. } => {
                let len = cursor.read_varuint32()?;
                if len == 0 {
                    Value::Null
                } else {
                    let bytes = cursor.read_bytes(len as u64)?;
                    Value::String(String::from_utf8_lossy(bytes).into_owned())
                }
            }
            Self::Date => {
                let at = cursor.position();
                Value::Date(date_from_days(cursor.read_f64()?, at)?)
            }
            Self::ObjectId => Value::Null,
            Self::Geometry(desc) => Value::Geometry(desc.decode(cursor)?),
            Self::Binary => {
                let len = cursor.read_varuint32()?;
                Value::Binary(cursor.read_bytes(len as u64)?.to_vec())
            }
            Self::Uuid { .. } => Value::Uuid(Uuid::from_bytes_le(cursor.read_array()?)),
            Self::Xml => {
                let len = cursor.read_varuint32()?;
                let at = cursor.position();
                let bytes = cursor.read_bytes(len as u64)?;
                Value::Xml(xml.parse(bytes, at)?)
            }
        })
    }
}

fn fixed_default(kind: FieldKind, bytes: &[u8], at: u64) -> Result<Option<Value>> {
    if kind.fixed_width() != Some(bytes.len()) {
        return Ok(None);
    }

    let mut cursor = ByteCursor::new(bytes);
    Ok(Some(match kind {
        FieldKind::Int16 => Value::Int16(cursor.read_i16()?),
        FieldKind::Int32 => Value::Int32(cursor.read_i32()?),
        FieldKind::Float32 => Value::Float32(cursor.read_f32()?),
        FieldKind::Float64 => Value::Float64(cursor.read_f64()?),
        FieldKind::Date => Value::Date(date_from_days(cursor.read_f64()?, at)?),
        _ => return Ok(None),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::root_cause;

    fn parse(bytes: &[u8]) -> Result<TypeDescriptor> {
        let mut cursor = ByteCursor::new(bytes);
        let desc = FieldType::parse(&mut cursor)?;
        assert_eq!(cursor.remaining(), 0, "descriptor left unread bytes");
        Ok(desc)
    }

    fn decode(field_type: &FieldType, bytes: &[u8]) -> Value {
        let mut cursor = ByteCursor::new(bytes);
        let value = field_type.decode(&mut cursor, &XmlParser::default()).unwrap();
        assert_eq!(cursor.remaining(), 0);
        value
    }

    #[test]
    fn fixed_width_descriptor_without_default() {
        let desc = parse(&[1, 4, 0x1]).unwrap();

        assert_eq!(desc.field_type, FieldType::Int32);
        assert!(desc.nullable);
        assert_eq!(desc.width, Some(4));
        assert_eq!(desc.default, None);
    }

    #[test]
    fn fixed_width_descriptor_with_default() {
        let mut bytes = vec![0, 2, 0x4 | 0x1];
        bytes.extend_from_slice(&(-3i16).to_le_bytes());

        let desc = parse(&bytes).unwrap();

        assert_eq!(desc.field_type, FieldType::Int16);
        assert_eq!(desc.default, Some(Value::Int16(-3)));
    }

    #[test]
    fn date_default_is_converted() {
        let mut bytes = vec![5, 8, 0x4];
        bytes.extend_from_slice(&25_569.0f64.to_le_bytes());

        let desc = parse(&bytes).unwrap();

        assert!(!desc.nullable);
        assert_eq!(desc.default.unwrap().as_date().unwrap().timestamp(), 0);
    }

    #[test]
    fn string_descriptor_reads_default_text() {
        let mut bytes = vec![4];
        bytes.extend_from_slice(&255i32.to_le_bytes());
        bytes.push(0x5);
        bytes.push(3);
        bytes.extend_from_slice(b"n/a");

        let desc = parse(&bytes).unwrap();

        assert_eq!(desc.field_type, FieldType::String { max_length: 255 });
        assert!(desc.nullable);
        assert_eq!(desc.default, Some(Value::String("n/a".into())));
    }

    #[test]
    fn string_descriptor_without_default_flag_skips_nothing() {
        let mut bytes = vec![4];
        bytes.extend_from_slice(&50i32.to_le_bytes());
        bytes.push(0x1);
        bytes.push(0);

        let desc = parse(&bytes).unwrap();

        assert_eq!(desc.default, None);
    }

    #[test]
    fn short_descriptors() {
        assert_eq!(parse(&[6, 4, 2]).unwrap().field_type, FieldType::ObjectId);
        assert_eq!(
            parse(&[10, 38, 1]).unwrap().field_type,
            FieldType::Uuid { global: false }
        );
        assert_eq!(
            parse(&[11, 38, 0]).unwrap().field_type.kind(),
            FieldKind::GlobalId
        );
        assert!(parse(&[12, 0, 1]).unwrap().nullable);
        assert_eq!(parse(&[8, 0, 0]).unwrap().field_type, FieldType::Binary);
    }

    #[test]
    fn raster_is_unsupported() {
        let err = parse(&[9, 0, 0]).unwrap_err();

        assert!(root_cause(&err).unwrap().is_unsupported());
    }

    #[test]
    fn unknown_type_code_is_format_error() {
        let err = parse(&[13]).unwrap_err();

        assert!(root_cause(&err).unwrap().is_format());
    }

    #[test]
    fn empty_string_decodes_to_null() {
        let ty = FieldType::String { max_length: 10 };

        assert_eq!(decode(&ty, &[0]), Value::Null);
        assert_eq!(decode(&ty, &[2, b'h', b'i']), Value::String("hi".into()));
    }

    #[test]
    fn uuid_cell_uses_mixed_endian_layout() {
        let bytes = [
            0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
            0xEE, 0xFF,
        ];

        let value = decode(&FieldType::Uuid { global: true }, &bytes);

        assert_eq!(
            value.to_string(),
            "00112233-4455-6677-8899-aabbccddeeff"
        );
    }

    #[test]
    fn binary_and_xml_cells() {
        assert_eq!(
            decode(&FieldType::Binary, &[3, 9, 8, 7]),
            Value::Binary(vec![9, 8, 7])
        );

        let mut xml = vec![4];
        xml.extend_from_slice(b"<a/>");
        assert_eq!(decode(&FieldType::Xml, &xml), Value::Xml("<a/>".into()));
    }

    #[test]
    fn malformed_xml_cell_fails() {
        let mut bytes = vec![3];
        bytes.extend_from_slice(b"<a>");
        let mut cursor = ByteCursor::new(&bytes);

        let err = FieldType::Xml
            .decode(&mut cursor, &XmlParser::default())
            .unwrap_err();

        assert!(root_cause(&err).unwrap().is_format());
    }

    #[test]
    fn fixed_width_cells() {
        assert_eq!(decode(&FieldType::Int16, &7i16.to_le_bytes()), Value::Int16(7));
        assert_eq!(
            decode(&FieldType::Float32, &2.5f32.to_le_bytes()),
            Value::Float32(2.5)
        );
        assert_eq!(
            decode(&FieldType::Float64, &(-1.25f64).to_le_bytes()),
            Value::Float64(-1.25)
        );
    }
}
