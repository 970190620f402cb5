//! # Table Schema
//!
//! The field section of a table file, parsed once at open.
//!
//! ## Wire Order and Exposed Fields
//!
//! Columns are stored in a fixed wire order that also defines the cell order
//! of every row. The object-id column is a placeholder: it has no cell and is
//! never exposed. [`Schema`] therefore keeps two views:
//!
//! ```text
//! wire:     [OBJECTID, SHAPE, NAME, POP]
//! slots:    [None,     Some(0), Some(1), Some(2)]
//! fields:   [SHAPE, NAME, POP]
//! ```
//!
//! ## Field Section Layout
//!
//! ```text
//! u16   field count
//! per field:
//!   u8     name length in UTF-16 code units (0 => no name)
//!   u16*n  name, little-endian code units
//!   u8     alias length
//!   u16*n  alias
//!   ...    type descriptor (see `types::field_type`)
//! ```
//!
//! Field names are matched case-insensitively after trimming.

use hashbrown::HashMap;

use eyre::{Result, WrapErr};

use crate::error::GdbError;
use crate::geometry::GeometryDescriptor;
use crate::storage::ByteCursor;
use crate::types::{FieldKind, FieldType, TypeDescriptor, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: Option<String>,
    pub alias: Option<String>,
    pub field_type: FieldType,
    pub nullable: bool,
    /// Declared width of fixed-width kinds.
    pub width: Option<u8>,
    /// Value substituted when the row's null bit is set.
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// Parses one descriptor at the cursor.
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let name = read_name(cursor)?;
        let alias = read_name(cursor)?;

        let TypeDescriptor {
            field_type,
            nullable,
            width,
            default,
        } = FieldType::parse(cursor)?;

        Ok(Self {
            name,
            alias,
            field_type,
            nullable,
            width,
            default,
        })
    }

    /// The name, or `""` for an unnamed column.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn kind(&self) -> FieldKind {
        self.field_type.kind()
    }

    pub fn geometry(&self) -> Option<&GeometryDescriptor> {
        self.field_type.geometry()
    }
}

fn read_name(cursor: &mut ByteCursor<'_>) -> Result<Option<String>> {
    let len = cursor.read_u8()?;
    if len == 0 {
        return Ok(None);
    }

    let mut units = Vec::with_capacity(len as usize);
    for _ in 0..len {
        units.push(cursor.read_char16()?);
    }
    Ok(Some(String::from_utf16_lossy(&units)))
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    slots: Vec<Option<usize>>,
    object_id_name: Option<String>,
    nullable_count: usize,
    geometry: Option<usize>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema from descriptors in wire order.
    pub fn new(wire: Vec<FieldDescriptor>) -> Self {
        let mut fields = Vec::with_capacity(wire.len());
        let mut slots = Vec::with_capacity(wire.len());
        let mut object_id_name = None;
        let mut nullable_count = 0;
        let mut geometry = None;
        let mut by_name = HashMap::with_capacity(wire.len());

        for field in wire {
            if field.field_type.is_object_id() {
                slots.push(None);
                object_id_name = object_id_name.or(field.name);
                continue;
            }

            let index = fields.len();
            if field.nullable {
                nullable_count += 1;
            }
            if geometry.is_none() && field.kind() == FieldKind::Geometry {
                geometry = Some(index);
            }
            by_name.entry(normalize_name(field.name())).or_insert(index);

            slots.push(Some(index));
            fields.push(field);
        }

        Self {
            fields,
            slots,
            object_id_name,
            nullable_count,
            geometry,
            by_name,
        }
    }

    /// Reads the field count and every descriptor from the field section.
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let count = cursor.read_u16()?;

        let mut wire = Vec::with_capacity(count as usize);
        for i in 0..count {
            let at = cursor.position();
            let field = FieldDescriptor::parse(cursor)
                .wrap_err_with(|| format!("while reading field descriptor {} at byte {}", i, at))?;
            wire.push(field);
        }

        Ok(Self::new(wire))
    }

    /// Exposed fields in row order, object id excluded.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Wire slots; `None` marks the object-id placeholder.
    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    pub fn object_id_name(&self) -> Option<&str> {
        self.object_id_name.as_deref()
    }

    pub fn nullable_count(&self) -> usize {
        self.nullable_count
    }

    /// Bytes of the per-row null bitmap.
    pub fn null_bitmap_len(&self) -> usize {
        self.nullable_count.div_ceil(8)
    }

    pub fn geometry_index(&self) -> Option<usize> {
        self.geometry
    }

    pub fn geometry_field(&self) -> Option<&FieldDescriptor> {
        self.geometry.map(|i| &self.fields[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(&normalize_name(name)).copied()
    }

    pub fn field(&self, name: &str) -> Result<&FieldDescriptor> {
        self.index_of(name)
            .map(|i| &self.fields[i])
            .ok_or_else(|| {
                GdbError::NoSuchField {
                    name: name.to_string(),
                }
                .into()
            })
    }
}
