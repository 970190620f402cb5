//! # Rows
//!
//! A decoded row (feature). Values are aligned with [`Schema::fields`]; the
//! object-id column is represented only by the feature id.

use std::fmt;
use std::sync::Arc;

use eyre::Result;

use crate::config::ROW_DISPLAY_VALUE_WIDTH;
use crate::error::GdbError;
use crate::geometry::GeometryValue;
use crate::types::Value;

use super::schema::{FieldDescriptor, Schema};

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    feature_id: u64,
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(feature_id: u64, schema: Arc<Schema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        Self {
            feature_id,
            schema,
            values,
        }
    }

    /// 1-based feature id; logical row id + 1.
    pub fn feature_id(&self) -> u64 {
        self.feature_id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        self.schema.fields()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Looks a value up by case-insensitive, trimmed field name.
    pub fn value_by_name(&self, name: &str) -> Result<&Value> {
        self.schema
            .index_of(name)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| {
                GdbError::NoSuchField {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Value of the table's geometry column, if it has one.
    pub fn geometry(&self) -> Option<&GeometryValue> {
        self.schema
            .geometry_index()
            .and_then(|i| self.values.get(i))
            .and_then(Value::as_geometry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.schema.fields().iter().zip(self.values.iter())
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.feature_id)?;

        let mut first = true;
        for (field, value) in self.iter().filter(|(_, v)| !v.is_null()) {
            if !first {
                f.write_str(", ")?;
            }
            first = false;

            let text = value.to_string();
            let shown: String = text.chars().take(ROW_DISPLAY_VALUE_WIDTH).collect();
            write!(f, "{}={}", field.name(), shown)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    fn descriptor(name: &str, field_type: FieldType) -> FieldDescriptor {
        FieldDescriptor {
            name: Some(name.to_string()),
            alias: None,
            field_type,
            nullable: true,
            width: None,
            default: None,
        }
    }

    fn row() -> Row {
        let schema = Arc::new(Schema::new(vec![
            descriptor("OBJECTID", FieldType::ObjectId),
            descriptor("NAME", FieldType::String { max_length: 80 }),
            descriptor("NOTE", FieldType::String { max_length: 80 }),
            descriptor("POP", FieldType::Int32),
        ]));
        Row::new(
            12,
            schema,
            vec![
                Value::String("a".repeat(40)),
                Value::Null,
                Value::Int32(1200),
            ],
        )
    }

    #[test]
    fn value_by_name_ignores_case() {
        let row = row();

        assert_eq!(row.value_by_name("pop").unwrap(), &Value::Int32(1200));
        assert_eq!(row.value_by_name(" Note ").unwrap(), &Value::Null);
        assert!(row.value_by_name("OBJECTID").is_err());
        assert!(row.geometry().is_none());
    }

    #[test]
    fn display_truncates_and_skips_nulls() {
        let text = row().to_string();

        assert_eq!(
            text,
            format!("[12] NAME={}, POP=1200", "a".repeat(ROW_DISPLAY_VALUE_WIDTH))
        );
    }
}
