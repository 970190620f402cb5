//! # Column Type System
//!
//! This module provides the closed set of column types and the values they
//! decode to.
//!
//! ## Module Structure
//!
//! - `field_type`: [`FieldKind`] type codes, [`FieldType`] descriptors and cell decoding
//! - `value`: Owned [`Value`] cells and date conversion
//! - `xml`: [`XmlParser`] context used for XML cells
//!
//! ## Usage
//!
//! ```ignore
//! use gdbread::types::{FieldType, Value, XmlParser};
//!
//! let desc = FieldType::parse(&mut cursor)?;
//! let value = desc.field_type.decode(&mut cursor, &XmlParser::default())?;
//! if let Value::String(s) = value { println!("{s}"); }
//! ```

mod field_type;
mod value;
mod xml;

pub use field_type::{FieldKind, FieldType, TypeDescriptor};
pub use value::{date_from_days, Value};
pub use xml::XmlParser;
