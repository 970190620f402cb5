//! # Decoded Cell Values
//!
//! `Value` is the owned result of decoding one cell. Every variant owns its
//! data, so a [`crate::Row`] outlives the mapping it was read from.
//!
//! ## Value Variants
//!
//! | Variant | Rust Type | Column type |
//! |---------|-----------|-------------|
//! | Null | - | any nullable column, or an empty string |
//! | Int16 | i16 | int16 |
//! | Int32 | i32 | int32 |
//! | Float32 | f32 | float32 |
//! | Float64 | f64 | float64 |
//! | String | String | string |
//! | Date | DateTime<Utc> | date |
//! | Binary | Vec<u8> | binary |
//! | Uuid | Uuid | uuid, global id |
//! | Xml | String | xml |
//! | Geometry | GeometryValue | geometry |
//!
//! ## Dates
//!
//! Dates are stored as fractional days since 1899-12-30T00:00:00Z. The day
//! count is scaled to seconds and rounded up, so the decoded instant never
//! carries sub-second precision.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use eyre::Result;
use uuid::Uuid;

use crate::config::{DATE_EPOCH_UNIX_SECONDS, SECONDS_PER_DAY};
use crate::error::GdbError;
use crate::geometry::GeometryValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int16(i16),
    Int32(i32),
    Float32(f32),
    Float64(f64),
    String(String),
    Date(DateTime<Utc>),
    Binary(Vec<u8>),
    Uuid(Uuid),
    Xml(String),
    Geometry(GeometryValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int16(v) => Some(*v as f64),
            Value::Int32(v) => Some(*v as f64),
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Text of a string or XML cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Xml(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&GeometryValue> {
        match self {
            Value::Geometry(g) => Some(g),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(s) | Value::Xml(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Value::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Geometry(g) => write!(f, "{}", g),
        }
    }
}

/// Converts a stored day count into an instant.
pub fn date_from_days(days: f64, offset: u64) -> Result<DateTime<Utc>> {
    let seconds = (days * SECONDS_PER_DAY).ceil();

    if !seconds.is_finite() || seconds.abs() > i64::MAX as f64 / 2.0 {
        return Err(GdbError::format(offset, format!("date value {} out of range", days)).into());
    }

    DATE_EPOCH_UNIX_SECONDS
        .checked_add(seconds as i64)
        .and_then(|unix| DateTime::from_timestamp(unix, 0))
        .ok_or_else(|| {
            GdbError::format(offset, format!("date value {} out of range", days)).into()
        })
}
