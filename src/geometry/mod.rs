//! # Geometry
//!
//! Decoding of the geometry column type.
//!
//! ## Module Organization
//!
//! - `shape`: shape-type codes and modifier flags
//! - `descriptor`: per-column scale, origin and extent metadata
//! - `decoder`: cell decoding, implemented on [`GeometryDescriptor`]
//! - `value`: decoded [`GeometryValue`]s
//!
//! ## Supported Shapes
//!
//! | Structure | Result |
//! |-----------|--------|
//! | null | `GeometryValue::Empty` |
//! | point | `GeometryValue::Point` |
//! | polyline, polygon, multipoint | `GeometryValue::MultiPart` |
//! | multipatch | `GdbError::Unsupported` |
//!
//! Any curve segment record also fails with `GdbError::Unsupported`.

mod decoder;
mod descriptor;
mod shape;
mod value;

pub use descriptor::GeometryDescriptor;
pub use shape::{ShapeModifiers, ShapeStructure, ShapeType};
pub use value::{Envelope, GeometryValue, MultiPart, Part, PointValue};
