//! # Shape Type Codes
//!
//! Every geometry cell starts with a 32-bit shape-type code. The low byte
//! selects one of a closed set of [`ShapeType`]s; the high byte carries
//! modifier flags.
//!
//! ```text
//! bit 31  Z          bit 27  normals
//! bit 30  M          bit 26  textures
//! bit 29  curves     bit 25  part IDs
//! bit 28  IDs        bit 24  materials
//! bits 0..7  shape type
//! ```
//!
//! ## Simple and General Variants
//!
//! Simple variants (`PolylineZ`, `PointM`, ...) name their Z/M dimensions in
//! the type itself. General variants (codes 50 and up) name nothing and rely
//! on the high bits alone. [`ShapeModifiers`] folds both sources into one set
//! of boolean accessors.
//!
//! A general polyline or polygon whose code carries none of the bits 24..29
//! is treated as having curves.

use std::fmt;

use eyre::Result;

use crate::error::GdbError;

const FLAG_Z: u32 = 0x8000_0000;
const FLAG_M: u32 = 0x4000_0000;
const FLAG_CURVES: u32 = 0x2000_0000;
const FLAG_IDS: u32 = 0x1000_0000;
const FLAG_NORMALS: u32 = 0x0800_0000;
const FLAG_TEXTURES: u32 = 0x0400_0000;
const FLAG_PART_IDS: u32 = 0x0200_0000;
const FLAG_MATERIALS: u32 = 0x0100_0000;

/// Bits 24..29; excludes Z and M.
const MODIFIER_MASK: u32 = 0x3F00_0000;

/// How a shape's payload is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeStructure {
    Null,
    Point,
    Multipoint,
    Polyline,
    Polygon,
    MultiPatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShapeType {
    Null = 0,
    Point = 1,
    Polyline = 3,
    Polygon = 5,
    Multipoint = 8,
    PointZ = 9,
    PolylineZ = 10,
    PointZM = 11,
    PolylineZM = 13,
    PolygonZM = 15,
    MultipointZM = 18,
    PolygonZ = 19,
    MultipointZ = 20,
    PointM = 21,
    PolylineM = 23,
    PolygonM = 25,
    MultipointM = 28,
    GeneralPolyline = 50,
    GeneralPolygon = 51,
    GeneralPoint = 52,
    GeneralMultipoint = 53,
    GeneralMultiPatch = 54,
}

impl TryFrom<u8> for ShapeType {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        Ok(match code {
            0 => Self::Null,
            1 => Self::Point,
            3 => Self::Polyline,
            5 => Self::Polygon,
            8 => Self::Multipoint,
            9 => Self::PointZ,
            10 => Self::PolylineZ,
            11 => Self::PointZM,
            13 => Self::PolylineZM,
            15 => Self::PolygonZM,
            18 => Self::MultipointZM,
            19 => Self::PolygonZ,
            20 => Self::MultipointZ,
            21 => Self::PointM,
            23 => Self::PolylineM,
            25 => Self::PolygonM,
            28 => Self::MultipointM,
            50 => Self::GeneralPolyline,
            51 => Self::GeneralPolygon,
            52 => Self::GeneralPoint,
            53 => Self::GeneralMultipoint,
            54 => Self::GeneralMultiPatch,
            other => return Err(other),
        })
    }
}

impl ShapeType {
    pub fn structure(self) -> ShapeStructure {
        use ShapeType::*;
        match self {
            Null => ShapeStructure::Null,
            Point | PointZ | PointM | PointZM | GeneralPoint => ShapeStructure::Point,
            Multipoint | MultipointZ | MultipointM | MultipointZM | GeneralMultipoint => {
                ShapeStructure::Multipoint
            }
            Polyline | PolylineZ | PolylineM | PolylineZM | GeneralPolyline => {
                ShapeStructure::Polyline
            }
            Polygon | PolygonZ | PolygonM | PolygonZM | GeneralPolygon => ShapeStructure::Polygon,
            GeneralMultiPatch => ShapeStructure::MultiPatch,
        }
    }

    pub fn is_general(self) -> bool {
        self as u8 >= ShapeType::GeneralPolyline as u8
    }

    fn implies_z(self) -> bool {
        use ShapeType::*;
        matches!(
            self,
            PointZ | PointZM | PolylineZ | PolylineZM | PolygonZ | PolygonZM | MultipointZ | MultipointZM
        )
    }

    fn implies_m(self) -> bool {
        use ShapeType::*;
        matches!(
            self,
            PointM | PointZM | PolylineM | PolylineZM | PolygonM | PolygonZM | MultipointM | MultipointZM
        )
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decoded view of a full 32-bit shape-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeModifiers {
    code: u32,
    shape: ShapeType,
}

impl ShapeModifiers {
    /// Fails with [`GdbError::Format`] when the low byte names no known shape.
    pub fn from_code(code: u32, offset: u64) -> Result<Self> {
        let shape = ShapeType::try_from((code & 0xFF) as u8).map_err(|low| {
            GdbError::format(offset, format!("unknown shape type {} (code {:#010x})", low, code))
        })?;
        Ok(Self { code, shape })
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn shape(&self) -> ShapeType {
        self.shape
    }

    pub fn structure(&self) -> ShapeStructure {
        self.shape.structure()
    }

    fn bit(&self, flag: u32) -> bool {
        self.code & flag != 0
    }

    pub fn has_modifiers(&self) -> bool {
        self.bit(MODIFIER_MASK)
    }

    pub fn has_z(&self) -> bool {
        self.shape.implies_z() || self.bit(FLAG_Z)
    }

    pub fn has_m(&self) -> bool {
        self.shape.implies_m() || self.bit(FLAG_M)
    }

    pub fn has_curves(&self) -> bool {
        let bare_general = matches!(
            self.shape,
            ShapeType::GeneralPolyline | ShapeType::GeneralPolygon
        ) && !self.has_modifiers();
        bare_general || self.bit(FLAG_CURVES)
    }

    pub fn has_ids(&self) -> bool {
        self.bit(FLAG_IDS)
    }

    pub fn has_normals(&self) -> bool {
        self.bit(FLAG_NORMALS)
    }

    pub fn has_textures(&self) -> bool {
        self.bit(FLAG_TEXTURES)
    }

    pub fn has_part_ids(&self) -> bool {
        self.bit(FLAG_PART_IDS)
    }

    pub fn has_materials(&self) -> bool {
        self.bit(FLAG_MATERIALS)
    }
}

impl fmt::Display for ShapeModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_modifiers() {
            return write!(f, "[{}]", self.shape);
        }

        let flags = [
            (self.has_z(), "Z"),
            (self.has_m(), "M"),
            (self.has_curves(), "CURVE"),
            (self.has_ids(), "ID"),
            (self.has_normals(), "NORMAL"),
            (self.has_textures(), "TEXTURE"),
            (self.has_part_ids(), "PARTID"),
            (self.has_materials(), "MATERIAL"),
        ];

        write!(f, "[{}(", self.shape)?;
        let mut first = true;
        for (_, name) in flags.iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(name)?;
            first = false;
        }
        f.write_str(")]")
    }
}
