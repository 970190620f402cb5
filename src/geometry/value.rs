//! # Geometry Values
//!
//! Decoded geometry cells. A cell is one of three things:
//!
//! | Variant | Produced for |
//! |---------|--------------|
//! | `Empty` | null shape type, or a multipart shape with zero points |
//! | `Point` | point shapes |
//! | `MultiPart` | polylines, polygons and multipoints |
//!
//! Absent Z or M ordinates of a point are `NaN`. Parts of a multipart shape
//! carry `None` for an absent dimension instead of a vector of `NaN`s.

use std::fmt;

use smallvec::SmallVec;

use super::shape::{ShapeModifiers, ShapeStructure};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointValue {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
}

impl PointValue {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: f64::NAN,
            m: f64::NAN,
        }
    }

    pub fn has_z(&self) -> bool {
        !self.z.is_nan()
    }

    pub fn has_m(&self) -> bool {
        !self.m.is_nan()
    }
}

impl fmt::Display for PointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)?;
        if self.has_z() {
            write!(f, " {}", self.z)?;
        }
        if self.has_m() {
            write!(f, " m={}", self.m)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Envelope {
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

/// One ring, linestring or point group of a multipart shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Part {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Option<Vec<f64>>,
    pub m: Option<Vec<f64>>,
}

impl Part {
    pub(crate) fn with_len(len: usize, has_z: bool, has_m: bool) -> Self {
        Self {
            x: vec![0.0; len],
            y: vec![0.0; len],
            z: has_z.then(|| vec![0.0; len]),
            m: has_m.then(|| vec![0.0; len]),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn point(&self, i: usize) -> Option<PointValue> {
        let x = *self.x.get(i)?;
        let y = *self.y.get(i)?;
        let pick = |dim: &Option<Vec<f64>>| {
            dim.as_ref()
                .and_then(|v| v.get(i).copied())
                .unwrap_or(f64::NAN)
        };
        Some(PointValue {
            x,
            y,
            z: pick(&self.z),
            m: pick(&self.m),
        })
    }

    pub fn points(&self) -> impl Iterator<Item = PointValue> + '_ {
        (0..self.len()).filter_map(move |i| self.point(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPart {
    pub modifiers: ShapeModifiers,
    pub envelope: Envelope,
    pub parts: SmallVec<[Part; 1]>,
}

impl MultiPart {
    pub fn structure(&self) -> ShapeStructure {
        self.modifiers.structure()
    }

    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    pub fn num_points(&self) -> usize {
        self.parts.iter().map(Part::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryValue {
    Empty,
    Point(PointValue),
    MultiPart(MultiPart),
}

impl GeometryValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_point(&self) -> Option<&PointValue> {
        match self {
            Self::Point(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_multipart(&self) -> Option<&MultiPart> {
        match self {
            Self::MultiPart(mp) => Some(mp),
            _ => None,
        }
    }
}

impl fmt::Display for GeometryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("EMPTY"),
            Self::Point(p) => write!(f, "POINT({})", p),
            Self::MultiPart(mp) => write!(
                f,
                "{:?}({} parts, {} points)",
                mp.structure(),
                mp.num_parts(),
                mp.num_points()
            ),
        }
    }
}
