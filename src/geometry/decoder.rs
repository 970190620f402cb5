//! # Geometry Cell Decoder
//!
//! Turns one geometry cell into a [`GeometryValue`] using the column's
//! [`GeometryDescriptor`].
//!
//! ## Cell Layout
//!
//! ```text
//! varuint32  len          bytes that follow
//! varuint32  shape code   see `shape`
//! ...        payload      structure-dependent
//! ```
//!
//! The payload is decoded through a cursor bounded to `len` bytes, and the
//! outer cursor always ends at `start + len`, whatever the payload consumed.
//!
//! ## Transforms
//!
//! | Value | Formula |
//! |-------|---------|
//! | point x, y | `(raw - 1) / xyscale + origin` |
//! | point z | `raw - 1`, kept as literal `0` when zero, else `/ zscale + zorigin` |
//! | point m | `raw / mscale + morigin` |
//! | envelope | `raw / xyscale + origin` |
//! | multipart x, y, z, m | running sum of signed deltas, `/ scale + origin` |
//!
//! ## Multipart Payload
//!
//! ```text
//! varuint32  npoints      0 => Empty
//! varuint32  nparts       (polyline, polygon)
//! varuint32  ncurves      (when the code has curves)
//! varuint64 x4            envelope
//! varuint64  x nparts-1   points per part; the last part takes the rest
//! varint64   x 2*npoints  x/y deltas, all parts in order
//! varint64   x npoints    z deltas (has Z)
//! varint64   x npoints    m deltas (has M)
//! curves                  ncurves x (varint64 part index, varuint32 type)
//! ```
//!
//! Multipoints carry no part or curve counts and decode as one part.

use eyre::Result;
use smallvec::SmallVec;

use crate::config::MAX_GEOMETRY_POINTS;
use crate::error::GdbError;
use crate::storage::ByteCursor;

use super::descriptor::GeometryDescriptor;
use super::shape::{ShapeModifiers, ShapeStructure};
use super::value::{Envelope, GeometryValue, MultiPart, Part, PointValue};

impl GeometryDescriptor {
    /// Decodes the geometry cell at the cursor and leaves the cursor at the
    /// end of the cell.
    pub fn decode(&self, cursor: &mut ByteCursor<'_>) -> Result<GeometryValue> {
        let len = cursor.read_varuint32()?;
        let start = cursor.position();

        let mut body = cursor.bounded(len as u64)?;
        let value = self.decode_body(&mut body);

        cursor.seek(start + len as u64);
        value
    }

    fn decode_body(&self, body: &mut ByteCursor<'_>) -> Result<GeometryValue> {
        let at = body.position();
        let modifiers = ShapeModifiers::from_code(body.read_varuint32()?, at)?;

        match modifiers.structure() {
            ShapeStructure::Null => Ok(GeometryValue::Empty),
            ShapeStructure::Point => self.read_point(body, &modifiers).map(GeometryValue::Point),
            ShapeStructure::Polyline | ShapeStructure::Polygon | ShapeStructure::Multipoint => {
                self.read_multipart(body, modifiers)
            }
            ShapeStructure::MultiPatch => {
                Err(GdbError::unsupported(at, format!("{} geometry", modifiers.shape())).into())
            }
        }
    }

    fn read_point(&self, body: &mut ByteCursor<'_>, modifiers: &ShapeModifiers) -> Result<PointValue> {
        let x = (body.read_varuint64()? as f64 - 1.0) / self.xyscale + self.xorigin;
        let y = (body.read_varuint64()? as f64 - 1.0) / self.xyscale + self.yorigin;

        let z = if modifiers.has_z() {
            let raw = body.read_varuint64()? as f64 - 1.0;
            if raw == 0.0 {
                raw
            } else {
                raw / self.zscale + self.zorigin
            }
        } else {
            f64::NAN
        };

        let m = if modifiers.has_m() {
            body.read_varuint64()? as f64 / self.mscale + self.morigin
        } else {
            f64::NAN
        };

        Ok(PointValue { x, y, z, m })
    }

    fn read_multipart(
        &self,
        body: &mut ByteCursor<'_>,
        modifiers: ShapeModifiers,
    ) -> Result<GeometryValue> {
        let at = body.position();
        let npoints = body.read_varuint32()? as u64;

        if npoints == 0 {
            return Ok(GeometryValue::Empty);
        }
        if npoints > MAX_GEOMETRY_POINTS {
            return Err(GdbError::format(
                at,
                format!("point count {} exceeds {}", npoints, MAX_GEOMETRY_POINTS),
            )
            .into());
        }

        let multipoint = modifiers.structure() == ShapeStructure::Multipoint;

        let (nparts, ncurves) = if multipoint {
            (1, 0)
        } else {
            let parts_at = body.position();
            let nparts = body.read_varuint32()? as u64;
            let ncurves = if modifiers.has_curves() {
                body.read_varuint32()? as u64
            } else {
                0
            };

            if ncurves > npoints {
                return Err(GdbError::format(
                    parts_at,
                    format!("curve count {} exceeds point count {}", ncurves, npoints),
                )
                .into());
            }
            if nparts == 0 {
                return Err(GdbError::format(
                    parts_at,
                    format!("{} points but no parts", npoints),
                )
                .into());
            }
            (nparts, ncurves)
        };

        let envelope = Envelope {
            xmin: body.read_varuint64()? as f64 / self.xyscale + self.xorigin,
            ymin: body.read_varuint64()? as f64 / self.xyscale + self.yorigin,
            xmax: body.read_varuint64()? as f64 / self.xyscale + self.xorigin,
            ymax: body.read_varuint64()? as f64 / self.xyscale + self.yorigin,
        };

        let counts = read_part_counts(body, npoints, nparts)?;

        // every point needs at least one byte per x and y delta
        if npoints.saturating_mul(2) > body.remaining() {
            return Err(GdbError::format(
                body.position(),
                format!(
                    "{} points cannot fit in the remaining {} bytes",
                    npoints,
                    body.remaining()
                ),
            )
            .into());
        }

        let (has_z, has_m) = (modifiers.has_z(), modifiers.has_m());
        let mut parts: SmallVec<[Part; 1]> = counts
            .iter()
            .map(|&n| Part::with_len(n as usize, has_z, has_m))
            .collect();

        let (mut dx, mut dy) = (0i64, 0i64);
        for part in parts.iter_mut() {
            for i in 0..part.len() {
                dx = dx.wrapping_add(body.read_varint64()?);
                dy = dy.wrapping_add(body.read_varint64()?);
                part.x[i] = dx as f64 / self.xyscale + self.xorigin;
                part.y[i] = dy as f64 / self.xyscale + self.yorigin;
            }
        }

        if has_z {
            read_delta_pass(body, &mut parts, |p| p.z.as_mut(), self.zscale, self.zorigin)?;
        }
        if has_m {
            read_delta_pass(body, &mut parts, |p| p.m.as_mut(), self.mscale, self.morigin)?;
        }

        if ncurves > 0 {
            let curve_at = body.position();
            let _part = body.read_varint64()?;
            let curve_type = body.read_varuint32()?;
            return Err(GdbError::unsupported(
                curve_at,
                format!("curve segment of type {}", curve_type),
            )
            .into());
        }

        Ok(GeometryValue::MultiPart(MultiPart {
            modifiers,
            envelope,
            parts,
        }))
    }
}

fn read_part_counts(
    body: &mut ByteCursor<'_>,
    npoints: u64,
    nparts: u64,
) -> Result<SmallVec<[u64; 4]>> {
    let mut counts = SmallVec::new();
    let mut remain = npoints;

    for _ in 1..nparts {
        let at = body.position();
        let n = body.read_varuint64()?;
        remain = remain.checked_sub(n).ok_or_else(|| {
            GdbError::corruption(
                at,
                format!("part of {} points overruns the {} remaining", n, remain),
            )
        })?;
        counts.push(n);
    }
    counts.push(remain);

    Ok(counts)
}

fn read_delta_pass(
    body: &mut ByteCursor<'_>,
    parts: &mut [Part],
    dim: impl Fn(&mut Part) -> Option<&mut Vec<f64>>,
    scale: f64,
    origin: f64,
) -> Result<()> {
    let mut acc = 0i64;
    for part in parts.iter_mut() {
        if let Some(values) = dim(part) {
            for v in values.iter_mut() {
                acc = acc.wrapping_add(body.read_varint64()?);
                *v = acc as f64 / scale + origin;
            }
        }
    }
    Ok(())
}
