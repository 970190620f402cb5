//! # Geometry Field Descriptor
//!
//! Schema-time metadata of a geometry column: spatial reference text, the
//! scale/origin pairs that turn stored integers back into coordinates, the
//! tolerances, and the layer extent.
//!
//! ## Layout
//!
//! ```text
//! i16      wkt_len
//! [u8]     wkt (wkt_len bytes, absent when wkt_len <= 0)
//! u8       flags             0x2 = has M, 0x4 = has Z
//! f64 x3   xorigin yorigin xyscale
//! f64 x2   morigin mscale    (has M)
//! f64 x2   zorigin zscale    (has Z)
//! f64      xytolerance
//! f64      mtolerance        (has M)
//! f64      ztolerance        (has Z)
//! f64 x4   xmin ymin xmax ymax
//! ...      trailer
//! ```
//!
//! ## Trailer
//!
//! The trailer has no declared length. It is consumed by scanning: peek five
//! bytes, and if they read `00 n 00 00 00` with `n` in `1..=3`, consume `n`
//! more doubles and stop. Otherwise rewind and consume one double, then scan
//! again. The number of doubles consumed in total is kept; exactly three
//! marks a descriptor as carrying 3D grid data.

use eyre::Result;

use crate::config::{MAX_TRAILER_MARKER, TRAILER_VALUES_3D};
use crate::storage::ByteCursor;

use super::value::Envelope;

const FLAG_HAS_M: u8 = 0x2;
const FLAG_HAS_Z: u8 = 0x4;

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDescriptor {
    pub wkt: Option<String>,
    pub has_z: bool,
    pub has_m: bool,
    pub xorigin: f64,
    pub yorigin: f64,
    pub xyscale: f64,
    pub morigin: f64,
    pub mscale: f64,
    pub zorigin: f64,
    pub zscale: f64,
    pub xytolerance: f64,
    pub mtolerance: f64,
    pub ztolerance: f64,
    pub extent: Envelope,
    pub(crate) trailer_values: usize,
}

impl GeometryDescriptor {
    /// Parses the descriptor starting at the WKT length word.
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let wkt_len = cursor.read_i16()?;
        let wkt = if wkt_len > 0 {
            let bytes = cursor.read_bytes(wkt_len as u64)?;
            Some(String::from_utf8_lossy(bytes).into_owned())
        } else {
            None
        };

        let flags = cursor.read_u8()?;
        let has_m = flags & FLAG_HAS_M != 0;
        let has_z = flags & FLAG_HAS_Z != 0;

        let xorigin = cursor.read_f64()?;
        let yorigin = cursor.read_f64()?;
        let xyscale = cursor.read_f64()?;

        let (morigin, mscale) = if has_m {
            (cursor.read_f64()?, cursor.read_f64()?)
        } else {
            (0.0, 0.0)
        };

        let (zorigin, zscale) = if has_z {
            (cursor.read_f64()?, cursor.read_f64()?)
        } else {
            (0.0, 0.0)
        };

        let xytolerance = cursor.read_f64()?;
        let mtolerance = if has_m { cursor.read_f64()? } else { 0.0 };
        let ztolerance = if has_z { cursor.read_f64()? } else { 0.0 };

        let extent = Envelope {
            xmin: cursor.read_f64()?,
            ymin: cursor.read_f64()?,
            xmax: cursor.read_f64()?,
            ymax: cursor.read_f64()?,
        };

        let trailer_values = skip_trailer(cursor)?;

        Ok(Self {
            wkt,
            has_z,
            has_m,
            xorigin,
            yorigin,
            xyscale,
            morigin,
            mscale,
            zorigin,
            zscale,
            xytolerance,
            mtolerance,
            ztolerance,
            extent,
            trailer_values,
        })
    }

    pub fn has_3d(&self) -> bool {
        self.trailer_values == TRAILER_VALUES_3D
    }

    /// Doubles consumed by the trailer scan.
    pub fn trailer_values(&self) -> usize {
        self.trailer_values
    }
}

fn skip_trailer(cursor: &mut ByteCursor<'_>) -> Result<usize> {
    let mut doubles = 0;

    loop {
        let pos = cursor.position();
        let probe: [u8; 5] = cursor.read_array()?;

        let count = probe[1];
        if probe[0] == 0 && probe[2..] == [0, 0, 0] && (1..=MAX_TRAILER_MARKER).contains(&count) {
            for _ in 0..count {
                cursor.read_f64()?;
                doubles += 1;
            }
            return Ok(doubles);
        }

        cursor.seek(pos);
        cursor.read_f64()?;
        doubles += 1;
    }
}
