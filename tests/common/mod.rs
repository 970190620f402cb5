//! Byte-level writers for `.gdbtable` / `.gdbtablx` fixtures.
//!
//! Fixtures are assembled field by field and row by row, then written into a
//! temporary directory under the file names a reader expects.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use gdbread::encoding::{encode_varint64, encode_varuint64};

pub const VERSION_9: i32 = 3;
pub const VERSION_10: i32 = 4;

const NULLABLE: u8 = 0x1;
const HAS_DEFAULT: u8 = 0x4;

pub fn varuint(value: u64) -> Vec<u8> {
    let mut buf = [0u8; 10];
    let n = encode_varuint64(value, &mut buf);
    buf[..n].to_vec()
}

pub fn varint(value: i64) -> Vec<u8> {
    let mut buf = [0u8; 10];
    let n = encode_varint64(value, &mut buf);
    buf[..n].to_vec()
}

fn utf16(name: &str) -> Vec<u8> {
    let units: Vec<u16> = name.encode_utf16().collect();
    let mut out = vec![units.len() as u8];
    for u in units {
        out.extend_from_slice(&u.to_le_bytes());
    }
    out
}

fn flags(nullable: bool) -> u8 {
    if nullable {
        NULLABLE
    } else {
        0
    }
}

/// Name, empty alias, then the raw type bytes.
pub fn field(name: &str, type_bytes: &[u8]) -> Vec<u8> {
    let mut out = utf16(name);
    out.push(0);
    out.extend_from_slice(type_bytes);
    out
}

pub fn object_id_field(name: &str) -> Vec<u8> {
    field(name, &[6, 4, 2])
}

pub fn int16_field(name: &str, nullable: bool) -> Vec<u8> {
    field(name, &[0, 2, flags(nullable)])
}

pub fn int32_field(name: &str, nullable: bool) -> Vec<u8> {
    field(name, &[1, 4, flags(nullable)])
}

pub fn int32_field_with_default(name: &str, default: i32) -> Vec<u8> {
    let mut bytes = vec![1, 4, NULLABLE | HAS_DEFAULT];
    bytes.extend_from_slice(&default.to_le_bytes());
    field(name, &bytes)
}

pub fn float64_field(name: &str, nullable: bool) -> Vec<u8> {
    field(name, &[3, 8, flags(nullable)])
}

pub fn string_field(name: &str, nullable: bool) -> Vec<u8> {
    let mut bytes = vec![4];
    bytes.extend_from_slice(&255i32.to_le_bytes());
    bytes.push(flags(nullable));
    bytes.push(0);
    field(name, &bytes)
}

pub fn date_field(name: &str, nullable: bool) -> Vec<u8> {
    field(name, &[5, 8, flags(nullable)])
}

pub fn binary_field(name: &str, nullable: bool) -> Vec<u8> {
    field(name, &[8, 0, flags(nullable)])
}

pub fn uuid_field(name: &str, nullable: bool) -> Vec<u8> {
    field(name, &[10, 0, flags(nullable)])
}

pub fn global_id_field(name: &str) -> Vec<u8> {
    field(name, &[11, 0, 0])
}

pub fn xml_field(name: &str, nullable: bool) -> Vec<u8> {
    field(name, &[12, 0, flags(nullable)])
}

pub fn raster_field(name: &str) -> Vec<u8> {
    field(name, &[9, 0, 0])
}

/// Geometry column with origin (0, 0) and the given scales.
#[derive(Debug, Clone)]
pub struct GeometryField {
    pub wkt: String,
    pub xyscale: f64,
    pub zscale: Option<f64>,
    pub mscale: Option<f64>,
    pub extent: [f64; 4],
    pub trailer_doubles: u8,
}

impl GeometryField {
    pub fn new(xyscale: f64) -> Self {
        Self {
            wkt: "GEOGCS[\"GCS_WGS_1984\"]".to_string(),
            xyscale,
            zscale: None,
            mscale: None,
            extent: [-180.0, -90.0, 180.0, 90.0],
            trailer_doubles: 1,
        }
    }

    pub fn with_z(mut self, zscale: f64) -> Self {
        self.zscale = Some(zscale);
        self
    }

    pub fn with_m(mut self, mscale: f64) -> Self {
        self.mscale = Some(mscale);
        self
    }

    pub fn trailer(mut self, doubles: u8) -> Self {
        self.trailer_doubles = doubles;
        self
    }

    pub fn bytes(&self, name: &str, nullable: bool) -> Vec<u8> {
        let mut b = vec![7, 0, flags(nullable)];
        b.extend_from_slice(&(self.wkt.len() as i16).to_le_bytes());
        b.extend_from_slice(self.wkt.as_bytes());

        let mut dims = 0u8;
        if self.mscale.is_some() {
            dims |= 0x2;
        }
        if self.zscale.is_some() {
            dims |= 0x4;
        }
        b.push(dims);

        let mut f64s = vec![0.0, 0.0, self.xyscale];
        if let Some(mscale) = self.mscale {
            f64s.extend([0.0, mscale]);
        }
        if let Some(zscale) = self.zscale {
            f64s.extend([0.0, zscale]);
        }
        f64s.push(0.001);
        if self.mscale.is_some() {
            f64s.push(0.001);
        }
        if self.zscale.is_some() {
            f64s.push(0.001);
        }
        f64s.extend(self.extent);
        for v in f64s {
            b.extend_from_slice(&v.to_le_bytes());
        }

        b.extend_from_slice(&[0, self.trailer_doubles, 0, 0, 0]);
        for _ in 0..self.trailer_doubles {
            b.extend_from_slice(&0.0f64.to_le_bytes());
        }

        field(name, &b)
    }
}

/// Null bitmap plus cells of one row, in field order.
#[derive(Debug, Clone, Default)]
pub struct RowBlob {
    bitmap: Vec<u8>,
    cells: Vec<u8>,
}

impl RowBlob {
    pub fn new(bitmap: &[u8]) -> Self {
        Self {
            bitmap: bitmap.to_vec(),
            cells: Vec::new(),
        }
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.cells.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.cells.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.cells.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn string(mut self, s: &str) -> Self {
        self.cells.extend(varuint(s.len() as u64));
        self.cells.extend_from_slice(s.as_bytes());
        self
    }

    pub fn binary(mut self, b: &[u8]) -> Self {
        self.cells.extend(varuint(b.len() as u64));
        self.cells.extend_from_slice(b);
        self
    }

    pub fn raw(mut self, b: &[u8]) -> Self {
        self.cells.extend_from_slice(b);
        self
    }

    /// Geometry cell: varuint length, then `body`.
    pub fn geometry(mut self, body: &[u8]) -> Self {
        self.cells.extend(varuint(body.len() as u64));
        self.cells.extend_from_slice(body);
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.bitmap.clone();
        out.extend_from_slice(&self.cells);
        out
    }
}

/// Geometry cell body assembled from varints.
#[derive(Debug, Clone, Default)]
pub struct ShapeBody(pub Vec<u8>);

impl ShapeBody {
    pub fn new(shape_code: u64) -> Self {
        Self(varuint(shape_code))
    }

    pub fn u(mut self, v: u64) -> Self {
        self.0.extend(varuint(v));
        self
    }

    pub fn i(mut self, v: i64) -> Self {
        self.0.extend(varint(v));
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A whole table: schema, rows keyed by 0-based logical row id, and the
/// layout of the index.
#[derive(Debug, Clone)]
pub struct TableFixture {
    fields: Vec<Vec<u8>>,
    version: i32,
    geometry_class: u8,
    row_count: Option<u64>,
    size_offset: usize,
    rows: BTreeMap<u64, Vec<u8>>,
    deleted: Vec<u64>,
}

impl Default for TableFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFixture {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            version: VERSION_10,
            geometry_class: 0,
            row_count: None,
            size_offset: 4,
            rows: BTreeMap::new(),
            deleted: Vec::new(),
        }
    }

    pub fn field(mut self, bytes: Vec<u8>) -> Self {
        self.fields.push(bytes);
        self
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn geometry_class(mut self, class: u8) -> Self {
        self.geometry_class = class;
        self
    }

    /// Header row count; defaults to one past the highest row id.
    pub fn row_count(mut self, rows: u64) -> Self {
        self.row_count = Some(rows);
        self
    }

    pub fn size_offset(mut self, width: usize) -> Self {
        self.size_offset = width;
        self
    }

    pub fn row(mut self, id: u64, blob: RowBlob) -> Self {
        self.rows.insert(id, blob.bytes());
        self
    }

    /// Row stored in a present block but with a zero offset.
    pub fn deleted(mut self, id: u64) -> Self {
        self.deleted.push(id);
        self
    }

    fn rows_total(&self) -> u64 {
        let last = self
            .rows
            .keys()
            .chain(self.deleted.iter())
            .max()
            .map_or(0, |id| id + 1);
        self.row_count.unwrap_or(last)
    }

    /// Returns the table file image and the offset of every stored row.
    pub fn table_bytes(&self) -> (Vec<u8>, BTreeMap<u64, u64>) {
        let mut section = (self.fields.len() as u16).to_le_bytes().to_vec();
        for f in &self.fields {
            section.extend_from_slice(f);
        }
        let section_len = (8 + section.len()) as i32;

        let mut out = Vec::new();
        out.extend_from_slice(&[3, 0, 0, 0]);
        out.extend_from_slice(&(self.rows_total() as i32).to_le_bytes());
        out.extend_from_slice(&[0u8; 16]);
        out.extend_from_slice(&0i32.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&40i32.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);

        out.extend_from_slice(&section_len.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.push(self.geometry_class);
        out.extend_from_slice(&[0u8; 3]);
        out.extend_from_slice(&section);

        let mut offsets = BTreeMap::new();
        for (&id, blob) in &self.rows {
            offsets.insert(id, out.len() as u64);
            out.extend_from_slice(&(blob.len() as i32).to_le_bytes());
            out.extend_from_slice(blob);
        }

        let size = out.len() as i32;
        out[24..28].copy_from_slice(&size.to_le_bytes());
        (out, offsets)
    }

    /// Index image for the given row offsets. Blocks without rows are left
    /// out through a sparse block map; a fully populated index gets a dense
    /// block map.
    pub fn index_bytes(&self, offsets: &BTreeMap<u64, u64>) -> Vec<u8> {
        let rows = self.rows_total();
        let total_blocks = rows.div_ceil(1024);
        let present: Vec<u64> = (0..total_blocks)
            .filter(|b| {
                offsets
                    .keys()
                    .chain(self.deleted.iter())
                    .any(|id| id / 1024 == *b)
            })
            .collect();

        let width = self.size_offset;
        let mut out = Vec::new();
        out.extend_from_slice(&[3, 0, 0, 0]);
        out.extend_from_slice(&(present.len() as i32).to_le_bytes());
        out.extend_from_slice(&(rows as i32).to_le_bytes());
        out.extend_from_slice(&(width as i32).to_le_bytes());

        for &block in &present {
            for i in 0..1024 {
                let id = block * 1024 + i;
                let offset = offsets.get(&id).copied().unwrap_or(0);
                out.extend_from_slice(&offset.to_le_bytes()[..width]);
            }
        }

        if present.is_empty() {
            return out;
        }

        let bit_count = total_blocks as u32;
        let dense = present.len() as u64 == total_blocks;

        out.extend_from_slice(&(if dense { 0u32 } else { 1u32 }).to_le_bytes());
        out.extend_from_slice(&bit_count.to_le_bytes());
        out.extend_from_slice(&(present.len() as u32).to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes());

        if !dense {
            let mut bitmap = vec![0u8; bit_count.div_ceil(8) as usize];
            for &b in &present {
                bitmap[(b / 8) as usize] |= 1 << (b % 8);
            }
            out.extend_from_slice(&bitmap);
        }
        out
    }

    /// Writes `a%08x.gdbtable` and `a%08x.gdbtablx` into `dir`.
    pub fn write(&self, dir: &Path, table_id: u32) {
        let (table, offsets) = self.table_bytes();
        let index = self.index_bytes(&offsets);
        let stem = gdbread::table_file_stem(table_id);

        std::fs::write(dir.join(format!("{}.gdbtable", stem)), table).unwrap();
        std::fs::write(dir.join(format!("{}.gdbtablx", stem)), index).unwrap();
    }
}

/// Installs a test subscriber so `RUST_LOG=gdbread=trace` shows reader events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
