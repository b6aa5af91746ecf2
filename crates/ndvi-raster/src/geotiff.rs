//! GeoTIFF georeferencing tags.
//!
//! Only north-up rasters are handled: either ModelPixelScale + ModelTiepoint,
//! or a ModelTransformation matrix without rotation terms. The GDAL no-data
//! tag is read as an ASCII number.

use std::io::{Read, Seek};

use ndvi_common::BoundingBox;
use tiff::decoder::Decoder;
use tiff::tags::Tag;

pub const MODEL_PIXEL_SCALE: u16 = 33550;
pub const MODEL_TIEPOINT: u16 = 33922;
pub const MODEL_TRANSFORMATION: u16 = 34264;
pub const GDAL_NODATA: u16 = 42113;

/// Affine placement of pixel `(col, row)` corners in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    /// Negative for north-up rasters.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Outer edges of a `width` x `height` raster.
    pub fn bounds(&self, width: u32, height: u32) -> BoundingBox {
        let x0 = self.origin_x;
        let x1 = self.origin_x + width as f64 * self.pixel_width;
        let y0 = self.origin_y;
        let y1 = self.origin_y + height as f64 * self.pixel_height;
        BoundingBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    /// From ModelPixelScale `[sx, sy, sz]` and ModelTiepoint `[i, j, k, x, y, z]`.
    pub fn from_scale_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        if scale.len() < 2 || tiepoint.len() < 6 {
            return None;
        }
        Some(Self {
            origin_x: tiepoint[3] - tiepoint[0] * scale[0],
            origin_y: tiepoint[4] + tiepoint[1] * scale[1],
            pixel_width: scale[0],
            pixel_height: -scale[1],
        })
    }

    /// From a row-major 4x4 ModelTransformation matrix. Rotated rasters are
    /// rejected.
    pub fn from_matrix(m: &[f64]) -> Option<Self> {
        if m.len() < 16 || m[1] != 0.0 || m[4] != 0.0 {
            return None;
        }
        Some(Self {
            origin_x: m[3],
            origin_y: m[7],
            pixel_width: m[0],
            pixel_height: m[5],
        })
    }
}

fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Read the geotransform from whichever model tags the file carries.
pub fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(tag(MODEL_PIXEL_SCALE)).ok();
    let tiepoint = decoder.get_tag_f64_vec(tag(MODEL_TIEPOINT)).ok();
    if let (Some(scale), Some(tiepoint)) = (scale, tiepoint) {
        if let Some(gt) = GeoTransform::from_scale_tiepoint(&scale, &tiepoint) {
            return Some(gt);
        }
    }

    decoder
        .get_tag_f64_vec(tag(MODEL_TRANSFORMATION))
        .ok()
        .and_then(|m| GeoTransform::from_matrix(&m))
}

/// Raster bounds from embedded georeferencing, if any.
pub fn read_bounds<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    width: u32,
    height: u32,
) -> Option<BoundingBox> {
    let bounds = read_geotransform(decoder)?.bounds(width, height);
    bounds.validate().ok().map(|_| bounds)
}

/// GDAL no-data value, stored as an ASCII number.
pub fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder.get_tag_ascii_string(tag(GDAL_NODATA)).ok()?;
    parse_nodata(&text)
}

fn parse_nodata(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" | "-nan" => None,
        other => other.parse().ok(),
    }
}
