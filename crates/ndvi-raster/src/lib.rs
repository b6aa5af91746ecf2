//! NDVI raster loading.
//!
//! Decodes a single-band TIFF into a row-major `f32` grid. Samples keep their
//! stored values (NDVI in `[-1, 1]` for float rasters); no-data samples are
//! turned into NaN so downstream code has a single "missing" marker.
//!
//! Georeferencing is read from the GeoTIFF model tags when present, see
//! [`geotiff`].

pub mod error;
pub mod geotiff;
pub mod raster;

pub use error::{RasterError, RasterResult};
pub use raster::{NdviRaster, RasterStats};

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::ColorType;
use tracing::{debug, warn};

/// Read an NDVI GeoTIFF from disk.
pub fn read_ndvi_tiff(path: impl AsRef<Path>) -> RasterResult<NdviRaster> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RasterError::Open {
        path: path.display().to_string(),
        source: e,
    })?;
    let raster = decode_ndvi_tiff(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        georeferenced = raster.bounds().is_some(),
        "Decoded NDVI raster"
    );
    Ok(raster)
}

/// Read an NDVI GeoTIFF from an in-memory buffer.
pub fn read_ndvi_tiff_from_buffer(data: &[u8]) -> RasterResult<NdviRaster> {
    decode_ndvi_tiff(Cursor::new(data))
}

fn decode_ndvi_tiff<R: Read + Seek>(reader: R) -> RasterResult<NdviRaster> {
    let mut decoder = Decoder::new(reader)?;

    let (width, height) = decoder.dimensions()?;
    match decoder.colortype()? {
        ColorType::Gray(_) => {}
        other => {
            return Err(RasterError::UnsupportedFormat(format!(
                "expected a single-band raster, found {:?}",
                other
            )))
        }
    }

    let samples = widen_to_f32(decoder.read_image()?)?;

    let mut raster = NdviRaster::new(width as usize, height as usize, samples)?;

    if let Some(nodata) = geotiff::read_nodata(&mut decoder) {
        let masked = raster.mask_value(nodata);
        debug!(nodata, masked, "Applied no-data mask");
    }

    match geotiff::read_bounds(&mut decoder, width, height) {
        Some(bounds) => {
            if bounds.west < -180.0 || bounds.east > 180.0 || bounds.south < -90.0 || bounds.north > 90.0 {
                warn!(?bounds, "Embedded bounds are not geographic degrees; overlay placement may be wrong");
            }
            raster.set_bounds(bounds);
        }
        None => debug!("No georeferencing tags found"),
    }

    Ok(raster)
}

/// Convert any decoded sample buffer to `f32`.
fn widen_to_f32(result: DecodingResult) -> RasterResult<Vec<f32>> {
    fn cast<T: num_traits::NumCast>(buf: Vec<T>) -> Vec<f32> {
        buf.into_iter()
            .map(|v| num_traits::cast(v).unwrap_or(f32::NAN))
            .collect()
    }

    let data = match result {
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => cast(buf),
        DecodingResult::U8(buf) => cast(buf),
        DecodingResult::U16(buf) => cast(buf),
        DecodingResult::U32(buf) => cast(buf),
        DecodingResult::U64(buf) => cast(buf),
        DecodingResult::I8(buf) => cast(buf),
        DecodingResult::I16(buf) => cast(buf),
        DecodingResult::I32(buf) => cast(buf),
        DecodingResult::I64(buf) => cast(buf),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(RasterError::UnsupportedFormat(
                "unsupported TIFF sample format".to_string(),
            ))
        }
    };
    Ok(data)
}
