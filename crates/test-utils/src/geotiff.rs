//! Writes small GeoTIFF fixtures for loader and service tests.

use std::fs::File;
use std::path::Path;

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Georeferencing and no-data options for [`write_test_geotiff`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffFixture {
    /// `(west, south, east, north)`; written as pixel scale + tiepoint.
    pub bounds: Option<(f64, f64, f64, f64)>,
    /// Written as the GDAL no-data ASCII tag.
    pub nodata: Option<f64>,
}

/// Write a single-band `f32` TIFF.
pub fn write_test_geotiff(
    path: &Path,
    width: u32,
    height: u32,
    data: &[f32],
    fixture: GeoTiffFixture,
) -> tiff::TiffResult<()> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;
    let mut image = encoder.new_image::<colortype::Gray32Float>(width, height)?;

    if let Some((west, south, east, north)) = fixture.bounds {
        let scale = [
            (east - west) / width as f64,
            (north - south) / height as f64,
            0.0,
        ];
        let tiepoint = [0.0, 0.0, 0.0, west, north, 0.0];
        image.encoder().write_tag(Tag::Unknown(33550), &scale[..])?;
        image.encoder().write_tag(Tag::Unknown(33922), &tiepoint[..])?;
    }
    if let Some(nodata) = fixture.nodata {
        let text = nodata.to_string();
        image.encoder().write_tag(Tag::Unknown(42113), text.as_str())?;
    }

    image.write_data(data)
}

/// Write a single-band `u8` TIFF with no georeferencing.
pub fn write_test_tiff_u8(path: &Path, width: u32, height: u32, data: &[u8]) -> tiff::TiffResult<()> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;
    encoder.write_image::<colortype::Gray8>(width, height, data)
}

/// Write a three-band `u8` TIFF, which the NDVI loader must reject.
pub fn write_test_tiff_rgb(path: &Path, width: u32, height: u32, data: &[u8]) -> tiff::TiffResult<()> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;
    encoder.write_image::<colortype::RGB8>(width, height, data)
}
