//! Integration tests for NDVI GeoTIFF loading.
//!
//! Fixtures are written with the `tiff` encoder into a temporary directory.
//! The full-size CRC scene is used when available and skipped otherwise.

use ndvi_common::NdviError;
use ndvi_raster::{read_ndvi_tiff, read_ndvi_tiff_from_buffer, RasterError};
use test_utils::{
    assert_approx_eq, bbox, create_field_grid, create_ndvi_ramp, require_test_file,
    temp_test_dir, write_test_geotiff, write_test_tiff_rgb, write_test_tiff_u8, GeoTiffFixture,
    CRC_SCENE_FILE,
};

// ============================================================================
// Samples
// ============================================================================

#[test]
fn test_float_samples_preserved() {
    let dir = temp_test_dir();
    let path = dir.path().join("ramp.tif");
    let data = create_ndvi_ramp(16, 4);
    write_test_geotiff(&path, 16, 4, &data, GeoTiffFixture::default()).unwrap();

    let raster = read_ndvi_tiff(&path).unwrap();
    assert_eq!(raster.width(), 16);
    assert_eq!(raster.height(), 4);
    assert_eq!(raster.data(), &data[..]);
    assert_eq!(raster.get(0, 15), Some(1.0));
    assert_eq!(raster.get(4, 0), None);
}

#[test]
fn test_nan_samples_survive() {
    let dir = temp_test_dir();
    let path = dir.path().join("nan.tif");
    let data = vec![0.1, f32::NAN, 0.3, f32::NAN];
    write_test_geotiff(&path, 2, 2, &data, GeoTiffFixture::default()).unwrap();

    let raster = read_ndvi_tiff(&path).unwrap();
    let stats = raster.stats();
    assert_eq!(stats.finite_count, 2);
    assert_eq!(stats.missing_count, 2);
}

#[test]
fn test_integer_samples_widen() {
    let dir = temp_test_dir();
    let path = dir.path().join("u8.tif");
    let data: Vec<u8> = (0..12).collect();
    write_test_tiff_u8(&path, 4, 3, &data).unwrap();

    let raster = read_ndvi_tiff(&path).unwrap();
    assert_eq!(raster.data().len(), 12);
    assert_eq!(raster.get(2, 3), Some(11.0));
    assert!(raster.bounds().is_none());
}

#[test]
fn test_from_buffer_matches_file() {
    let dir = temp_test_dir();
    let path = dir.path().join("field.tif");
    let data = create_field_grid(20, 10);
    write_test_geotiff(&path, 20, 10, &data, GeoTiffFixture::default()).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let from_buffer = read_ndvi_tiff_from_buffer(&bytes).unwrap();
    let from_file = read_ndvi_tiff(&path).unwrap();
    assert_eq!(from_buffer.data(), from_file.data());
}

// ============================================================================
// Georeferencing
// ============================================================================

#[test]
fn test_bounds_from_model_tags() {
    let dir = temp_test_dir();
    let path = dir.path().join("crc.tif");
    let (w, h) = (30, 34);
    let data = create_field_grid(w, h);
    let fixture = GeoTiffFixture {
        bounds: Some(bbox::CRC_NAIP_2011),
        nodata: None,
    };
    write_test_geotiff(&path, w as u32, h as u32, &data, fixture).unwrap();

    let bounds = read_ndvi_tiff(&path).unwrap().bounds().expect("bounds from tags");
    let (west, south, east, north) = bbox::CRC_NAIP_2011;
    assert_approx_eq!(bounds.west, west, 1e-9);
    assert_approx_eq!(bounds.south, south, 1e-9);
    assert_approx_eq!(bounds.east, east, 1e-9);
    assert_approx_eq!(bounds.north, north, 1e-9);
}

#[test]
fn test_no_tags_means_no_bounds() {
    let dir = temp_test_dir();
    let path = dir.path().join("plain.tif");
    write_test_geotiff(&path, 2, 1, &[0.0, 0.5], GeoTiffFixture::default()).unwrap();
    assert!(read_ndvi_tiff(&path).unwrap().bounds().is_none());
}

// ============================================================================
// No-data
// ============================================================================

#[test]
fn test_nodata_becomes_nan() {
    let dir = temp_test_dir();
    let path = dir.path().join("nodata.tif");
    let data = vec![-9999.0, 0.2, 0.4, -9999.0, 0.6, 0.8];
    let fixture = GeoTiffFixture {
        bounds: Some(bbox::UNIT_SQUARE),
        nodata: Some(-9999.0),
    };
    write_test_geotiff(&path, 3, 2, &data, fixture).unwrap();

    let raster = read_ndvi_tiff(&path).unwrap();
    assert!(raster.get(0, 0).unwrap().is_nan());
    assert!(raster.get(1, 0).unwrap().is_nan());
    assert_eq!(raster.get(0, 1), Some(0.2));
    assert_eq!(raster.stats().missing_count, 2);
}

#[test]
fn test_nodata_float32_min_text_becomes_nan() {
    let dir = temp_test_dir();
    let path = dir.path().join("nodata_f32_min.tif");
    let data = vec![f32::MIN, 0.2, 0.4, f32::MIN];
    let fixture = GeoTiffFixture {
        bounds: Some(bbox::UNIT_SQUARE),
        // GDAL writes float32 no-data with 15 significant digits.
        nodata: Some("-3.40282346638529e+38".parse().unwrap()),
    };
    write_test_geotiff(&path, 2, 2, &data, fixture).unwrap();

    let raster = read_ndvi_tiff(&path).unwrap();
    let stats = raster.stats();
    assert_eq!(stats.missing_count, 2);
    assert_eq!(stats.min, Some(0.2));
    assert_eq!(raster.get(0, 1), Some(0.2));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_rgb_rejected() {
    let dir = temp_test_dir();
    let path = dir.path().join("rgb.tif");
    write_test_tiff_rgb(&path, 2, 2, &[0u8; 12]).unwrap();

    let err = read_ndvi_tiff(&path).unwrap_err();
    assert!(matches!(err, RasterError::UnsupportedFormat(_)));
    assert!(matches!(NdviError::from(err), NdviError::UnsupportedFormat(_)));
}

#[test]
fn test_missing_file() {
    let err = read_ndvi_tiff("/nonexistent/ndvi.tif").unwrap_err();
    assert!(matches!(err, RasterError::Open { .. }));
    assert!(err.to_string().contains("/nonexistent/ndvi.tif"));
}

#[test]
fn test_garbage_buffer() {
    let err = read_ndvi_tiff_from_buffer(b"not a tiff at all").unwrap_err();
    assert!(matches!(err, RasterError::Tiff(_)));
}

// ============================================================================
// Real data
// ============================================================================

#[test]
fn test_crc_scene() {
    let path = require_test_file!(CRC_SCENE_FILE);
    let raster = read_ndvi_tiff(&path).unwrap();
    assert!(raster.width() > 0 && raster.height() > 0);

    let stats = raster.stats();
    assert!(stats.finite_count > 0);
    assert!(stats.min.unwrap() >= -1.0);
    assert!(stats.max.unwrap() <= 1.0);
}
