//! Shared test utilities for the ndvi-viewer workspace.
//!
//! - Synthetic NDVI grids ([`generators`])
//! - Expected colormap table and bounding boxes ([`fixtures`])
//! - A GeoTIFF writer for loader and service tests ([`geotiff`])
//! - Locating the optional full-size scene ([`paths`], [`require_test_file!`])

pub mod fixtures;
pub mod generators;
pub mod geotiff;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use geotiff::*;
pub use paths::*;

/// Resolve a data file via [`find_test_file`], or print a notice and return
/// from the calling test when it is absent.
///
/// ```ignore
/// #[test]
/// fn test_crc_scene() {
///     let path = require_test_file!(CRC_SCENE_FILE);
///     let raster = ndvi_raster::read_ndvi_tiff(&path).unwrap();
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: '{}' not found. Place it under data/ or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Assert two numbers differ by at most `epsilon`. Operands are compared as
/// `f64`, so `f32` samples can be checked against `f64` constants.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
