//! Raster loading errors.

use ndvi_common::NdviError;
use thiserror::Error;

/// Result type for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TIFF decode error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Unsupported raster: {0}")]
    UnsupportedFormat(String),

    #[error("Sample count {actual} does not match {width}x{height}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        actual: usize,
    },
}

impl From<RasterError> for NdviError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::UnsupportedFormat(msg) => NdviError::UnsupportedFormat(msg),
            other => NdviError::RasterRead(other.to_string()),
        }
    }
}
