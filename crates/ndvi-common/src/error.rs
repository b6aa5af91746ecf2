//! Error types for the NDVI viewer.

use thiserror::Error;

/// Result type alias using NdviError.
pub type NdviResult<T> = Result<T, NdviError>;

/// Primary error type for loading, rendering and serving NDVI layers.
#[derive(Debug, Error)]
pub enum NdviError {
    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Invalid bounds: {0}")]
    InvalidBbox(String),

    // === Data Errors ===
    #[error("Failed to read raster: {0}")]
    RasterRead(String),

    #[error("Unsupported raster format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NdviError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            NdviError::InvalidParameter { .. } | NdviError::InvalidBbox(_) => 400,
            NdviError::LayerNotFound(_) => 404,
            _ => 500,
        }
    }
}

impl From<std::io::Error> for NdviError {
    fn from(err: std::io::Error) -> Self {
        NdviError::RasterRead(err.to_string())
    }
}

impl From<serde_json::Error> for NdviError {
    fn from(err: serde_json::Error) -> Self {
        NdviError::Internal(format!("JSON error: {}", err))
    }
}

impl From<crate::bbox::BboxParseError> for NdviError {
    fn from(err: crate::bbox::BboxParseError) -> Self {
        NdviError::InvalidBbox(err.to_string())
    }
}
