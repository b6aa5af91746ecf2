//! Common test fixtures.

/// Bounding boxes as `(west, south, east, north)`.
pub mod bbox {
    /// Extent of the CRC NAIP 2011 NDVI scene.
    pub const CRC_NAIP_2011: (f64, f64, f64, f64) = (-109.870, 38.123, -109.855, 38.140);

    /// A one-degree test square.
    pub const UNIT_SQUARE: (f64, f64, f64, f64) = (10.0, 20.0, 11.0, 21.0);

    /// Inverted (west > east).
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Expected colormap table, `(hex, lower bound)` per bucket.
pub const NDVI_BUCKETS: [(&str, f32); 10] = [
    ("#FFFFFF", -1.0),
    ("#CE7E45", 0.0),
    ("#FCD163", 0.1),
    ("#99B718", 0.2),
    ("#66A000", 0.3),
    ("#207401", 0.4),
    ("#056201", 0.5),
    ("#004C00", 0.6),
    ("#023B01", 0.7),
    ("#012E01", 0.8),
];

/// File name of the full-size scene the default layer config points at.
pub const CRC_SCENE_FILE: &str = "CRC_NAIP_2011_NDVI.tif";
