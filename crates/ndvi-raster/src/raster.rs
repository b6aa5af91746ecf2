//! In-memory NDVI grid.

use ndvi_common::BoundingBox;
use serde::Serialize;

use crate::error::{RasterError, RasterResult};

/// A decoded single-band raster.
///
/// Samples are row-major with row 0 at the north edge. NaN marks a missing
/// sample.
#[derive(Debug, Clone)]
pub struct NdviRaster {
    width: usize,
    height: usize,
    data: Vec<f32>,
    bounds: Option<BoundingBox>,
}

/// Summary statistics over the finite samples of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RasterStats {
    pub finite_count: usize,
    pub missing_count: usize,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub mean: Option<f64>,
}

impl NdviRaster {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> RasterResult<Self> {
        if data.len() != width * height {
            return Err(RasterError::InvalidDimensions {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            bounds: None,
        })
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn set_bounds(&mut self, bounds: BoundingBox) {
        self.bounds = Some(bounds);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Bounds from the file's georeferencing tags, if any.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Sample at `(row, col)`, `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Iterate over finite samples only (NaN and infinities excluded).
    pub fn finite_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied().filter(|v| v.is_finite())
    }

    /// Replace every sample equal to `nodata` with NaN. Returns the number of
    /// samples replaced.
    ///
    /// The comparison happens at sample precision, so a rounded tag value such
    /// as `-3.40282346638529e+38` still matches `f32::MIN`.
    pub fn mask_value(&mut self, nodata: f64) -> usize {
        if nodata.is_nan() {
            return 0;
        }
        let nodata = nodata as f32;
        let mut masked = 0;
        for v in self.data.iter_mut() {
            if *v == nodata {
                *v = f32::NAN;
                masked += 1;
            }
        }
        masked
    }

    pub fn stats(&self) -> RasterStats {
        let mut finite_count = 0usize;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;

        for v in self.finite_values() {
            finite_count += 1;
            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
        }

        let any = finite_count > 0;
        RasterStats {
            finite_count,
            missing_count: self.data.len() - finite_count,
            min: any.then_some(min),
            max: any.then_some(max),
            mean: any.then(|| sum / finite_count as f64),
        }
    }
}
