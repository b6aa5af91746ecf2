//! Synthetic NDVI grids.
//!
//! All generators return row-major `Vec<f32>` with row 0 first.

/// A west-to-east ramp from -1.0 (first column) towards 1.0 (last column).
///
/// The last column is exactly `1.0`, which exercises the colormap's
/// upper-edge fallback.
pub fn create_ndvi_ramp(width: usize, height: usize) -> Vec<f32> {
    let denom = (width.max(2) - 1) as f32;
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            data.push(-1.0 + 2.0 * col as f32 / denom);
        }
    }
    data
}

/// A field-like pattern: dense vegetation in the middle fading to bare soil
/// at the edges, values in roughly `[-0.1, 0.9]`.
pub fn create_field_grid(width: usize, height: usize) -> Vec<f32> {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - cx;
            let dy = row as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt() / max_dist;
            data.push(0.9 - dist);
        }
    }
    data
}

/// Copy of `data` with every `every`-th sample replaced by NaN.
pub fn with_missing(mut data: Vec<f32>, every: usize) -> Vec<f32> {
    if every == 0 {
        return data;
    }
    for v in data.iter_mut().step_by(every) {
        *v = f32::NAN;
    }
    data
}

/// One sample from inside each of the ten colormap buckets, in bucket order.
pub fn bucket_midpoints() -> Vec<f32> {
    vec![-0.5, 0.05, 0.15, 0.25, 0.35, 0.45, 0.55, 0.65, 0.75, 0.9]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        let grid = create_ndvi_ramp(11, 2);
        assert_eq!(grid.len(), 22);
        assert_eq!(grid[0], -1.0);
        assert_eq!(grid[10], 1.0);
        assert_eq!(grid[11], -1.0);
    }

    #[test]
    fn test_field_grid_range() {
        let grid = create_field_grid(32, 32);
        assert!(grid.iter().all(|v| (-0.2..=0.9).contains(v)));
    }

    #[test]
    fn test_with_missing() {
        let grid = with_missing(vec![0.5; 10], 3);
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 4);
        assert!(grid[0].is_nan());
        assert!(!grid[1].is_nan());
    }
}
