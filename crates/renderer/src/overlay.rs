//! Colorized overlay rendering for NDVI grids.

use ndvi_common::Rgba;
use rayon::prelude::*;
use tracing::debug;

use crate::colormap::{classify, overlay_palette};
use crate::png::create_png_indexed;

/// Render a grid to RGBA pixels with an arbitrary color function.
///
/// # Arguments
/// - `data`: samples in row-major order
/// - `width`: number of columns
/// - `height`: number of rows
/// - `color_fn`: maps one sample to a color
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel). Samples missing from a short `data`
/// slice are left transparent.
pub fn render_rgba<F>(data: &[f32], width: usize, height: usize, color_fn: F) -> Vec<u8>
where
    F: Fn(f64) -> Rgba + Sync,
{
    let mut pixels = vec![0u8; width * height * 4];
    if width == 0 {
        return pixels;
    }

    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(row, out)| {
            let start = row * width;
            let end = (start + width).min(data.len());
            if start >= end {
                return;
            }
            for (px, &value) in out.chunks_exact_mut(4).zip(&data[start..end]) {
                px.copy_from_slice(&color_fn(value as f64).to_rgba8());
            }
        });

    pixels
}

/// Classify every sample into an [`overlay_palette`] index.
pub fn render_indices(data: &[f32], width: usize, height: usize) -> Vec<u8> {
    let missing = classify(f64::NAN).palette_index();
    let mut indices = vec![missing; width * height];
    if width == 0 {
        return indices;
    }

    indices
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            let start = row * width;
            let end = (start + width).min(data.len());
            if start >= end {
                return;
            }
            for (idx, &value) in out.iter_mut().zip(&data[start..end]) {
                *idx = classify(value as f64).palette_index();
            }
        });

    indices
}

/// Encode an NDVI grid as an indexed PNG using the NDVI colormap.
///
/// Missing samples are transparent via the palette's `tRNS` entry.
pub fn render_overlay_png(data: &[f32], width: usize, height: usize) -> Result<Vec<u8>, String> {
    if width == 0 || height == 0 {
        return Err(format!("cannot render an empty {}x{} grid", width, height));
    }
    let indices = render_indices(data, width, height);
    let png = create_png_indexed(width, height, &overlay_palette(), &indices)?;
    debug!(width, height, bytes = png.len(), "Encoded NDVI overlay");
    Ok(png)
}
