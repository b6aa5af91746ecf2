//! Histogram bar charts.

use image::{Rgba as Pixel, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use ndvi_common::Rgba;
use tracing::debug;

use crate::histogram::Histogram;
use crate::png::create_png_auto;

const MARGIN_LEFT: u32 = 48;
const MARGIN_RIGHT: u32 = 16;
const MARGIN_TOP: u32 = 16;
const MARGIN_BOTTOM: u32 = 32;
const TICK_LEN: f32 = 4.0;

const BACKGROUND: Pixel<u8> = Pixel([255, 255, 255, 255]);
const AXIS: Pixel<u8> = Pixel([0, 0, 0, 255]);
const GRID: Pixel<u8> = Pixel([220, 220, 220, 255]);

#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub bar_color: Rgba,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            bar_color: Rgba::new(0.0, 128.0 / 255.0, 0.0, 1.0),
        }
    }
}

/// Draw the histogram as bars on a white canvas with x and y axes.
///
/// Bar heights are scaled to the tallest bin. An empty histogram yields just
/// the axes.
pub fn draw_histogram(hist: &Histogram, options: &ChartOptions) -> Result<RgbaImage, String> {
    let min_w = MARGIN_LEFT + MARGIN_RIGHT + 1;
    let min_h = MARGIN_TOP + MARGIN_BOTTOM + 1;
    if options.width < min_w || options.height < min_h {
        return Err(format!(
            "chart size {}x{} is smaller than the minimum {}x{}",
            options.width, options.height, min_w, min_h
        ));
    }

    let mut img = RgbaImage::from_pixel(options.width, options.height, BACKGROUND);

    let plot_left = MARGIN_LEFT as f32;
    let plot_right = (options.width - MARGIN_RIGHT) as f32;
    let plot_top = MARGIN_TOP as f32;
    let plot_bottom = (options.height - MARGIN_BOTTOM) as f32;
    let plot_w = plot_right - plot_left;
    let plot_h = plot_bottom - plot_top;

    for frac in [0.25f32, 0.5, 0.75, 1.0] {
        let y = plot_bottom - plot_h * frac;
        draw_line_segment_mut(&mut img, (plot_left, y), (plot_right, y), GRID);
    }

    let max_count = hist.max_count();
    if max_count == 0 {
        debug!(excluded = hist.excluded, "Histogram has no finite samples, drawing axes only");
    } else {
        let [r, g, b, a] = options.bar_color.to_rgba8();
        let bar = Pixel([r, g, b, a]);
        let n = hist.bins.len() as f32;
        let slot = plot_w / n;
        // Leave a 1px gap between bars when there is room for it.
        let gap = if slot >= 3.0 { 1.0 } else { 0.0 };

        for (i, bin) in hist.bins.iter().enumerate() {
            let bar_h = (bin.count as f32 / max_count as f32 * plot_h).round() as u32;
            let x0 = (plot_left + i as f32 * slot).round() as i32;
            let x1 = (plot_left + (i + 1) as f32 * slot - gap).round() as i32;
            let bar_w = (x1 - x0).max(1) as u32;
            if bar_h == 0 {
                continue;
            }
            let rect = Rect::at(x0, plot_bottom as i32 - bar_h as i32).of_size(bar_w, bar_h);
            draw_filled_rect_mut(&mut img, rect, bar);
        }
    }

    draw_line_segment_mut(&mut img, (plot_left, plot_bottom), (plot_right, plot_bottom), AXIS);
    draw_line_segment_mut(&mut img, (plot_left, plot_top), (plot_left, plot_bottom), AXIS);

    for i in 0..=4 {
        let x = plot_left + plot_w * i as f32 / 4.0;
        draw_line_segment_mut(&mut img, (x, plot_bottom), (x, plot_bottom + TICK_LEN), AXIS);
    }

    Ok(img)
}

/// Render the histogram chart straight to PNG bytes.
pub fn render_histogram_chart(hist: &Histogram, options: &ChartOptions) -> Result<Vec<u8>, String> {
    let img = draw_histogram(hist, options)?;
    let (width, height) = img.dimensions();
    create_png_auto(img.as_raw(), width as usize, height as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::compute_histogram;

    #[test]
    fn test_tallest_bar_reaches_top() {
        let hist = compute_histogram(&[0.1, 0.1, 0.1, 0.9], 2);
        let opts = ChartOptions::default();
        let img = draw_histogram(&hist, &opts).unwrap();

        let x = MARGIN_LEFT + 10;
        let y = MARGIN_TOP + 1;
        assert_eq!(img.get_pixel(x, y), &Pixel([0, 128, 0, 255]));
    }

    #[test]
    fn test_too_small_rejected() {
        let hist = compute_histogram(&[0.5], 1);
        let opts = ChartOptions {
            width: 10,
            height: 10,
            ..ChartOptions::default()
        };
        assert!(draw_histogram(&hist, &opts).is_err());
    }
}
