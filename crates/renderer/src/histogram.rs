//! Equal-width histograms of NDVI samples.

use serde::Serialize;

/// One histogram bin covering `[start, end)`; the last bin also holds `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    /// Lower edge of the first bin.
    pub min: f64,
    /// Upper edge of the last bin.
    pub max: f64,
    /// Samples counted into some bin.
    pub finite_count: u64,
    /// NaN and infinite samples left out.
    pub excluded: u64,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.finite_count == 0
    }

    /// Largest bin count, 0 for an empty histogram.
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn bin_width(&self) -> f64 {
        if self.bins.is_empty() {
            0.0
        } else {
            (self.max - self.min) / self.bins.len() as f64
        }
    }
}

/// Bin the finite samples of `values` into `bins` equal-width bins spanning
/// their range.
///
/// A constant grid is widened to `[v - 0.5, v + 0.5]`. With no finite samples
/// the histogram has no bins. `bins` is clamped to at least 1.
pub fn compute_histogram(values: &[f32], bins: usize) -> Histogram {
    let bins = bins.max(1);

    let mut excluded = 0u64;
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            let v = v as f64;
            lo = lo.min(v);
            hi = hi.max(v);
        } else {
            excluded += 1;
        }
    }

    if lo > hi {
        return Histogram {
            bins: Vec::new(),
            min: 0.0,
            max: 0.0,
            finite_count: 0,
            excluded,
        };
    }

    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0u64; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        let offset = (v as f64 - lo) / width;
        let idx = (offset.floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let finite_count = counts.iter().sum();
    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + i as f64 * width,
            end: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
            count,
        })
        .collect();

    Histogram {
        bins,
        min: lo,
        max: hi,
        finite_count,
        excluded,
    }
}
