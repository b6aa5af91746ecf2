//! NDVI colormap.
//!
//! Ten colored buckets over `[-1.0, 1.0]`, matching the Earth Engine NDVI
//! palette. Buckets are half-open `[low, high)` and scanned in ascending
//! order, so the top edge `1.0` itself falls outside every bucket and gets the
//! opaque black fallback rather than the last bucket's color.

use ndvi_common::Rgba;
use serde::Serialize;

/// Number of colored buckets.
pub const NDVI_BUCKET_COUNT: usize = 10;

/// Bucket boundaries, strictly ascending.
pub const NDVI_BREAKS: [f64; NDVI_BUCKET_COUNT + 1] =
    [-1.0, 0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 1.0];

/// One color per bucket.
pub const NDVI_COLORS: [&str; NDVI_BUCKET_COUNT] = [
    "#FFFFFF", // no vegetation
    "#CE7E45",
    "#FCD163",
    "#99B718",
    "#66A000",
    "#207401",
    "#056201",
    "#004C00",
    "#023B01",
    "#012E01", // dense
];

pub const NDVI_LABELS: [&str; NDVI_BUCKET_COUNT] = [
    "No vegetation (≤ 0.0)",
    "0.0 – 0.1",
    "0.1 – 0.2",
    "0.2 – 0.3",
    "0.3 – 0.4",
    "0.4 – 0.5",
    "0.5 – 0.6",
    "0.6 – 0.7",
    "0.7 – 0.8",
    "0.8 – 1.0",
];

const NDVI_RGB: [[u8; 3]; NDVI_BUCKET_COUNT] = parse_hex_table(&NDVI_COLORS);

/// Palette index used for missing samples in indexed overlays.
pub const MISSING_INDEX: u8 = NDVI_BUCKET_COUNT as u8;
/// Palette index used for samples outside every bucket.
pub const FALLBACK_INDEX: u8 = NDVI_BUCKET_COUNT as u8 + 1;

/// Where a sample lands in the colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// NaN sample.
    Missing,
    /// Inside bucket `i`. An index past the table is treated as
    /// [`Classification::OutOfRange`].
    Bucket(usize),
    /// Below -1.0, at or above 1.0, or infinite.
    OutOfRange,
}

impl Classification {
    /// Index into [`overlay_palette`].
    pub fn palette_index(self) -> u8 {
        match self {
            Classification::Bucket(i) if i < NDVI_BUCKET_COUNT => i as u8,
            Classification::Missing => MISSING_INDEX,
            Classification::Bucket(_) | Classification::OutOfRange => FALLBACK_INDEX,
        }
    }

    pub fn color(self) -> Rgba {
        match self {
            Classification::Missing => Rgba::TRANSPARENT,
            Classification::Bucket(i) if i < NDVI_BUCKET_COUNT => bucket_color(i),
            Classification::Bucket(_) | Classification::OutOfRange => Rgba::BLACK,
        }
    }
}

/// Locate a sample in the breakpoint table.
pub fn classify(sample: f64) -> Classification {
    if sample.is_nan() {
        return Classification::Missing;
    }
    NDVI_BREAKS
        .windows(2)
        .position(|w| w[0] <= sample && sample < w[1])
        .map_or(Classification::OutOfRange, Classification::Bucket)
}

/// Map an NDVI sample to its display color.
///
/// NaN is fully transparent black; any sample outside `[-1.0, 1.0)` is opaque
/// black.
pub fn ndvi_color(sample: f64) -> Rgba {
    classify(sample).color()
}

/// Opaque color of bucket `i`. Panics if `i` is not a bucket index.
pub fn bucket_color(i: usize) -> Rgba {
    let [r, g, b] = NDVI_RGB[i];
    Rgba::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, 1.0)
}

/// Palette for indexed overlays: the ten buckets, then transparent
/// ([`MISSING_INDEX`]), then opaque black ([`FALLBACK_INDEX`]).
pub fn overlay_palette() -> Vec<(u8, u8, u8, u8)> {
    let mut palette: Vec<(u8, u8, u8, u8)> =
        NDVI_RGB.iter().map(|&[r, g, b]| (r, g, b, 255)).collect();
    palette.push((0, 0, 0, 0));
    palette.push((0, 0, 0, 255));
    palette
}

/// A legend row for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub color: &'static str,
}

/// Legend rows in bucket order.
pub fn legend() -> Vec<LegendEntry> {
    (0..NDVI_BUCKET_COUNT)
        .map(|i| LegendEntry {
            label: NDVI_LABELS[i],
            lower: NDVI_BREAKS[i],
            upper: NDVI_BREAKS[i + 1],
            color: NDVI_COLORS[i],
        })
        .collect()
}

const fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in colormap"),
    }
}

const fn parse_hex_table(colors: &[&str; NDVI_BUCKET_COUNT]) -> [[u8; 3]; NDVI_BUCKET_COUNT] {
    let mut out = [[0u8; 3]; NDVI_BUCKET_COUNT];
    let mut i = 0;
    while i < NDVI_BUCKET_COUNT {
        let b = colors[i].as_bytes();
        assert!(b.len() == 7 && b[0] == b'#', "colormap entries must be #RRGGBB");
        let mut ch = 0;
        while ch < 3 {
            out[i][ch] = hex_digit(b[1 + 2 * ch]) * 16 + hex_digit(b[2 + 2 * ch]);
            ch += 1;
        }
        i += 1;
    }
    out
}
