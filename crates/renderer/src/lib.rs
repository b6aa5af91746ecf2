//! Image rendering for NDVI rasters.
//!
//! - Fixed-breakpoint NDVI colormap
//! - Colorized overlay rasterization
//! - Equal-width histograms and bar charts
//! - PNG encoding (indexed and RGBA)

pub mod chart;
pub mod colormap;
pub mod histogram;
pub mod overlay;
pub mod png;

pub use colormap::{classify, legend, ndvi_color, Classification, LegendEntry};
pub use histogram::{compute_histogram, Histogram, HistogramBin};
