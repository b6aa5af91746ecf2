//! Common types shared across the NDVI viewer crates.

pub mod bbox;
pub mod color;
pub mod error;

pub use bbox::{BboxParseError, BoundingBox};
pub use color::{hex_to_rgba, Rgba};
pub use error::{NdviError, NdviResult};
