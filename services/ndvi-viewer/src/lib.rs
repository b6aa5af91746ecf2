//! NDVI viewer service library.
//!
//! This module exposes the internal modules for testing purposes.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod pages;
pub mod render;
pub mod server;
pub mod state;
