//! Prometheus metrics for the viewer.
//!
//! Recorded through the `metrics` facade; the binary installs the Prometheus
//! recorder and `/metrics` renders it.

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Count one request against a route family.
pub fn record_request(endpoint: &'static str) {
    counter!("ndvi_requests_total", "endpoint" => endpoint).increment(1);
}

/// Time spent decoding and pre-rendering one layer.
pub fn record_render(layer: &str, elapsed: Duration) {
    histogram!("ndvi_render_seconds", "layer" => layer.to_string()).record(elapsed.as_secs_f64());
}

pub fn set_layers_loaded(count: usize) {
    gauge!("ndvi_layers_loaded").set(count as f64);
}

pub fn record_layer_failure(layer: &str) {
    counter!("ndvi_layer_load_failures_total", "layer" => layer.to_string()).increment(1);
}
