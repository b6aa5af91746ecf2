//! Router construction.

use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the viewer router with all routes and middleware.
pub fn create_router(state: Arc<AppState>, prometheus_handle: PrometheusHandle) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::index_handler))
        .route("/view/:layer", get(handlers::view_handler))
        // Rendered images
        .route("/layers/:layer/overlay.png", get(handlers::overlay_handler))
        .route("/layers/:layer/histogram.png", get(handlers::histogram_png_handler))
        // JSON API
        .route("/api/layers", get(handlers::layers_handler))
        .route("/api/layers/:layer", get(handlers::layer_handler))
        .route("/api/layers/:layer/histogram", get(handlers::histogram_handler))
        .route("/api/legend", get(handlers::legend_handler))
        .route("/api/colormap", get(handlers::colormap_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        .layer(Extension(state))
        .layer(Extension(prometheus_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
