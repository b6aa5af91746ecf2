//! HTTP handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use bytes::Bytes;
use metrics_exporter_prometheus::PrometheusHandle;
use ndvi_common::{NdviError, Rgba};
use ndvi_raster::RasterStats;
use renderer::{classify, legend, Classification, Histogram, LegendEntry};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::metrics::record_request;
use crate::pages;
use crate::state::{AppState, LayerSummary, LoadedLayer};

// ============================================================================
// Errors
// ============================================================================

/// Error response body: `{ "error": "..." }` with the status from
/// [`NdviError::http_status_code`].
#[derive(Debug)]
pub struct ApiError(pub NdviError);

impl From<NdviError> for ApiError {
    fn from(err: NdviError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LayerDetail {
    #[serde(flatten)]
    pub summary: LayerSummary,
    pub center: Center,
    pub leaflet_bounds: [[f64; 2]; 2],
    pub opacity: f64,
    pub zoom: u8,
    pub map_width: u32,
    pub map_height: u32,
    pub stats: RasterStats,
    pub histogram_bins: usize,
    pub loaded_at: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramResponse {
    pub layer: String,
    #[serde(flatten)]
    pub histogram: Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColormapResponse {
    /// `null` for NaN.
    pub value: f64,
    /// `missing`, `bucket` or `out_of_range`.
    pub class: &'static str,
    pub bucket: Option<usize>,
    pub label: Option<&'static str>,
    /// Channels as fractions in `[0, 1]`.
    pub rgba: [f64; 4],
    pub hex: String,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ColormapQuery {
    pub value: Option<String>,
}

// ============================================================================
// Pages
// ============================================================================

/// GET / - Layer index
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    record_request("index");
    Html(pages::index_page(&state))
}

/// GET /view/:layer - Map page for one layer
#[instrument(skip(state))]
pub async fn view_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer): Path<String>,
) -> ApiResult<Html<String>> {
    record_request("view");
    let layer = state.layer(&layer)?;
    Ok(Html(pages::view_page(&layer)))
}

// ============================================================================
// Images
// ============================================================================

fn png_response(bytes: Bytes) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        bytes,
    )
        .into_response()
}

/// GET /layers/:layer/overlay.png - Colorized overlay
#[instrument(skip(state))]
pub async fn overlay_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer): Path<String>,
) -> ApiResult<Response> {
    record_request("overlay");
    let layer = state.layer(&layer)?;
    Ok(png_response(layer.overlay_png.clone()))
}

/// GET /layers/:layer/histogram.png - Histogram chart
#[instrument(skip(state))]
pub async fn histogram_png_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer): Path<String>,
) -> ApiResult<Response> {
    record_request("histogram_png");
    let layer = state.layer(&layer)?;
    Ok(png_response(layer.histogram_png.clone()))
}

// ============================================================================
// JSON API
// ============================================================================

/// GET /api/layers - All loaded layers
pub async fn layers_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<LayerSummary>> {
    record_request("api_layers");
    Json(state.layers().map(|layer| layer.summary()).collect())
}

pub fn layer_detail(layer: &LoadedLayer) -> LayerDetail {
    let (lat, lon) = layer.bounds.center();
    let display = &layer.config.display;
    LayerDetail {
        summary: layer.summary(),
        center: Center { lat, lon },
        leaflet_bounds: layer.bounds.leaflet_bounds(),
        opacity: display.opacity,
        zoom: display.zoom,
        map_width: display.map_width,
        map_height: display.map_height,
        stats: layer.stats,
        histogram_bins: layer.histogram.bins.len(),
        loaded_at: layer.loaded_at.to_rfc3339(),
    }
}

/// GET /api/layers/:layer - Layer detail
#[instrument(skip(state))]
pub async fn layer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer): Path<String>,
) -> ApiResult<Json<LayerDetail>> {
    record_request("api_layer");
    let layer = state.layer(&layer)?;
    Ok(Json(layer_detail(&layer)))
}

/// GET /api/layers/:layer/histogram - Histogram bins
#[instrument(skip(state))]
pub async fn histogram_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer): Path<String>,
) -> ApiResult<Json<HistogramResponse>> {
    record_request("api_histogram");
    let layer = state.layer(&layer)?;
    Ok(Json(HistogramResponse {
        layer: layer.id().to_string(),
        histogram: layer.histogram.clone(),
    }))
}

/// GET /api/legend - Colormap legend
pub async fn legend_handler() -> Json<Vec<LegendEntry>> {
    record_request("api_legend");
    Json(legend())
}

/// Parse a sample value; `nan` (any case) is the missing marker.
pub fn parse_sample(raw: &str) -> Result<f64, NdviError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| NdviError::InvalidParameter {
        param: "value".to_string(),
        message: format!("'{}' is not a number", raw),
    })
}

pub fn colormap_entry(value: f64) -> ColormapResponse {
    let class = classify(value);
    let color: Rgba = class.color();
    let (name, bucket) = match class {
        Classification::Missing => ("missing", None),
        Classification::Bucket(i) => ("bucket", Some(i)),
        Classification::OutOfRange => ("out_of_range", None),
    };
    ColormapResponse {
        value,
        class: name,
        bucket,
        label: bucket.map(|i| renderer::colormap::NDVI_LABELS[i]),
        rgba: [color.r, color.g, color.b, color.a],
        hex: color.to_hex(),
    }
}

/// GET /api/colormap?value=<f64|nan> - Color for one sample
pub async fn colormap_handler(Query(query): Query<ColormapQuery>) -> ApiResult<Json<ColormapResponse>> {
    record_request("api_colormap");
    let raw = query.value.ok_or_else(|| NdviError::InvalidParameter {
        param: "value".to_string(),
        message: "missing".to_string(),
    })?;
    let value = parse_sample(&raw)?;
    Ok(Json(colormap_entry(value)))
}

// ============================================================================
// Health & Metrics
// ============================================================================

/// GET /health - Liveness check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /ready - Ready once at least one layer is loaded
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
    }
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}
