//! HTTP tests for the viewer router.
//!
//! Each test builds layers from synthetic GeoTIFFs and drives the router with
//! `tower::ServiceExt::oneshot`; no socket is bound.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use ndvi_viewer::config::LayerConfig;
use ndvi_viewer::server::create_router;
use ndvi_viewer::state::AppState;
use tempfile::TempDir;
use test_utils::{
    bbox, create_field_grid, temp_test_dir, with_missing, write_test_geotiff, GeoTiffFixture,
};
use tower::ServiceExt;

// ============================================================================
// Helpers
// ============================================================================

const WIDTH: u32 = 48;
const HEIGHT: u32 = 32;

fn layer_yaml(id: &str, path: &Path, bounds: bool) -> String {
    let bounds = if bounds {
        "  bounds: { west: -109.870, south: 38.123, east: -109.855, north: 38.140 }\n"
    } else {
        ""
    };
    format!(
        "layer:\n  id: {id}\n  title: \"Test <{id}>\"\nsource:\n  path: {path}\n{bounds}",
        id = id,
        path = path.display(),
        bounds = bounds,
    )
}

fn write_fixture(dir: &TempDir, name: &str, fixture: GeoTiffFixture) -> PathBuf {
    let path = dir.path().join(name);
    let data = with_missing(create_field_grid(WIDTH as usize, HEIGHT as usize), 11);
    write_test_geotiff(&path, WIDTH, HEIGHT, &data, fixture).unwrap();
    path
}

/// Router with one configured-bounds layer (`crc`) and one layer that takes
/// its bounds from the file (`tagged`).
async fn test_app() -> (Router, TempDir) {
    let dir = temp_test_dir();
    let crc = write_fixture(&dir, "crc.tif", GeoTiffFixture::default());
    let tagged = write_fixture(
        &dir,
        "tagged.tif",
        GeoTiffFixture {
            bounds: Some(bbox::UNIT_SQUARE),
            nodata: None,
        },
    );

    let configs = vec![
        LayerConfig::from_yaml(&layer_yaml("crc", &crc, true)).unwrap(),
        LayerConfig::from_yaml(&layer_yaml("tagged", &tagged, false)).unwrap(),
    ];
    let state = Arc::new(AppState::load(configs).await);
    let handle = PrometheusBuilder::new().build_recorder().handle();
    (create_router(state, handle), dir)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_index_lists_layers() {
    let (app, _dir) = test_app().await;
    let (status, content_type, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("/view/crc"));
    assert!(html.contains("/view/tagged"));
    // Titles are escaped.
    assert!(html.contains("Test &lt;crc&gt;"));
}

#[tokio::test]
async fn test_view_page() {
    let (app, _dir) = test_app().await;
    let (status, _, body) = get(&app, "/view/crc").await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("L.imageOverlay('/layers/crc/overlay.png', [[38.123, -109.87], [38.14, -109.855]], { opacity: 0.8 })"));
    assert!(html.contains("L.map('map').setView([38.13"));
    assert!(html.contains("], 14);"));
    assert!(html.contains("width: 700px; height: 500px;"));
    assert!(html.contains("NDVI Legend"));
    assert!(html.contains("/layers/crc/histogram.png"));
}

#[tokio::test]
async fn test_view_unknown_layer() {
    let (app, _dir) = test_app().await;
    let (status, json) = get_json(&app, "/view/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nope"));
}

// ============================================================================
// Images
// ============================================================================

#[tokio::test]
async fn test_overlay_png() {
    let (app, _dir) = test_app().await;
    let (status, content_type, body) = get(&app, "/layers/crc/overlay.png").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(&body[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);

    let img = image::load_from_memory(&body).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
    // Every 11th sample is missing, starting with the first.
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
}

#[tokio::test]
async fn test_histogram_png() {
    let (app, _dir) = test_app().await;
    let (status, content_type, body) = get(&app, "/layers/tagged/histogram.png").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    let img = image::load_from_memory(&body).unwrap();
    assert_eq!((img.width(), img.height()), (640, 400));
}

#[tokio::test]
async fn test_overlay_unknown_layer() {
    let (app, _dir) = test_app().await;
    let (status, _, _) = get(&app, "/layers/nope/overlay.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn test_api_layers() {
    let (app, _dir) = test_app().await;
    let (status, json) = get_json(&app, "/api/layers").await;
    assert_eq!(status, StatusCode::OK);

    let layers = json.as_array().unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0]["id"], "crc");
    assert_eq!(layers[1]["id"], "tagged");
    assert_eq!(layers[0]["overlay_url"], "/layers/crc/overlay.png");
}

#[tokio::test]
async fn test_api_layer_bounds_from_tags() {
    let (app, _dir) = test_app().await;
    let (status, json) = get_json(&app, "/api/layers/tagged").await;
    assert_eq!(status, StatusCode::OK);

    let (west, south, east, north) = bbox::UNIT_SQUARE;
    let bounds = &json["bounds"];
    assert!((bounds["west"].as_f64().unwrap() - west).abs() < 1e-9);
    assert!((bounds["south"].as_f64().unwrap() - south).abs() < 1e-9);
    assert!((bounds["east"].as_f64().unwrap() - east).abs() < 1e-9);
    assert!((bounds["north"].as_f64().unwrap() - north).abs() < 1e-9);
    assert_eq!(json["width"], WIDTH);
    assert_eq!(json["height"], HEIGHT);
    assert_eq!(json["histogram_bins"], 50);
}

#[tokio::test]
async fn test_api_layer_configured_bounds() {
    let (app, _dir) = test_app().await;
    let (_, json) = get_json(&app, "/api/layers/crc").await;
    assert_eq!(json["leaflet_bounds"][0][0], 38.123);
    assert_eq!(json["leaflet_bounds"][1][1], -109.855);
    assert!((json["center"]["lat"].as_f64().unwrap() - 38.1315).abs() < 1e-9);
    assert!((json["center"]["lon"].as_f64().unwrap() - (-109.8625)).abs() < 1e-9);
    assert_eq!(json["opacity"], 0.8);
    assert_eq!(json["zoom"], 14);
}

#[tokio::test]
async fn test_api_histogram() {
    let (app, _dir) = test_app().await;
    let (status, json) = get_json(&app, "/api/layers/crc/histogram").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["layer"], "crc");

    let bins = json["bins"].as_array().unwrap();
    assert_eq!(bins.len(), 50);
    let total: u64 = bins.iter().map(|b| b["count"].as_u64().unwrap()).sum();
    assert_eq!(json["finite_count"].as_u64().unwrap(), total);
    assert!(json["excluded"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_api_legend() {
    let (app, _dir) = test_app().await;
    let (status, json) = get_json(&app, "/api/legend").await;
    assert_eq!(status, StatusCode::OK);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0]["color"], "#FFFFFF");
    assert_eq!(entries[9]["color"], "#012E01");
}

#[tokio::test]
async fn test_api_colormap() {
    let (app, _dir) = test_app().await;

    let (status, json) = get_json(&app, "/api/colormap?value=0.75").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hex"], "#023B01");
    assert_eq!(json["bucket"], 8);

    let (_, json) = get_json(&app, "/api/colormap?value=1.0").await;
    assert_eq!(json["class"], "out_of_range");
    assert_eq!(json["rgba"], serde_json::json!([0.0, 0.0, 0.0, 1.0]));

    let (_, json) = get_json(&app, "/api/colormap?value=nan").await;
    assert_eq!(json["class"], "missing");
    assert!(json["value"].is_null());
    assert_eq!(json["rgba"][3], 0.0);
}

#[tokio::test]
async fn test_api_colormap_bad_query() {
    let (app, _dir) = test_app().await;
    let (status, json) = get_json(&app, "/api/colormap?value=leafy").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("leafy"));

    let (status, _) = get_json(&app, "/api/colormap").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let (app, _dir) = test_app().await;
    let (status, _, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_not_ready_without_layers() {
    let state = Arc::new(AppState::load(Vec::new()).await);
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = create_router(state, handle);
    let (status, _, _) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _dir) = test_app().await;
    let (status, content_type, _) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
}
