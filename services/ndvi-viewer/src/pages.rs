//! HTML pages: the layer index and the per-layer map view.
//!
//! The map is drawn client-side by Leaflet; the server only supplies the
//! pre-rendered overlay, its bounds and the display settings.

use renderer::legend;

use crate::state::{AppState, LoadedLayer};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const OSM_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

const PAGE_STYLE: &str = r#"
    body { font-family: sans-serif; margin: 2rem; color: #222; }
    h1 { font-size: 1.6rem; }
    h2 { font-size: 1.2rem; margin-top: 2rem; }
    .stats { color: #555; font-size: 0.9rem; }
    .axis-label { font-size: 0.85rem; color: #555; }
    .ndvi-legend {
        position: fixed; bottom: 50px; left: 50px; width: 180px;
        background-color: white; border: 2px solid grey; z-index: 9999;
        font-size: 14px; padding: 10px;
    }
    .ndvi-legend i {
        width: 18px; height: 18px; float: left; margin-right: 8px;
        border: 1px solid #ccc; box-sizing: border-box;
    }
    .ndvi-legend div { clear: both; line-height: 20px; }
"#;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
{head_extra}
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        style = PAGE_STYLE,
        head_extra = head_extra,
        body = body,
    )
}

/// Fixed-position legend box, one row per colormap bucket.
pub fn legend_html() -> String {
    let rows: String = legend()
        .iter()
        .map(|entry| {
            format!(
                r#"<div><i style="background:{};"></i>{}</div>"#,
                entry.color,
                escape_html(entry.label)
            )
        })
        .collect();
    format!(
        r#"<div class="ndvi-legend"><b>NDVI Legend</b>{}</div>"#,
        rows
    )
}

/// `GET /` body.
pub fn index_page(state: &AppState) -> String {
    let items: String = state
        .layers()
        .map(|layer| {
            let summary = layer.summary();
            format!(
                r#"<li><a href="{url}">{title}</a> <span class="stats">({w}&times;{h} px)</span></li>"#,
                url = summary.view_url,
                title = escape_html(&summary.title),
                w = summary.width,
                h = summary.height,
            )
        })
        .collect();

    let body = if items.is_empty() {
        "<h1>NDVI Viewer</h1>\n<p>No layers are loaded.</p>".to_string()
    } else {
        format!("<h1>NDVI Viewer</h1>\n<ul>{}</ul>", items)
    };

    page("NDVI Viewer", "", &body)
}

/// `GET /view/:layer` body: map with overlay and legend, then the histogram.
pub fn view_page(layer: &LoadedLayer) -> String {
    let summary = layer.summary();
    let display = &layer.config.display;
    let (center_lat, center_lon) = layer.bounds.center();
    let [[south, west], [north, east]] = layer.bounds.leaflet_bounds();

    let head = format!(
        r#"<link rel="stylesheet" href="{css}">
<script src="{js}"></script>"#,
        css = LEAFLET_CSS,
        js = LEAFLET_JS,
    );

    let stats = &layer.stats;
    let range = match (stats.min, stats.max) {
        (Some(min), Some(max)) => format!("min {:.3}, max {:.3}", min, max),
        _ => "no finite samples".to_string(),
    };

    let body = format!(
        r#"<h1>{title}</h1>
<h2>NDVI Map</h2>
<div id="map" style="width: {map_w}px; height: {map_h}px;"></div>
{legend}
<h2>NDVI Histogram</h2>
<img src="{histogram_url}" alt="NDVI histogram" width="640" height="400">
<p class="axis-label">x: NDVI ({hist_min:.3} to {hist_max:.3}), y: Pixel Count (peak {peak})</p>
<p class="stats">{finite} finite samples, {missing} missing; {range}</p>
<script>
  var map = L.map('map').setView([{center_lat}, {center_lon}], {zoom});
  L.tileLayer('{tiles}', {{ attribution: '{attribution}' }}).addTo(map);
  L.imageOverlay('{overlay_url}', [[{south}, {west}], [{north}, {east}]], {{ opacity: {opacity} }}).addTo(map);
</script>"#,
        title = escape_html(&summary.title),
        map_w = display.map_width,
        map_h = display.map_height,
        legend = legend_html(),
        histogram_url = summary.histogram_url,
        hist_min = layer.histogram.min,
        hist_max = layer.histogram.max,
        peak = layer.histogram.max_count(),
        finite = stats.finite_count,
        missing = stats.missing_count,
        range = range,
        center_lat = center_lat,
        center_lon = center_lon,
        zoom = display.zoom,
        tiles = OSM_TILES,
        attribution = OSM_ATTRIBUTION,
        overlay_url = summary.overlay_url,
        south = south,
        west = west,
        north = north,
        east = east,
        opacity = display.opacity,
    );

    page(&layer.config.layer.title, &head, &body)
}
