//! Application state: every configured layer, decoded and pre-rendered.
//!
//! Layers are immutable once loaded, so handlers share them through `Arc`
//! without locking.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use ndvi_common::{BoundingBox, NdviError, NdviResult};
use ndvi_raster::{read_ndvi_tiff, NdviRaster, RasterStats};
use renderer::chart::{render_histogram_chart, ChartOptions};
use renderer::overlay::render_overlay_png;
use renderer::{compute_histogram, Histogram};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::LayerConfig;
use crate::metrics;

/// One layer with its rendered artifacts.
#[derive(Debug)]
pub struct LoadedLayer {
    pub config: LayerConfig,
    pub bounds: BoundingBox,
    pub width: usize,
    pub height: usize,
    pub stats: RasterStats,
    pub histogram: Histogram,
    pub overlay_png: Bytes,
    pub histogram_png: Bytes,
    pub loaded_at: DateTime<Utc>,
}

/// Compact description used by the layer list.
#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub bounds: BoundingBox,
    pub width: usize,
    pub height: usize,
    pub overlay_url: String,
    pub histogram_url: String,
    pub view_url: String,
}

impl LoadedLayer {
    /// Read the configured raster and render it. Blocking.
    pub fn load(config: LayerConfig) -> NdviResult<Self> {
        let raster = read_ndvi_tiff(&config.source.path)?;
        Self::from_raster(config, raster)
    }

    /// Render an already decoded raster. Blocking.
    ///
    /// Configured bounds take precedence over the bounds embedded in the file.
    pub fn from_raster(config: LayerConfig, raster: NdviRaster) -> NdviResult<Self> {
        let start = Instant::now();
        let id = config.id().to_string();

        let bounds = config
            .source
            .bounds
            .or(raster.bounds())
            .ok_or_else(|| {
                NdviError::Config(format!(
                    "{}: no bounds configured and {} has no georeferencing",
                    id,
                    config.source.path.display()
                ))
            })?;
        bounds.validate()?;

        let (width, height) = (raster.width(), raster.height());
        let overlay_png = render_overlay_png(raster.data(), width, height)
            .map_err(NdviError::RenderError)?;

        let histogram = compute_histogram(raster.data(), config.histogram.bins);
        let chart_options = ChartOptions {
            bar_color: config.bar_color(),
            ..ChartOptions::default()
        };
        let histogram_png =
            render_histogram_chart(&histogram, &chart_options).map_err(NdviError::RenderError)?;

        let stats = raster.stats();
        let elapsed = start.elapsed();
        metrics::record_render(&id, elapsed);
        info!(
            layer = %id,
            width,
            height,
            finite = stats.finite_count,
            missing = stats.missing_count,
            overlay_bytes = overlay_png.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Rendered layer"
        );

        Ok(Self {
            config,
            bounds,
            width,
            height,
            stats,
            histogram,
            overlay_png: Bytes::from(overlay_png),
            histogram_png: Bytes::from(histogram_png),
            loaded_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &str {
        self.config.id()
    }

    pub fn summary(&self) -> LayerSummary {
        let id = self.id();
        LayerSummary {
            id: id.to_string(),
            title: self.config.layer.title.clone(),
            description: self.config.layer.description.clone(),
            bounds: self.bounds,
            width: self.width,
            height: self.height,
            overlay_url: format!("/layers/{}/overlay.png", id),
            histogram_url: format!("/layers/{}/histogram.png", id),
            view_url: format!("/view/{}", id),
        }
    }
}

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    layers: BTreeMap<String, Arc<LoadedLayer>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Load every layer on the blocking pool.
    ///
    /// A layer that fails to load is logged and left out; the rest still
    /// come up.
    pub async fn load(configs: Vec<LayerConfig>) -> Self {
        let tasks: Vec<_> = configs
            .into_iter()
            .map(|config| {
                let id = config.id().to_string();
                (id, tokio::task::spawn_blocking(move || LoadedLayer::load(config)))
            })
            .collect();

        let mut layers = Vec::with_capacity(tasks.len());
        for (id, task) in tasks {
            match task.await {
                Ok(Ok(layer)) => layers.push(layer),
                Ok(Err(e)) => {
                    warn!(layer = %id, error = %e, "Failed to load layer, skipping");
                    metrics::record_layer_failure(&id);
                }
                Err(e) => {
                    warn!(layer = %id, error = %e, "Layer loading task panicked, skipping");
                    metrics::record_layer_failure(&id);
                }
            }
        }

        Self::from_layers(layers)
    }

    pub fn from_layers(layers: Vec<LoadedLayer>) -> Self {
        let layers: BTreeMap<_, _> = layers
            .into_iter()
            .map(|layer| (layer.id().to_string(), Arc::new(layer)))
            .collect();
        metrics::set_layers_loaded(layers.len());
        info!(count = layers.len(), "Layers ready");

        Self {
            layers,
            started_at: Utc::now(),
        }
    }

    pub fn layer(&self, id: &str) -> NdviResult<Arc<LoadedLayer>> {
        self.layers
            .get(id)
            .cloned()
            .ok_or_else(|| NdviError::LayerNotFound(id.to_string()))
    }

    /// Layers in id order.
    pub fn layers(&self) -> impl Iterator<Item = &Arc<LoadedLayer>> {
        self.layers.values()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Ready once at least one layer is servable.
    pub fn is_ready(&self) -> bool {
        !self.layers.is_empty()
    }
}
