//! Offline rendering of layer artifacts to a directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::legend;
use tracing::info;

use crate::handlers::layer_detail;
use crate::state::{AppState, LoadedLayer};

pub const OVERLAY_FILE: &str = "overlay.png";
pub const HISTOGRAM_PNG_FILE: &str = "histogram.png";
pub const HISTOGRAM_JSON_FILE: &str = "histogram.json";
pub const LEGEND_FILE: &str = "legend.json";
pub const LAYER_FILE: &str = "layer.json";

/// Write one layer's artifacts into `<out_dir>/<layer id>/`.
pub fn write_layer(layer: &LoadedLayer, out_dir: &Path) -> Result<PathBuf> {
    let dir = out_dir.join(layer.id());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let write = |name: &str, bytes: &[u8]| -> Result<()> {
        let path = dir.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))
    };

    write(OVERLAY_FILE, &layer.overlay_png)?;
    write(HISTOGRAM_PNG_FILE, &layer.histogram_png)?;
    write(
        HISTOGRAM_JSON_FILE,
        &serde_json::to_vec_pretty(&layer.histogram)?,
    )?;
    write(LEGEND_FILE, &serde_json::to_vec_pretty(&legend())?)?;
    write(LAYER_FILE, &serde_json::to_vec_pretty(&layer_detail(layer))?)?;

    info!(layer = %layer.id(), path = %dir.display(), "Wrote layer artifacts");
    Ok(dir)
}

/// Write every loaded layer. Returns the directories written.
pub fn write_all(state: &AppState, out_dir: &Path) -> Result<Vec<PathBuf>> {
    state
        .layers()
        .map(|layer| write_layer(layer, out_dir))
        .collect()
}
