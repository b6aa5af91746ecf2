//! Layer configuration loading.
//!
//! Each YAML file in `config/layers/` describes one NDVI layer: which raster
//! to load, where it sits on the map and how it is displayed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndvi_common::{BoundingBox, NdviError, NdviResult, Rgba};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Raster used by the built-in layer when no configuration is present.
pub const DEFAULT_RASTER_PATH: &str = "data/CRC_NAIP_2011_NDVI.tif";

/// Extent of the built-in CRC NAIP 2011 scene.
pub const DEFAULT_BOUNDS: BoundingBox = BoundingBox {
    west: -109.870,
    south: 38.123,
    east: -109.855,
    north: 38.140,
};

/// Root configuration loaded from a layer YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    pub layer: LayerInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub histogram: HistogramConfig,
}

/// Layer identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerInfo {
    /// URL-safe identifier used in routes.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Where the raster comes from and where it is placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    /// Overrides the bounds embedded in the file.
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_map_width")]
    pub map_width: u32,
    #[serde(default = "default_map_height")]
    pub map_height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            opacity: default_opacity(),
            zoom: default_zoom(),
            map_width: default_map_width(),
            map_height: default_map_height(),
        }
    }
}

fn default_opacity() -> f64 {
    0.8
}

fn default_zoom() -> u8 {
    14
}

fn default_map_width() -> u32 {
    700
}

fn default_map_height() -> u32 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramConfig {
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// Hex string or CSS color name.
    #[serde(default = "default_bar_color")]
    pub bar_color: String,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: default_bins(),
            bar_color: default_bar_color(),
        }
    }
}

fn default_bins() -> usize {
    50
}

fn default_bar_color() -> String {
    "green".to_string()
}

/// Highest zoom level Leaflet's default tile layer serves.
const MAX_ZOOM: u8 = 19;

impl LayerConfig {
    /// Load a layer configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(layer = %config.layer.id, path = %path.display(), "Loaded layer config");
        Ok(config)
    }

    /// Parse and validate a layer configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: LayerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// The built-in CRC NAIP 2011 layer.
    pub fn builtin() -> Self {
        Self {
            layer: LayerInfo {
                id: "crc_naip_2011".to_string(),
                title: "CRC NAIP 2011 NDVI Viewer (True NDVI Scale)".to_string(),
                description: String::new(),
                enabled: true,
            },
            source: SourceConfig {
                path: PathBuf::from(DEFAULT_RASTER_PATH),
                bounds: Some(DEFAULT_BOUNDS),
            },
            display: DisplayConfig::default(),
            histogram: HistogramConfig::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.layer.id
    }

    /// Parsed histogram bar color. Only valid after [`validate`](Self::validate).
    pub fn bar_color(&self) -> Rgba {
        Rgba::parse(&self.histogram.bar_color).unwrap_or(Rgba::BLACK)
    }

    pub fn validate(&self) -> NdviResult<()> {
        let id = &self.layer.id;
        if id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(NdviError::Config(format!(
                "layer id '{}' must be non-empty and contain only [A-Za-z0-9_-]",
                id
            )));
        }

        let display = &self.display;
        if !(0.0..=1.0).contains(&display.opacity) {
            return Err(NdviError::Config(format!(
                "{}: opacity {} outside [0, 1]",
                id, display.opacity
            )));
        }
        if display.zoom > MAX_ZOOM {
            return Err(NdviError::Config(format!(
                "{}: zoom {} above {}",
                id, display.zoom, MAX_ZOOM
            )));
        }
        if display.map_width == 0 || display.map_height == 0 {
            return Err(NdviError::Config(format!("{}: map size must be non-zero", id)));
        }

        if self.histogram.bins == 0 {
            return Err(NdviError::Config(format!("{}: histogram bins must be at least 1", id)));
        }
        if Rgba::parse(&self.histogram.bar_color).is_none() {
            return Err(NdviError::Config(format!(
                "{}: unknown bar color '{}'",
                id, self.histogram.bar_color
            )));
        }

        if let Some(bounds) = &self.source.bounds {
            bounds
                .validate()
                .map_err(|e| NdviError::Config(format!("{}: bounds: {}", id, e)))?;
        }

        Ok(())
    }
}

/// Load all enabled layer configurations from `<config_dir>/layers`.
///
/// Files that fail to parse are logged and skipped. The result is sorted by
/// layer id; duplicate ids keep the first file in that order.
pub fn load_layer_configs(config_dir: &Path) -> Result<Vec<LayerConfig>> {
    let layers_dir = config_dir.join("layers");

    if !layers_dir.exists() {
        warn!(path = %layers_dir.display(), "Layers config directory not found");
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(&layers_dir)
        .with_context(|| format!("Failed to list {}", layers_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml"))
        .collect();
    paths.sort();

    let mut configs: Vec<LayerConfig> = Vec::new();

    for path in paths {
        match LayerConfig::load(&path) {
            Ok(config) => {
                if !config.layer.enabled {
                    debug!(layer = %config.layer.id, "Skipping disabled layer");
                } else if configs.iter().any(|c| c.layer.id == config.layer.id) {
                    warn!(layer = %config.layer.id, path = %path.display(), "Duplicate layer id, ignoring");
                } else {
                    info!(
                        layer = %config.layer.id,
                        title = %config.layer.title,
                        "Loaded layer configuration"
                    );
                    configs.push(config);
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load layer config");
            }
        }
    }

    configs.sort_by(|a, b| a.layer.id.cmp(&b.layer.id));
    info!(count = configs.len(), "Loaded layer configurations");
    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let yaml = r#"
layer:
  id: field_a
  title: "Field A"
source:
  path: data/field_a.tif
"#;
        let config = LayerConfig::from_yaml(yaml).unwrap();
        assert!(config.layer.enabled);
        assert_eq!(config.display.opacity, 0.8);
        assert_eq!(config.display.zoom, 14);
        assert_eq!(config.display.map_width, 700);
        assert_eq!(config.display.map_height, 500);
        assert_eq!(config.histogram.bins, 50);
        assert_eq!(config.histogram.bar_color, "green");
        assert!(config.source.bounds.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r##"
layer:
  id: crc
  title: "CRC"
  enabled: false
source:
  path: /srv/crc.tif
  bounds: { west: -109.870, south: 38.123, east: -109.855, north: 38.140 }
display:
  opacity: 0.5
  zoom: 12
histogram:
  bins: 20
  bar_color: "#336699"
"##;
        let config = LayerConfig::from_yaml(yaml).unwrap();
        assert!(!config.layer.enabled);
        assert_eq!(config.source.bounds, Some(DEFAULT_BOUNDS));
        assert_eq!(config.display.opacity, 0.5);
        assert_eq!(config.display.map_width, 700);
        assert_eq!(config.bar_color().to_hex(), "#336699");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = |extra: &str| {
            format!(
                "layer: {{ id: x, title: X }}\nsource: {{ path: a.tif }}\n{}",
                extra
            )
        };
        assert!(LayerConfig::from_yaml(&base("display: { opacity: 1.5 }")).is_err());
        assert!(LayerConfig::from_yaml(&base("display: { zoom: 30 }")).is_err());
        assert!(LayerConfig::from_yaml(&base("histogram: { bins: 0 }")).is_err());
        assert!(LayerConfig::from_yaml(&base("histogram: { bar_color: mauve-ish }")).is_err());
        assert!(LayerConfig::from_yaml(&base("histogram: { bar_color: '+f+f+f' }")).is_err());
        assert!(LayerConfig::from_yaml("layer: { id: 'a b', title: X }\nsource: { path: a.tif }").is_err());
    }

    #[test]
    fn test_builtin_is_valid() {
        let config = LayerConfig::builtin();
        config.validate().unwrap();
        assert_eq!(config.source.path, PathBuf::from(DEFAULT_RASTER_PATH));
        assert_eq!(config.bar_color(), Rgba::new(0.0, 128.0 / 255.0, 0.0, 1.0));
    }
}
