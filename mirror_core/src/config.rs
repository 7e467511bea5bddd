//! Display configuration for the mirror view: color palettes per view mode,
//! per-sector colors and the hexagon geometry.
//!
//! Loaded from `display_config.json` with support for environment variable overrides.

use std::{
    collections::BTreeMap,
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use segment_schema::Sector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BUILTIN_DISPLAY_CONFIG: &str = include_str!("data/display_config.json");

/// Environment variable naming a display config file to load instead of the builtin one.
pub const DISPLAY_CONFIG_ENV: &str = "MIRROR_DISPLAY_CONFIG_PATH";

/// Root display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub geometry: GeometryConfig,
    pub sector_colors: SectorColorConfig,
    pub undefined_color: String,
    pub background_color: String,
    pub palettes: PaletteConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            sector_colors: SectorColorConfig::default(),
            undefined_color: "#7f7f7f".to_string(),
            background_color: "#383b3e".to_string(),
            palettes: PaletteConfig::default(),
        }
    }
}

impl DisplayConfig {
    pub fn builtin() -> Arc<Self> {
        let config = Self::from_json_str(BUILTIN_DISPLAY_CONFIG).unwrap_or_else(|err| {
            tracing::warn!(
                target: "segment_map::config",
                error = %err,
                "display_config.builtin_invalid"
            );
            Self::default()
        });
        Arc::new(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, DisplayConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| DisplayConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = DisplayConfig::from_json_str(&contents)?;
        Ok(config)
    }

    /// Sector color for an occupied or empty position, if configured.
    pub fn sector_color(&self, sector: Sector, occupied: bool) -> Option<&str> {
        let colors = if occupied {
            &self.sector_colors.occupied
        } else {
            &self.sector_colors.empty
        };
        colors.get(&sector.to_string()).map(String::as_str)
    }
}

/// Hexagon size and canvas placement, in SVG user units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub segment_radius: f64,
    pub x_origin: f64,
    pub y_origin: f64,
    pub diameter: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            segment_radius: 10.0,
            x_origin: 215.0,
            y_origin: 215.0,
            diameter: 430.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorColorConfig {
    pub occupied: BTreeMap<String, String>,
    pub empty: BTreeMap<String, String>,
}

impl Default for SectorColorConfig {
    fn default() -> Self {
        Self {
            occupied: sector_map(&[
                ("A", "#4e9fd6"),
                ("B", "#e4b04a"),
                ("C", "#63b663"),
                ("D", "#d96b6b"),
                ("E", "#a98bd1"),
                ("F", "#5fc1b7"),
                ("G", "#b0b0b0"),
            ]),
            empty: sector_map(&[
                ("A", "#c3def2"),
                ("B", "#f5e2b8"),
                ("C", "#c8e8c8"),
                ("D", "#f1c7c7"),
                ("E", "#e0d5ef"),
                ("F", "#c6ebe7"),
                ("G", "#e3e3e3"),
            ]),
        }
    }
}

fn sector_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(sector, color)| (sector.to_string(), color.to_string()))
        .collect()
}

/// One legend entry: a category value and its color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub value: String,
    pub color: String,
}

/// Ordered category palette. Legend rows follow this order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    pub fn color_for(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.color.as_str())
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn palette(entries: &[(&str, &str)]) -> Palette {
    Palette::new(
        entries
            .iter()
            .map(|(value, color)| PaletteEntry {
                value: value.to_string(),
                color: color.to_string(),
            })
            .collect(),
    )
}

/// Palettes for the categorical view modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub segment_allocation: Palette,
    pub item_location: Palette,
    pub risk_of_loss: Palette,
    pub components: Palette,
    pub status: Palette,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            segment_allocation: palette(&[
                ("Japan", "#e6194b"),
                ("US", "#3cb44b"),
                ("China", "#ffe119"),
                ("India", "#4363d8"),
                ("Canada", "#911eb4"),
                ("TMT", "#f58231"),
            ]),
            item_location: palette(&[
                ("Blank Vendor", "#46f0f0"),
                ("Canon", "#f032e6"),
                ("Coherent", "#bcf60c"),
                ("In Transit", "#fabebe"),
                ("TMT Storage", "#008080"),
                ("Observatory", "#e6beff"),
            ]),
            risk_of_loss: palette(&[
                ("Canon", "#9a6324"),
                ("Coherent", "#fffac8"),
                ("Japan", "#800000"),
                ("US", "#aaffc3"),
                ("India", "#808000"),
                ("TMT", "#ffd8b1"),
            ]),
            components: palette(&[
                ("Blank", "#000075"),
                ("Roundel", "#a9a9a9"),
                ("Polished Roundel", "#ffe119"),
                ("Segment Assembly", "#3cb44b"),
                ("Support Assembly", "#4363d8"),
                ("Integrated Segment", "#f58231"),
            ]),
            status: palette(&[
                ("Planned", "#d3d3d3"),
                ("In Work", "#ffe119"),
                ("Complete", "#bcf60c"),
                ("Accepted", "#3cb44b"),
                ("Shipped", "#46f0f0"),
                ("Installed", "#4363d8"),
                ("Damaged", "#e6194b"),
            ]),
        }
    }
}

#[derive(Debug, Error)]
pub enum DisplayConfigError {
    #[error("failed to parse display config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read display config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Metadata about the display configuration source.
#[derive(Debug, Clone, Default)]
pub struct DisplayConfigMetadata {
    path: Option<PathBuf>,
}

impl DisplayConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// File the config was read from; `None` for the builtin config.
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load display configuration from an explicit path, the environment, or the
/// builtin defaults, in that order.
pub fn load_display_config(
    explicit: Option<&Path>,
) -> (Arc<DisplayConfig>, DisplayConfigMetadata) {
    let override_path = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var(DISPLAY_CONFIG_ENV).ok().map(PathBuf::from));

    if let Some(path) = override_path {
        match DisplayConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "segment_map::config",
                    path = %path.display(),
                    "display_config.loaded=file"
                );
                return (Arc::new(config), DisplayConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "segment_map::config",
                    path = %path.display(),
                    error = %err,
                    "display_config.load_failed"
                );
            }
        }
    }

    let config = DisplayConfig::builtin();
    tracing::info!(
        target: "segment_map::config",
        "display_config.loaded=builtin"
    );
    (config, DisplayConfigMetadata::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_matches_default() {
        let builtin = DisplayConfig::builtin();
        assert_eq!(*builtin, DisplayConfig::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = DisplayConfig::from_json_str(r#"{"geometry":{"segment_radius":12.0}}"#)
            .expect("partial config parses");
        assert_eq!(config.geometry.segment_radius, 12.0);
        assert_eq!(config.geometry.x_origin, 215.0);
        assert_eq!(config.palettes.status.len(), 7);
    }

    #[test]
    fn palette_lookup() {
        let config = DisplayConfig::default();
        assert_eq!(
            config.palettes.segment_allocation.color_for("US"),
            Some("#3cb44b")
        );
        assert_eq!(config.palettes.segment_allocation.color_for("Mars"), None);
        assert_eq!(config.sector_color(Sector::A, true), Some("#4e9fd6"));
        assert_eq!(config.sector_color(Sector::A, false), Some("#c3def2"));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = DisplayConfig::from_file(Path::new("/nonexistent/display_config.json"))
            .expect_err("missing file should fail");
        assert!(matches!(err, DisplayConfigError::Read { .. }));
    }
}
